use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, Unchanged,
};

use super::{settle, settle_flag};
use crate::entities::{notifications, prelude::*};
use crate::models::{NewNotification, Notification, NotificationChanges};

pub struct NotificationRepository {
    conn: DatabaseConnection,
}

impl NotificationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, way_id: i32, notification: &NewNotification) -> Option<Notification> {
        settle(
            self.try_create(way_id, notification).await,
            "create notification",
        )
    }

    async fn try_create(
        &self,
        way_id: i32,
        notification: &NewNotification,
    ) -> Result<Option<Notification>, DbErr> {
        if Ways::find_by_id(way_id).one(&self.conn).await?.is_none() {
            return Ok(None);
        }

        let model = notifications::ActiveModel {
            way_id: Set(way_id),
            start_time: Set(notification.start_time),
            end_time: Set(notification.end_time),
            week_day: Set(notification.week_day),
            time: Set(notification.time),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        Ok(Some(Notification::from(model)))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<Notification>> {
        let notification = Notifications::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query notification by ID")?;

        Ok(notification.map(Notification::from))
    }

    pub async fn list_for_way(&self, way_id: i32) -> Result<Vec<Notification>> {
        let rows = Notifications::find()
            .filter(notifications::Column::WayId.eq(way_id))
            .order_by_asc(notifications::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list notifications")?;

        Ok(rows.into_iter().map(Notification::from).collect())
    }

    pub async fn list_all(&self) -> Result<Vec<Notification>> {
        let rows = Notifications::find()
            .order_by_asc(notifications::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list all notifications")?;

        Ok(rows.into_iter().map(Notification::from).collect())
    }

    /// Returns the stored notification after the update.
    pub async fn update(&self, id: i32, changes: &NotificationChanges) -> Option<Notification> {
        settle(self.try_update(id, changes).await, "update notification")
    }

    async fn try_update(
        &self,
        id: i32,
        changes: &NotificationChanges,
    ) -> Result<Option<Notification>, DbErr> {
        let Some(current) = Notifications::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active = notifications::ActiveModel {
            id: Unchanged(id),
            ..Default::default()
        };
        if let Some(start_time) = changes.start_time {
            active.start_time = Set(start_time);
        }
        if let Some(end_time) = changes.end_time {
            active.end_time = Set(end_time);
        }
        if let Some(week_day) = changes.week_day {
            active.week_day = Set(week_day);
        }
        if let Some(time) = changes.time {
            active.time = Set(time);
        }

        if !active.is_changed() {
            return Ok(Some(Notification::from(current)));
        }

        let model = active.update(&self.conn).await?;
        Ok(Some(Notification::from(model)))
    }

    pub async fn delete(&self, id: i32) -> bool {
        settle_flag(
            Notifications::delete_by_id(id)
                .exec(&self.conn)
                .await
                .map(|r| r.rows_affected > 0),
            "delete notification",
        )
    }
}
