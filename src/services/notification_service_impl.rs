//! `SeaORM` implementation of the `NotificationService` trait.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;

use crate::db::Store;
use crate::domain::{InWay, NotificationHook, authorize};
use crate::models::{NewNotification, Notification, NotificationChanges};
use crate::services::TripError;
use crate::services::notification_service::NotificationService;

pub struct SeaOrmNotificationService {
    store: Store,
    hook: Arc<dyn NotificationHook>,
}

impl SeaOrmNotificationService {
    #[must_use]
    pub fn new(store: Store, hook: Arc<dyn NotificationHook>) -> Self {
        Self { store, hook }
    }

    async fn owned(&self, user_id: i32, id: i32) -> Result<Notification, TripError> {
        let entry = match self.store.get_notification(id).await? {
            Some(notification) => self
                .store
                .get_way_by_notification(id)
                .await?
                .map(|way| InWay {
                    item: notification,
                    way,
                }),
            None => None,
        };

        Ok(authorize(id, entry, user_id)?.item)
    }

    async fn check_way(&self, user_id: i32, way_id: i32) -> Result<(), TripError> {
        let way = self.store.get_way(way_id).await?;
        authorize(way_id, way, user_id)?;
        Ok(())
    }
}

fn check_week_day(week_day: i32) -> Result<(), TripError> {
    if !(0..=6).contains(&week_day) {
        return Err(TripError::validation(format!(
            "Invalid week_day: {week_day}. Must be between 0 (Monday) and 6 (Sunday)"
        )));
    }
    Ok(())
}

fn check_window(start: NaiveDate, end: NaiveDate) -> Result<(), TripError> {
    if start > end {
        return Err(TripError::validation(format!(
            "start_time {start} is after end_time {end}"
        )));
    }
    Ok(())
}

#[async_trait]
impl NotificationService for SeaOrmNotificationService {
    async fn list(&self, user_id: i32, way_id: i32) -> Result<Vec<Notification>, TripError> {
        self.check_way(user_id, way_id).await?;
        Ok(self.store.list_notifications(way_id).await?)
    }

    async fn create(
        &self,
        user_id: i32,
        way_id: i32,
        notification: NewNotification,
    ) -> Result<Notification, TripError> {
        check_week_day(notification.week_day)?;
        check_window(notification.start_time, notification.end_time)?;
        self.check_way(user_id, way_id).await?;

        let notification = self
            .store
            .create_notification(way_id, &notification)
            .await
            .ok_or(TripError::Persistence("notification creation"))?;

        self.hook.on_notification_created(&notification);
        info!(notification_id = notification.id, way_id, "Notification created");
        Ok(notification)
    }

    async fn get(&self, user_id: i32, id: i32) -> Result<Notification, TripError> {
        self.owned(user_id, id).await
    }

    async fn update(
        &self,
        user_id: i32,
        id: i32,
        changes: NotificationChanges,
    ) -> Result<Notification, TripError> {
        if changes.is_empty() {
            return Err(TripError::validation("No fields to update"));
        }
        if let Some(week_day) = changes.week_day {
            check_week_day(week_day)?;
        }

        let current = self.owned(user_id, id).await?;
        check_window(
            changes.start_time.unwrap_or(current.start_time),
            changes.end_time.unwrap_or(current.end_time),
        )?;

        let updated = self
            .store
            .update_notification(id, &changes)
            .await
            .ok_or(TripError::Persistence("notification update"))?;

        self.hook.on_notification_deleted(id);
        self.hook.on_notification_created(&updated);
        Ok(updated)
    }

    async fn delete(&self, user_id: i32, id: i32) -> Result<(), TripError> {
        self.owned(user_id, id).await?;

        if !self.store.delete_notification(id).await {
            return Err(TripError::Persistence("notification deletion"));
        }

        self.hook.on_notification_deleted(id);
        info!(notification_id = id, user_id, "Notification deleted");
        Ok(())
    }
}
