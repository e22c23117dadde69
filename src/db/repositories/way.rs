use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, Unchanged,
};
use tracing::{error, warn};

use super::{Deletion, settle, settle_flag};
use crate::entities::{notifications, prelude::*, routes, ways};
use crate::models::Way;

pub struct WayRepository {
    conn: DatabaseConnection,
}

impl WayRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// `None` when the owner is not a stored user or the insert fails.
    pub async fn create(&self, owner_id: i32, name: &str) -> Option<Way> {
        settle(self.try_create(owner_id, name).await, "create way")
    }

    async fn try_create(&self, owner_id: i32, name: &str) -> Result<Option<Way>, DbErr> {
        let txn = self.conn.begin().await?;

        if Users::find_by_id(owner_id).one(&txn).await?.is_none() {
            warn!(owner_id, "Refusing to create way for unknown user");
            return Ok(None);
        }

        let model = ways::ActiveModel {
            name: Set(name.to_string()),
            owner_id: Set(owner_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(Some(Way::from(model)))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<Way>> {
        let way = Ways::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query way by ID")?;

        Ok(way.map(Way::from))
    }

    pub async fn list_for_owner(&self, owner_id: i32) -> Result<Vec<Way>> {
        let rows = Ways::find()
            .filter(ways::Column::OwnerId.eq(owner_id))
            .order_by_asc(ways::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list ways")?;

        Ok(rows.into_iter().map(Way::from).collect())
    }

    /// Way that owns the given notification.
    pub async fn get_by_notification(&self, notification_id: i32) -> Result<Option<Way>> {
        let row = Notifications::find_by_id(notification_id)
            .find_also_related(Ways)
            .one(&self.conn)
            .await
            .context("Failed to query way by notification")?;

        Ok(row.and_then(|(_, way)| way).map(Way::from))
    }

    pub async fn update_name(&self, id: i32, name: &str) -> bool {
        settle_flag(self.try_update_name(id, name).await, "update way")
    }

    async fn try_update_name(&self, id: i32, name: &str) -> Result<bool, DbErr> {
        if Ways::find_by_id(id).one(&self.conn).await?.is_none() {
            return Ok(false);
        }

        ways::ActiveModel {
            id: Unchanged(id),
            name: Set(name.to_string()),
            ..Default::default()
        }
        .update(&self.conn)
        .await?;

        Ok(true)
    }

    /// Deletes the way with its routes and notifications in one transaction.
    pub async fn delete(&self, id: i32) -> Deletion {
        match self.try_delete(id).await {
            Ok(deletion) => deletion,
            Err(e) => {
                error!(way_id = id, error = %e, "Unsuccessful way deletion");
                Deletion::missing()
            }
        }
    }

    async fn try_delete(&self, id: i32) -> Result<Deletion, DbErr> {
        let txn = self.conn.begin().await?;

        let notification_ids: Vec<i32> = Notifications::find()
            .select_only()
            .column(notifications::Column::Id)
            .filter(notifications::Column::WayId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;

        Notifications::delete_many()
            .filter(notifications::Column::WayId.eq(id))
            .exec(&txn)
            .await?;
        Routes::delete_many()
            .filter(routes::Column::WayId.eq(id))
            .exec(&txn)
            .await?;
        let result = Ways::delete_by_id(id).exec(&txn).await?;

        if result.rows_affected == 0 {
            return Ok(Deletion::missing());
        }

        txn.commit().await?;
        Ok(Deletion {
            removed: true,
            notification_ids,
        })
    }
}
