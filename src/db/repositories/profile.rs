use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use super::settle_flag;
use crate::entities::{prelude::*, user_profiles};
use crate::models::{ProfileChanges, UserProfile};

pub struct ProfileRepository {
    conn: DatabaseConnection,
}

impl ProfileRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_for_user(&self, user_id: i32) -> Result<Option<UserProfile>> {
        let profile = UserProfiles::find()
            .filter(user_profiles::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query user profile")?;

        Ok(profile.map(UserProfile::from))
    }

    /// Applies all supplied fields or none of them.
    pub async fn update(&self, user_id: i32, changes: &ProfileChanges) -> bool {
        settle_flag(self.try_update(user_id, changes).await, "update profile")
    }

    async fn try_update(&self, user_id: i32, changes: &ProfileChanges) -> Result<bool, DbErr> {
        let txn = self.conn.begin().await?;

        let Some(profile) = UserProfiles::find()
            .filter(user_profiles::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
        else {
            return Ok(false);
        };

        // Blank names leave the stored value alone.
        let mut active: user_profiles::ActiveModel = profile.into();
        if let Some(first_name) = changes.first_name.as_ref().filter(|n| !n.is_empty()) {
            active.first_name = Set(first_name.clone());
        }
        if let Some(last_name) = changes.last_name.as_ref().filter(|n| !n.is_empty()) {
            active.last_name = Set(last_name.clone());
        }
        if let Some(telegram_id) = changes.telegram_id {
            active.telegram_id = Set(telegram_id);
        }

        if active.is_changed() {
            active.update(&txn).await?;
        }

        txn.commit().await?;
        Ok(true)
    }
}
