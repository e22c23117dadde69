//! Domain service for the per-user profile (names and Telegram link).

use crate::models::{ProfileChanges, UserProfile};
use crate::services::TripError;

#[async_trait::async_trait]
pub trait ProfileService: Send + Sync {
    async fn get(&self, user_id: i32) -> Result<UserProfile, TripError>;

    /// Applies the supplied fields atomically and returns the stored profile.
    async fn update(&self, user_id: i32, changes: ProfileChanges)
    -> Result<UserProfile, TripError>;
}
