//! Domain service for ways (named trips made of ordered routes).

use crate::models::{Way, WayWithRoutesDto};
use crate::services::TripError;

#[async_trait::async_trait]
pub trait WayService: Send + Sync {
    /// Ways of the caller with their routes, ordered by id.
    async fn list(&self, user_id: i32) -> Result<Vec<WayWithRoutesDto>, TripError>;

    async fn get(&self, user_id: i32, id: i32) -> Result<WayWithRoutesDto, TripError>;

    async fn create(&self, user_id: i32, name: &str) -> Result<Way, TripError>;

    async fn rename(
        &self,
        user_id: i32,
        id: i32,
        name: &str,
    ) -> Result<WayWithRoutesDto, TripError>;

    /// Deletes the way with its routes and notifications.
    async fn delete(&self, user_id: i32, id: i32) -> Result<(), TripError>;
}
