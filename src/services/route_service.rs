//! Domain service for route legs. Ownership follows the parent way.

use crate::models::{NewRoute, Route, RouteChanges};
use crate::services::TripError;

#[async_trait::async_trait]
pub trait RouteService: Send + Sync {
    /// # Errors
    ///
    /// [`TripError::Validation`] on a negative position or when start and end
    /// are the same place; `NotFound`/`Forbidden` when the way or either place
    /// is missing or not owned by the caller.
    async fn create(&self, user_id: i32, way_id: i32, route: NewRoute)
    -> Result<Route, TripError>;

    async fn get(&self, user_id: i32, id: i32) -> Result<Route, TripError>;

    /// First leg of the way at `position`.
    async fn get_by_position(
        &self,
        user_id: i32,
        way_id: i32,
        position: i32,
    ) -> Result<Route, TripError>;

    async fn update(
        &self,
        user_id: i32,
        id: i32,
        changes: RouteChanges,
    ) -> Result<Route, TripError>;

    async fn delete(&self, user_id: i32, id: i32) -> Result<(), TripError>;
}
