//! Domain service for user-owned places.

use crate::models::{NewPlace, Place, PlaceChanges};
use crate::services::TripError;

#[async_trait::async_trait]
pub trait PlaceService: Send + Sync {
    /// Places of the caller, ordered by id.
    async fn list(&self, user_id: i32) -> Result<Vec<Place>, TripError>;

    /// # Errors
    ///
    /// [`TripError::NotFound`] if the place is missing, [`TripError::Forbidden`]
    /// if another user owns it.
    async fn get(&self, user_id: i32, id: i32) -> Result<Place, TripError>;

    /// # Errors
    ///
    /// [`TripError::Validation`] if coordinates are out of range.
    async fn create(&self, user_id: i32, place: NewPlace) -> Result<Place, TripError>;

    /// Changes only the supplied fields and returns the stored place.
    async fn update(
        &self,
        user_id: i32,
        id: i32,
        changes: PlaceChanges,
    ) -> Result<Place, TripError>;

    /// Deletes the place and the routes that use it.
    async fn delete(&self, user_id: i32, id: i32) -> Result<(), TripError>;
}
