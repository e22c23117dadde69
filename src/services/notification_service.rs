//! Domain service for way notifications.
//!
//! Every successful create, update and delete is reported to the injected
//! [`NotificationHook`](crate::domain::NotificationHook).

use crate::models::{NewNotification, Notification, NotificationChanges};
use crate::services::TripError;

#[async_trait::async_trait]
pub trait NotificationService: Send + Sync {
    async fn list(&self, user_id: i32, way_id: i32) -> Result<Vec<Notification>, TripError>;

    /// # Errors
    ///
    /// [`TripError::Validation`] if `week_day` is outside 0..=6 or the window
    /// ends before it starts.
    async fn create(
        &self,
        user_id: i32,
        way_id: i32,
        notification: NewNotification,
    ) -> Result<Notification, TripError>;

    async fn get(&self, user_id: i32, id: i32) -> Result<Notification, TripError>;

    async fn update(
        &self,
        user_id: i32,
        id: i32,
        changes: NotificationChanges,
    ) -> Result<Notification, TripError>;

    async fn delete(&self, user_id: i32, id: i32) -> Result<(), TripError>;
}
