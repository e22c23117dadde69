//! `SeaORM` implementation of the `WayService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::db::Store;
use crate::domain::{NotificationHook, authorize};
use crate::models::{Way, WayWithRoutesDto};
use crate::services::TripError;
use crate::services::way_service::WayService;

pub struct SeaOrmWayService {
    store: Store,
    hook: Arc<dyn NotificationHook>,
}

impl SeaOrmWayService {
    #[must_use]
    pub fn new(store: Store, hook: Arc<dyn NotificationHook>) -> Self {
        Self { store, hook }
    }

    async fn owned(&self, user_id: i32, id: i32) -> Result<Way, TripError> {
        let way = self.store.get_way(id).await?;
        Ok(authorize(id, way, user_id)?)
    }
}

#[async_trait]
impl WayService for SeaOrmWayService {
    async fn list(&self, user_id: i32) -> Result<Vec<WayWithRoutesDto>, TripError> {
        Ok(self.store.list_ways_with_routes(user_id).await?)
    }

    async fn get(&self, user_id: i32, id: i32) -> Result<WayWithRoutesDto, TripError> {
        let way = self.owned(user_id, id).await?;
        Ok(self.store.get_way_with_routes(&way).await?)
    }

    async fn create(&self, user_id: i32, name: &str) -> Result<Way, TripError> {
        let way = self
            .store
            .create_way(user_id, name)
            .await
            .ok_or(TripError::Persistence("way creation"))?;

        info!(way_id = way.id, user_id, "Way created");
        Ok(way)
    }

    async fn rename(
        &self,
        user_id: i32,
        id: i32,
        name: &str,
    ) -> Result<WayWithRoutesDto, TripError> {
        self.owned(user_id, id).await?;

        if !self.store.update_way_name(id, name).await {
            return Err(TripError::Persistence("way update"));
        }

        self.get(user_id, id).await
    }

    async fn delete(&self, user_id: i32, id: i32) -> Result<(), TripError> {
        self.owned(user_id, id).await?;

        let deletion = self.store.delete_way(id).await;
        if !deletion.removed {
            return Err(TripError::Persistence("way deletion"));
        }

        for notification_id in deletion.notification_ids {
            self.hook.on_notification_deleted(notification_id);
        }

        info!(way_id = id, user_id, "Way deleted");
        Ok(())
    }
}
