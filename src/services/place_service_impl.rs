//! `SeaORM` implementation of the `PlaceService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::Store;
use crate::domain::authorize;
use crate::models::{NewPlace, Place, PlaceChanges};
use crate::services::TripError;
use crate::services::place_service::PlaceService;

pub struct SeaOrmPlaceService {
    store: Store,
}

impl SeaOrmPlaceService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn owned(&self, user_id: i32, id: i32) -> Result<Place, TripError> {
        let place = self.store.get_place(id).await?;
        Ok(authorize(id, place, user_id)?)
    }
}

fn check_latitude(latitude: f64) -> Result<(), TripError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(TripError::validation(format!(
            "Invalid latitude: {latitude}. Must be between -90 and 90"
        )));
    }
    Ok(())
}

fn check_longitude(longitude: f64) -> Result<(), TripError> {
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(TripError::validation(format!(
            "Invalid longitude: {longitude}. Must be between -180 and 180"
        )));
    }
    Ok(())
}

#[async_trait]
impl PlaceService for SeaOrmPlaceService {
    async fn list(&self, user_id: i32) -> Result<Vec<Place>, TripError> {
        Ok(self.store.list_places(user_id).await?)
    }

    async fn get(&self, user_id: i32, id: i32) -> Result<Place, TripError> {
        self.owned(user_id, id).await
    }

    async fn create(&self, user_id: i32, place: NewPlace) -> Result<Place, TripError> {
        check_latitude(place.latitude)?;
        check_longitude(place.longitude)?;

        let place = self
            .store
            .create_place(user_id, &place)
            .await
            .ok_or(TripError::Persistence("place creation"))?;

        info!(place_id = place.id, user_id, "Place created");
        Ok(place)
    }

    async fn update(
        &self,
        user_id: i32,
        id: i32,
        changes: PlaceChanges,
    ) -> Result<Place, TripError> {
        if changes.is_empty() {
            return Err(TripError::validation("No fields to update"));
        }
        if let Some(latitude) = changes.latitude {
            check_latitude(latitude)?;
        }
        if let Some(longitude) = changes.longitude {
            check_longitude(longitude)?;
        }

        self.owned(user_id, id).await?;

        if !self.store.update_place(id, &changes).await {
            return Err(TripError::Persistence("place update"));
        }

        self.owned(user_id, id).await
    }

    async fn delete(&self, user_id: i32, id: i32) -> Result<(), TripError> {
        self.owned(user_id, id).await?;

        if !self.store.delete_place(id).await {
            return Err(TripError::Persistence("place deletion"));
        }

        info!(place_id = id, user_id, "Place deleted");
        Ok(())
    }
}
