//! `SeaORM` implementation of the `RouteService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::Store;
use crate::domain::{InWay, authorize};
use crate::models::{NewRoute, Route, RouteChanges, Way};
use crate::services::TripError;
use crate::services::route_service::RouteService;

pub struct SeaOrmRouteService {
    store: Store,
}

impl SeaOrmRouteService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn owned_way(&self, user_id: i32, way_id: i32) -> Result<Way, TripError> {
        let way = self.store.get_way(way_id).await?;
        Ok(authorize(way_id, way, user_id)?)
    }

    async fn owned(&self, user_id: i32, id: i32) -> Result<Route, TripError> {
        let entry = match self.store.get_route(id).await? {
            Some(route) => self
                .store
                .get_way(route.way_id)
                .await?
                .map(|way| InWay { item: route, way }),
            None => None,
        };

        Ok(authorize(id, entry, user_id)?.item)
    }

    /// Both ends must be distinct places owned by the caller.
    async fn check_places(&self, user_id: i32, start: i32, end: i32) -> Result<(), TripError> {
        if start == end {
            return Err(TripError::validation(
                "Start and end place must be different",
            ));
        }

        for place_id in [start, end] {
            let place = self.store.get_place(place_id).await?;
            authorize(place_id, place, user_id)?;
        }
        Ok(())
    }
}

fn check_position(position: i32) -> Result<(), TripError> {
    if position < 0 {
        return Err(TripError::validation(format!(
            "Invalid position: {position}. Must be zero or greater"
        )));
    }
    Ok(())
}

#[async_trait]
impl RouteService for SeaOrmRouteService {
    async fn create(
        &self,
        user_id: i32,
        way_id: i32,
        route: NewRoute,
    ) -> Result<Route, TripError> {
        check_position(route.position)?;
        self.owned_way(user_id, way_id).await?;
        self.check_places(user_id, route.start_place_id, route.end_place_id)
            .await?;

        let route = self
            .store
            .create_route(way_id, &route)
            .await
            .ok_or(TripError::Persistence("route creation"))?;

        info!(route_id = route.id, way_id, position = route.position, "Route created");
        Ok(route)
    }

    async fn get(&self, user_id: i32, id: i32) -> Result<Route, TripError> {
        self.owned(user_id, id).await
    }

    async fn get_by_position(
        &self,
        user_id: i32,
        way_id: i32,
        position: i32,
    ) -> Result<Route, TripError> {
        check_position(position)?;
        self.owned_way(user_id, way_id).await?;

        self.store
            .get_route_by_position(way_id, position)
            .await?
            .ok_or_else(|| {
                TripError::NotFound(format!(
                    "Route at position {position} does not exist in way {way_id}"
                ))
            })
    }

    async fn update(
        &self,
        user_id: i32,
        id: i32,
        changes: RouteChanges,
    ) -> Result<Route, TripError> {
        if changes.is_empty() {
            return Err(TripError::validation("No fields to update"));
        }
        if let Some(position) = changes.position {
            check_position(position)?;
        }

        let current = self.owned(user_id, id).await?;

        if changes.start_place_id.is_some() || changes.end_place_id.is_some() {
            let start = changes.start_place_id.unwrap_or(current.start_place_id);
            let end = changes.end_place_id.unwrap_or(current.end_place_id);
            self.check_places(user_id, start, end).await?;
        }

        if !self.store.update_route(id, &changes).await {
            return Err(TripError::Persistence("route update"));
        }

        self.owned(user_id, id).await
    }

    async fn delete(&self, user_id: i32, id: i32) -> Result<(), TripError> {
        self.owned(user_id, id).await?;

        if !self.store.delete_route(id).await {
            return Err(TripError::Persistence("route deletion"));
        }

        info!(route_id = id, user_id, "Route deleted");
        Ok(())
    }
}
