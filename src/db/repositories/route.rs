use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait, Unchanged,
};

use super::{settle, settle_flag};
use crate::entities::{prelude::*, routes};
use crate::models::{NewRoute, Route, RouteChanges};

pub struct RouteRepository {
    conn: DatabaseConnection,
}

impl RouteRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// `None` if the way or either place is missing, or the insert fails.
    pub async fn create(&self, way_id: i32, route: &NewRoute) -> Option<Route> {
        settle(self.try_create(way_id, route).await, "create route")
    }

    async fn try_create(&self, way_id: i32, route: &NewRoute) -> Result<Option<Route>, DbErr> {
        let txn = self.conn.begin().await?;

        let way_exists = Ways::find_by_id(way_id).one(&txn).await?.is_some();
        let start_exists = Places::find_by_id(route.start_place_id)
            .one(&txn)
            .await?
            .is_some();
        let end_exists = Places::find_by_id(route.end_place_id)
            .one(&txn)
            .await?
            .is_some();
        if !(way_exists && start_exists && end_exists) {
            return Ok(None);
        }

        let model = routes::ActiveModel {
            way_id: Set(way_id),
            start_place_id: Set(route.start_place_id),
            end_place_id: Set(route.end_place_id),
            transport_id: Set(route.transport_id),
            transport_name: Set(route.transport_name.clone()),
            time: Set(route.time),
            position: Set(route.position),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(Some(Route::from(model)))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<Route>> {
        let route = Routes::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query route by ID")?;

        Ok(route.map(Route::from))
    }

    /// Legs of one way in trip order.
    pub async fn list_for_way(&self, way_id: i32) -> Result<Vec<Route>> {
        self.list_for_ways(&[way_id]).await
    }

    pub async fn list_for_ways(&self, way_ids: &[i32]) -> Result<Vec<Route>> {
        if way_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = Routes::find()
            .filter(routes::Column::WayId.is_in(way_ids.iter().copied()))
            .order_by_asc(routes::Column::WayId)
            .order_by_asc(routes::Column::Position)
            .order_by_asc(routes::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list routes")?;

        Ok(rows.into_iter().map(Route::from).collect())
    }

    /// First leg at `position`; duplicates resolve to the lowest id.
    pub async fn get_by_position(&self, way_id: i32, position: i32) -> Result<Option<Route>> {
        let route = Routes::find()
            .filter(routes::Column::WayId.eq(way_id))
            .filter(routes::Column::Position.eq(position))
            .order_by_asc(routes::Column::Id)
            .one(&self.conn)
            .await
            .context("Failed to query route by position")?;

        Ok(route.map(Route::from))
    }

    pub async fn update(&self, id: i32, changes: &RouteChanges) -> bool {
        settle_flag(self.try_update(id, changes).await, "update route")
    }

    async fn try_update(&self, id: i32, changes: &RouteChanges) -> Result<bool, DbErr> {
        if Routes::find_by_id(id).one(&self.conn).await?.is_none() {
            return Ok(false);
        }

        let mut active = routes::ActiveModel {
            id: Unchanged(id),
            ..Default::default()
        };
        if let Some(start) = changes.start_place_id {
            active.start_place_id = Set(start);
        }
        if let Some(end) = changes.end_place_id {
            active.end_place_id = Set(end);
        }
        if let Some(time) = changes.time {
            active.time = Set(time);
        }
        if let Some(position) = changes.position {
            active.position = Set(position);
        }
        if let Some(transport_id) = changes.transport_id {
            active.transport_id = Set(transport_id);
        }
        if let Some(transport_name) = &changes.transport_name {
            active.transport_name = Set(transport_name.clone());
        }

        if active.is_changed() {
            active.update(&self.conn).await?;
        }
        Ok(true)
    }

    pub async fn delete(&self, id: i32) -> bool {
        settle_flag(
            Routes::delete_by_id(id)
                .exec(&self.conn)
                .await
                .map(|r| r.rows_affected > 0),
            "delete route",
        )
    }
}
