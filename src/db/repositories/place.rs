use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait, Unchanged,
};
use tracing::warn;

use super::{settle, settle_flag};
use crate::entities::{places, prelude::*, routes};
use crate::models::{NewPlace, Place, PlaceChanges};

pub struct PlaceRepository {
    conn: DatabaseConnection,
}

impl PlaceRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Creates a place for `owner_id`. `None` if the owner does not exist or
    /// the insert fails.
    pub async fn create(&self, owner_id: i32, place: &NewPlace) -> Option<Place> {
        settle(self.try_create(owner_id, place).await, "create place")
    }

    async fn try_create(&self, owner_id: i32, place: &NewPlace) -> Result<Option<Place>, DbErr> {
        let txn = self.conn.begin().await?;

        if Users::find_by_id(owner_id).one(&txn).await?.is_none() {
            warn!(owner_id, "Refusing to create place for unknown user");
            return Ok(None);
        }

        let model = places::ActiveModel {
            latitude: Set(place.latitude),
            longitude: Set(place.longitude),
            address: Set(place.address.clone()),
            name: Set(place.name.clone()),
            stop_id: Set(place.stop_id),
            owner_id: Set(owner_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(Some(Place::from(model)))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<Place>> {
        let place = Places::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query place by ID")?;

        Ok(place.map(Place::from))
    }

    pub async fn list_for_owner(&self, owner_id: i32) -> Result<Vec<Place>> {
        let rows = Places::find()
            .filter(places::Column::OwnerId.eq(owner_id))
            .order_by_asc(places::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list places")?;

        Ok(rows.into_iter().map(Place::from).collect())
    }

    /// Applies only the supplied fields. False if the place is gone or the
    /// write fails.
    pub async fn update(&self, id: i32, changes: &PlaceChanges) -> bool {
        settle_flag(self.try_update(id, changes).await, "update place")
    }

    async fn try_update(&self, id: i32, changes: &PlaceChanges) -> Result<bool, DbErr> {
        if Places::find_by_id(id).one(&self.conn).await?.is_none() {
            return Ok(false);
        }

        let mut active = places::ActiveModel {
            id: Unchanged(id),
            ..Default::default()
        };
        if let Some(latitude) = changes.latitude {
            active.latitude = Set(latitude);
        }
        if let Some(longitude) = changes.longitude {
            active.longitude = Set(longitude);
        }
        if let Some(address) = &changes.address {
            active.address = Set(address.clone());
        }
        if let Some(name) = &changes.name {
            active.name = Set(name.clone());
        }
        if let Some(stop_id) = changes.stop_id {
            active.stop_id = Set(stop_id);
        }

        if active.is_changed() {
            active.update(&self.conn).await?;
        }
        Ok(true)
    }

    /// Deletes the place and every route that starts or ends at it.
    pub async fn delete(&self, id: i32) -> bool {
        settle_flag(self.try_delete(id).await, "delete place")
    }

    async fn try_delete(&self, id: i32) -> Result<bool, DbErr> {
        let txn = self.conn.begin().await?;

        Routes::delete_many()
            .filter(
                routes::Column::StartPlaceId
                    .eq(id)
                    .or(routes::Column::EndPlaceId.eq(id)),
            )
            .exec(&txn)
            .await?;

        let result = Places::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        Ok(result.rows_affected > 0)
    }
}
