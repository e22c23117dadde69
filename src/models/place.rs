use serde::Serialize;

use crate::domain::access::Owned;
use crate::entities::places;

#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub id: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub name: String,
    pub stop_id: Option<i32>,
    pub owner_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceDto {
    pub id: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub name: String,
    pub stop_id: Option<i32>,
    pub user_id: i32,
}

impl Place {
    #[must_use]
    pub fn to_dto(&self) -> PlaceDto {
        PlaceDto {
            id: self.id,
            latitude: self.latitude,
            longitude: self.longitude,
            address: self.address.clone(),
            name: self.name.clone(),
            stop_id: self.stop_id,
            user_id: self.owner_id,
        }
    }
}

impl From<places::Model> for Place {
    fn from(model: places::Model) -> Self {
        Self {
            id: model.id,
            latitude: model.latitude,
            longitude: model.longitude,
            address: model.address,
            name: model.name,
            stop_id: model.stop_id,
            owner_id: model.owner_id,
        }
    }
}

impl Owned for Place {
    const KIND: &'static str = "Place";

    fn owner_id(&self) -> i32 {
        self.owner_id
    }
}

/// Fields required to create a place.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlace {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub name: String,
    pub stop_id: Option<i32>,
}

/// Partial place update. `stop_id: Some(None)` clears the stop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceChanges {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub name: Option<String>,
    pub stop_id: Option<Option<i32>>,
}

impl PlaceChanges {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.latitude.is_none()
            && self.longitude.is_none()
            && self.address.is_none()
            && self.name.is_none()
            && self.stop_id.is_none()
    }
}
