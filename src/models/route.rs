use chrono::NaiveTime;
use serde::Serialize;

use crate::domain::access::WayChild;
use crate::entities::routes;

/// One leg of a way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub id: i32,
    pub way_id: i32,
    pub start_place_id: i32,
    pub end_place_id: i32,
    pub transport_id: Option<i32>,
    pub transport_name: String,
    pub time: NaiveTime,
    pub position: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDto {
    pub id: i32,
    pub time: NaiveTime,
    pub transport_name: String,
    pub position: i32,
    pub way: i32,
    pub start_place: i32,
    pub end_place: i32,
}

impl Route {
    #[must_use]
    pub fn to_dto(&self) -> RouteDto {
        RouteDto {
            id: self.id,
            time: self.time,
            transport_name: self.transport_name.clone(),
            position: self.position,
            way: self.way_id,
            start_place: self.start_place_id,
            end_place: self.end_place_id,
        }
    }
}

impl From<routes::Model> for Route {
    fn from(model: routes::Model) -> Self {
        Self {
            id: model.id,
            way_id: model.way_id,
            start_place_id: model.start_place_id,
            end_place_id: model.end_place_id,
            transport_id: model.transport_id,
            transport_name: model.transport_name,
            time: model.time,
            position: model.position,
        }
    }
}

impl WayChild for Route {
    const KIND: &'static str = "Route";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoute {
    pub start_place_id: i32,
    pub end_place_id: i32,
    pub time: NaiveTime,
    pub position: i32,
    pub transport_id: Option<i32>,
    pub transport_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteChanges {
    pub start_place_id: Option<i32>,
    pub end_place_id: Option<i32>,
    pub time: Option<NaiveTime>,
    pub position: Option<i32>,
    pub transport_id: Option<Option<i32>>,
    pub transport_name: Option<String>,
}

impl RouteChanges {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start_place_id.is_none()
            && self.end_place_id.is_none()
            && self.time.is_none()
            && self.position.is_none()
            && self.transport_id.is_none()
            && self.transport_name.is_none()
    }
}
