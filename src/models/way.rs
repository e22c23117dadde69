use serde::Serialize;

use super::route::{Route, RouteDto};
use crate::domain::access::Owned;
use crate::entities::ways;

/// A user-defined trip, made of ordered legs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Way {
    pub id: i32,
    pub name: String,
    pub owner_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WayDto {
    pub id: i32,
    pub name: String,
    pub user_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WayWithRoutesDto {
    pub id: i32,
    pub name: String,
    pub user_id: i32,
    pub routes: Vec<RouteDto>,
}

impl Way {
    #[must_use]
    pub fn to_dto(&self) -> WayDto {
        WayDto {
            id: self.id,
            name: self.name.clone(),
            user_id: self.owner_id,
        }
    }

    /// Projects the way together with its legs in trip order.
    ///
    /// Legs belonging to other ways are skipped. Legs are ordered by
    /// `position`, ties broken by id.
    #[must_use]
    pub fn with_routes(&self, routes: &[Route]) -> WayWithRoutesDto {
        let mut legs: Vec<&Route> = routes.iter().filter(|r| r.way_id == self.id).collect();
        legs.sort_by_key(|r| (r.position, r.id));

        WayWithRoutesDto {
            id: self.id,
            name: self.name.clone(),
            user_id: self.owner_id,
            routes: legs.into_iter().map(Route::to_dto).collect(),
        }
    }
}

impl From<ways::Model> for Way {
    fn from(model: ways::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            owner_id: model.owner_id,
        }
    }
}

impl Owned for Way {
    const KIND: &'static str = "Way";

    fn owner_id(&self) -> i32 {
        self.owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn leg(id: i32, way_id: i32, position: i32) -> Route {
        Route {
            id,
            way_id,
            start_place_id: 100,
            end_place_id: 200,
            transport_id: None,
            transport_name: String::new(),
            time: NaiveTime::from_hms_opt(23, 58, 59).unwrap(),
            position,
        }
    }

    #[test]
    fn to_dto_exposes_owner_as_user_id() {
        let way = Way {
            id: 100,
            name: "test_name".to_string(),
            owner_id: 7,
        };

        assert_eq!(
            way.to_dto(),
            WayDto {
                id: 100,
                name: "test_name".to_string(),
                user_id: 7,
            }
        );
    }

    #[test]
    fn with_routes_orders_legs_by_position() {
        let way = Way {
            id: 1,
            name: String::new(),
            owner_id: 1,
        };
        let routes = vec![leg(10, 1, 2), leg(11, 1, 0), leg(12, 2, 1), leg(13, 1, 1)];

        let dto = way.with_routes(&routes);
        let ids: Vec<i32> = dto.routes.iter().map(|r| r.id).collect();

        assert_eq!(ids, vec![11, 13, 10]);
        assert_eq!(dto.routes[0], routes[1].to_dto());
    }

    #[test]
    fn with_routes_breaks_position_ties_by_id() {
        let way = Way {
            id: 1,
            name: String::new(),
            owner_id: 1,
        };
        let routes = vec![leg(5, 1, 0), leg(3, 1, 0)];

        let ids: Vec<i32> = way.with_routes(&routes).routes.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 5]);
    }
}
