pub mod notification;
pub mod place;
pub mod route;
pub mod user;
pub mod way;

pub use notification::{NewNotification, Notification, NotificationChanges, NotificationDto};
pub use place::{NewPlace, Place, PlaceChanges, PlaceDto};
pub use route::{NewRoute, Route, RouteChanges, RouteDto};
pub use user::{ProfileChanges, ProfileDto, User, UserDto, UserProfile};
pub use way::{Way, WayDto, WayWithRoutesDto};
