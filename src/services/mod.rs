pub mod error;
pub use error::TripError;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, Registration};
pub use auth_service_impl::SeaOrmAuthService;

pub mod profile_service;
pub mod profile_service_impl;
pub use profile_service::ProfileService;
pub use profile_service_impl::SeaOrmProfileService;

pub mod place_service;
pub mod place_service_impl;
pub use place_service::PlaceService;
pub use place_service_impl::SeaOrmPlaceService;

pub mod way_service;
pub mod way_service_impl;
pub use way_service::WayService;
pub use way_service_impl::SeaOrmWayService;

pub mod route_service;
pub mod route_service_impl;
pub use route_service::RouteService;
pub use route_service_impl::SeaOrmRouteService;

pub mod notification_service;
pub mod notification_service_impl;
pub use notification_service::NotificationService;
pub use notification_service_impl::SeaOrmNotificationService;

pub mod scheduler;
pub use scheduler::ReminderScheduler;
