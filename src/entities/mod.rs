pub mod prelude;

pub mod notifications;
pub mod places;
pub mod routes;
pub mod user_profiles;
pub mod users;
pub mod ways;
