pub use super::notifications::Entity as Notifications;
pub use super::places::Entity as Places;
pub use super::routes::Entity as Routes;
pub use super::user_profiles::Entity as UserProfiles;
pub use super::users::Entity as Users;
pub use super::ways::Entity as Ways;
