use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::models::{
    NewNotification, NewPlace, NewRoute, Notification, NotificationChanges, Place, PlaceChanges,
    ProfileChanges, Route, RouteChanges, User, UserProfile, Way, WayWithRoutesDto,
};

pub mod migrator;
pub mod repositories;

pub use repositories::Deletion;
pub use repositories::user::NewUser;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,

    /// Directory of a test database, removed once the last clone is dropped.
    #[cfg(test)]
    scratch: Option<std::sync::Arc<tempfile::TempDir>>,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self {
            conn,
            #[cfg(test)]
            scratch: None,
        })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn profile_repo(&self) -> repositories::profile::ProfileRepository {
        repositories::profile::ProfileRepository::new(self.conn.clone())
    }

    fn place_repo(&self) -> repositories::place::PlaceRepository {
        repositories::place::PlaceRepository::new(self.conn.clone())
    }

    fn way_repo(&self) -> repositories::way::WayRepository {
        repositories::way::WayRepository::new(self.conn.clone())
    }

    fn route_repo(&self) -> repositories::route::RouteRepository {
        repositories::route::RouteRepository::new(self.conn.clone())
    }

    fn notification_repo(&self) -> repositories::notification::NotificationRepository {
        repositories::notification::NotificationRepository::new(self.conn.clone())
    }

    // Users

    pub async fn create_user(&self, user: NewUser<'_>) -> Option<User> {
        self.user_repo().create(user).await
    }

    /// Hashes the password and stores an already activated account.
    pub async fn create_active_user(
        &self,
        email: &str,
        password: &str,
        security: Option<&SecurityConfig>,
    ) -> Result<Option<User>> {
        let password = password.to_string();
        let security = security.cloned();
        let password_hash = tokio::task::spawn_blocking(move || {
            repositories::user::hash_password(&password, security.as_ref())
        })
        .await??;

        Ok(self
            .create_user(NewUser {
                email,
                password_hash,
                activation_token: None,
                is_active: true,
            })
            .await)
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn verify_user_password(&self, email: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_password(email, password).await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }

    pub async fn activate_user(&self, token: &str) -> bool {
        self.user_repo().activate(token).await
    }

    pub async fn update_user_phone(&self, id: i32, phone_number: &str) -> bool {
        self.user_repo().update_phone(id, phone_number).await
    }

    pub async fn delete_user(&self, id: i32) -> Deletion {
        self.user_repo().delete(id).await
    }

    // Profiles

    pub async fn get_profile(&self, user_id: i32) -> Result<Option<UserProfile>> {
        self.profile_repo().get_for_user(user_id).await
    }

    pub async fn update_profile(&self, user_id: i32, changes: &ProfileChanges) -> bool {
        self.profile_repo().update(user_id, changes).await
    }

    // Places

    pub async fn create_place(&self, owner_id: i32, place: &NewPlace) -> Option<Place> {
        self.place_repo().create(owner_id, place).await
    }

    pub async fn get_place(&self, id: i32) -> Result<Option<Place>> {
        self.place_repo().get_by_id(id).await
    }

    pub async fn list_places(&self, owner_id: i32) -> Result<Vec<Place>> {
        self.place_repo().list_for_owner(owner_id).await
    }

    pub async fn update_place(&self, id: i32, changes: &PlaceChanges) -> bool {
        self.place_repo().update(id, changes).await
    }

    pub async fn delete_place(&self, id: i32) -> bool {
        self.place_repo().delete(id).await
    }

    // Ways

    pub async fn create_way(&self, owner_id: i32, name: &str) -> Option<Way> {
        self.way_repo().create(owner_id, name).await
    }

    pub async fn get_way(&self, id: i32) -> Result<Option<Way>> {
        self.way_repo().get_by_id(id).await
    }

    pub async fn get_way_by_notification(&self, notification_id: i32) -> Result<Option<Way>> {
        self.way_repo().get_by_notification(notification_id).await
    }

    pub async fn list_ways(&self, owner_id: i32) -> Result<Vec<Way>> {
        self.way_repo().list_for_owner(owner_id).await
    }

    /// Every way of `owner_id` with its legs, ordered by way id.
    pub async fn list_ways_with_routes(&self, owner_id: i32) -> Result<Vec<WayWithRoutesDto>> {
        let ways = self.list_ways(owner_id).await?;
        let way_ids: Vec<i32> = ways.iter().map(|w| w.id).collect();
        let routes = self.route_repo().list_for_ways(&way_ids).await?;

        Ok(ways.iter().map(|w| w.with_routes(&routes)).collect())
    }

    pub async fn get_way_with_routes(&self, way: &Way) -> Result<WayWithRoutesDto> {
        let routes = self.route_repo().list_for_way(way.id).await?;
        Ok(way.with_routes(&routes))
    }

    pub async fn update_way_name(&self, id: i32, name: &str) -> bool {
        self.way_repo().update_name(id, name).await
    }

    pub async fn delete_way(&self, id: i32) -> Deletion {
        self.way_repo().delete(id).await
    }

    // Routes

    pub async fn create_route(&self, way_id: i32, route: &NewRoute) -> Option<Route> {
        self.route_repo().create(way_id, route).await
    }

    pub async fn get_route(&self, id: i32) -> Result<Option<Route>> {
        self.route_repo().get_by_id(id).await
    }

    pub async fn get_route_by_position(&self, way_id: i32, position: i32) -> Result<Option<Route>> {
        self.route_repo().get_by_position(way_id, position).await
    }

    pub async fn update_route(&self, id: i32, changes: &RouteChanges) -> bool {
        self.route_repo().update(id, changes).await
    }

    pub async fn delete_route(&self, id: i32) -> bool {
        self.route_repo().delete(id).await
    }

    // Notifications

    pub async fn create_notification(
        &self,
        way_id: i32,
        notification: &NewNotification,
    ) -> Option<Notification> {
        self.notification_repo().create(way_id, notification).await
    }

    pub async fn get_notification(&self, id: i32) -> Result<Option<Notification>> {
        self.notification_repo().get_by_id(id).await
    }

    pub async fn list_notifications(&self, way_id: i32) -> Result<Vec<Notification>> {
        self.notification_repo().list_for_way(way_id).await
    }

    pub async fn list_all_notifications(&self) -> Result<Vec<Notification>> {
        self.notification_repo().list_all().await
    }

    pub async fn update_notification(
        &self,
        id: i32,
        changes: &NotificationChanges,
    ) -> Option<Notification> {
        self.notification_repo().update(id, changes).await
    }

    pub async fn delete_notification(&self, id: i32) -> bool {
        self.notification_repo().delete(id).await
    }
}

/// Throwaway on-disk database for tests, deleted with the store.
#[cfg(test)]
pub(crate) async fn test_store() -> Store {
    let dir = tempfile::Builder::new()
        .prefix("waytohome-test-")
        .tempdir()
        .expect("test directory");
    let path = dir.path().join("waytohome.db");

    let mut store = Store::new(&format!("sqlite:{}", path.display()))
        .await
        .expect("test store");
    store.scratch = Some(std::sync::Arc::new(dir));
    store
}
