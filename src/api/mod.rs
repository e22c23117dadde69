use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::services::{
    AuthService, NotificationService, PlaceService, ProfileService, RouteService, WayService,
};
use crate::state::SharedState;

pub mod auth;
mod error;
mod notifications;
mod observability;
mod places;
mod routes;
mod types;
mod users;
mod validation;
mod ways;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn profile_service(&self) -> &Arc<dyn ProfileService> {
        &self.shared.profile_service
    }

    #[must_use]
    pub fn place_service(&self) -> &Arc<dyn PlaceService> {
        &self.shared.place_service
    }

    #[must_use]
    pub fn way_service(&self) -> &Arc<dyn WayService> {
        &self.shared.way_service
    }

    #[must_use]
    pub fn route_service(&self) -> &Arc<dyn RouteService> {
        &self.shared.route_service
    }

    #[must_use]
    pub fn notification_service(&self) -> &Arc<dyn NotificationService> {
        &self.shared.notification_service
    }
}

pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, secure_cookies, idle_minutes) = {
        let config = state.config().read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
            config.server.session_idle_minutes,
        )
    };

    let protected_routes = create_protected_router(state.clone());

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(idle_minutes)));

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/user/register", post(users::register))
        .route("/user/activate/{token}", get(users::activate))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn(observability::track_metrics))
        .layer(session_layer)
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/user",
            get(users::get_current_user).delete(users::delete_current_user),
        )
        .route("/user/phone", put(users::update_phone))
        .route(
            "/user/profile",
            get(users::get_profile).put(users::update_profile),
        )
        .route(
            "/place",
            get(places::list_places)
                .post(places::create_place)
                .put(missing_id)
                .delete(missing_id),
        )
        .route(
            "/place/{id}",
            get(places::get_place)
                .put(places::update_place)
                .delete(places::delete_place),
        )
        .route(
            "/way",
            get(ways::list_ways)
                .post(ways::create_way)
                .put(missing_id)
                .delete(missing_id),
        )
        .route(
            "/way/{id}",
            get(ways::get_way)
                .put(ways::update_way)
                .delete(ways::delete_way),
        )
        .route("/way/{id}/route", post(routes::create_route))
        .route(
            "/way/{id}/route/{position}",
            get(routes::get_route_by_position),
        )
        .route(
            "/route/{id}",
            get(routes::get_route)
                .put(routes::update_route)
                .delete(routes::delete_route),
        )
        .route(
            "/way/{id}/notification",
            get(notifications::list_notifications).post(notifications::create_notification),
        )
        .route(
            "/notification/{id}",
            get(notifications::get_notification)
                .put(notifications::update_notification)
                .delete(notifications::delete_notification),
        )
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}

/// PUT/DELETE on a collection path without an id.
async fn missing_id() -> ApiError {
    ApiError::validation("id is required")
}
