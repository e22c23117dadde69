use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

use crate::config::Config;
use crate::db::Store;
use crate::domain::{EventBusHook, NotificationHook, TripEvent};
use crate::services::{
    AuthService, NotificationService, PlaceService, ProfileService, RouteService,
    SeaOrmAuthService, SeaOrmNotificationService, SeaOrmPlaceService, SeaOrmProfileService,
    SeaOrmRouteService, SeaOrmWayService, WayService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub event_bus: broadcast::Sender<TripEvent>,

    pub auth_service: Arc<dyn AuthService>,

    pub profile_service: Arc<dyn ProfileService>,

    pub place_service: Arc<dyn PlaceService>,

    pub way_service: Arc<dyn WayService>,

    pub route_service: Arc<dyn RouteService>,

    pub notification_service: Arc<dyn NotificationService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let (event_bus, _) = broadcast::channel(config.general.event_bus_buffer_size);
        Self::with_event_bus(config, event_bus).await
    }

    pub async fn with_event_bus(
        config: Config,
        event_bus: broadcast::Sender<TripEvent>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let hook: Arc<dyn NotificationHook> = Arc::new(EventBusHook::new(event_bus.clone()));

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
            hook.clone(),
        )) as Arc<dyn AuthService>;
        let profile_service =
            Arc::new(SeaOrmProfileService::new(store.clone())) as Arc<dyn ProfileService>;
        let place_service =
            Arc::new(SeaOrmPlaceService::new(store.clone())) as Arc<dyn PlaceService>;
        let way_service =
            Arc::new(SeaOrmWayService::new(store.clone(), hook.clone())) as Arc<dyn WayService>;
        let route_service =
            Arc::new(SeaOrmRouteService::new(store.clone())) as Arc<dyn RouteService>;
        let notification_service = Arc::new(SeaOrmNotificationService::new(store.clone(), hook))
            as Arc<dyn NotificationService>;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            event_bus,
            auth_service,
            profile_service,
            place_service,
            way_service,
            route_service,
            notification_service,
        })
    }
}
