pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

use std::sync::Arc;
use tokio::signal;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands, UserCommands};
pub use config::Config;
use db::Store;
use services::ReminderScheduler;
use state::SharedState;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let mut builder = tracing_loki::builder().label("app", "waytohome")?;
        for (key, value) in &config.observability.loki_labels {
            if key == "app" {
                continue;
            }
            builder = builder.label(key.as_str(), value.as_str())?;
        }
        let (layer, task) = builder.build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_daemon(config, prometheus_handle).await,
        Commands::Init => cmd_init(),
        Commands::User {
            command: UserCommands::Add { email, password },
        } => cmd_user_add(&config, &email, &password).await,
    }
}

async fn run_daemon(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!(
        "waytohome v{} starting in daemon mode...",
        env!("CARGO_PKG_VERSION")
    );

    let shared = Arc::new(SharedState::new(config.clone()).await?);
    shared
        .store
        .ping()
        .await
        .context("Database is not reachable")?;
    let api_state = api::create_app_state(Arc::clone(&shared), prometheus_handle);

    let scheduler = if config.scheduler.enabled {
        let scheduler = Arc::new(
            ReminderScheduler::new(shared.store.clone(), shared.event_bus.clone()).await?,
        );
        if let Err(e) = Arc::clone(&scheduler).start().await {
            error!("Reminder scheduler error: {}", e);
        }
        Some(scheduler)
    } else {
        warn!("Reminder scheduler disabled");
        None
    };

    let port = config.server.port;
    info!("Starting Web API on port {}", port);

    let app = api::router(api_state).await;
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let server_handle = tokio::spawn(async move {
        info!("Web Server running at http://0.0.0.0:{}", port);
        if let Err(e) = axum::serve(listener, app).await {
            error!("Web server error: {}", e);
        }
    });

    info!("Daemon running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    if let Some(scheduler) = scheduler
        && let Err(e) = scheduler.shutdown().await
    {
        error!("Failed to stop reminder scheduler: {}", e);
    }
    server_handle.abort();
    info!("Daemon stopped");

    Ok(())
}

fn cmd_init() -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("Created config.toml");
    } else {
        println!("config.toml already exists");
    }
    Ok(())
}

async fn cmd_user_add(config: &Config, email: &str, password: &str) -> anyhow::Result<()> {
    services::auth_service_impl::validate_email(email)?;
    services::auth_service_impl::validate_password(password)?;

    let store = Store::new(&config.general.database_path).await?;

    if store.get_user_by_email(email).await?.is_some() {
        anyhow::bail!("User {} already exists", email);
    }

    let user = store
        .create_active_user(email, password, Some(&config.security))
        .await?
        .context("Failed to create user")?;

    println!("Created user {} (id {})", user.email, user.id);
    println!("API key: {}", user.api_key);
    Ok(())
}
