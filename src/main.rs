mod config;
mod db;
mod handlers;
mod importer;
mod jobs;
mod models;
mod router;

use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use db::Store;

/// Application state shared across handlers
pub struct AppState {
    pub store: Store,
    pub config: Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "device_type_importer=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let cfg = Config::load();
    tracing::info!("Starting device type importer");
    tracing::info!("Database: {}", cfg.db_path);
    tracing::info!("Listen: {}", cfg.listen_addr);

    // Initialize database
    let store = Store::with_pool_size(&cfg.db_path, cfg.db_max_connections).await?;
    tracing::info!("Database initialized (pool_size={})", cfg.db_max_connections);

    // Create app state
    let state = Arc::new(AppState {
        store,
        config: cfg.clone(),
    });

    // Build router
    let app = router::build(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;
    tracing::info!("Device type importer listening on {}", cfg.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Device type importer shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => { sig.recv().await; }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
