//! Upasthiti Server — Application entry point.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use upasthiti_db::DbManager;
use upasthiti_server::{AppState, ServerConfig, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("upasthiti=info".parse()?))
        .json()
        .init();

    let config = ServerConfig::load_with_dotenv().context("loading configuration")?;
    info!(environment = %config.environment, "Starting Upasthiti server...");
    if config.auth.uses_dev_secret() {
        warn!("Using the default JWT secret; set JWT_SECRET outside development");
    }

    let db = DbManager::open(&config.storage)
        .await
        .context("opening data stores")?;
    let state = AppState::new(&db, config.auth.clone()).context("initialising services")?;

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("Upasthiti server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
