use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};

use quietroom::config::Config;
use quietroom::server::create_router;
use quietroom::types::RoomFinderState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    // Level isn't known until the config is read; log loading at the default
    let config = tracing::subscriber::with_default(tracing_subscriber::fmt().finish(), || {
        Config::load(config_path.as_deref())
    })?;

    tracing_subscriber::fmt()
        .with_max_level(config.tracing_level())
        .init();

    info!(
        api = %config.api_base_url,
        buildings = config.buildings.len(),
        "Starting QuietRoom room finder"
    );

    let address = config.bind_address();
    let state = Arc::new(RoomFinderState::new(config).context("failed to build API client")?);
    let app = create_router(state);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!("Server listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
