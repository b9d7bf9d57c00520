use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};

use citizen_api::{build_router, AppState};
use citizen_infrastructure::{BackendFactory, MockStore};
use citizen_shared::config::AppConfig;
use citizen_shared::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (.env included)
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize telemetry
    let _log_guard = init_telemetry(&config.log)?;

    info!("{} starting ({})", config.app.name, config.app.env);

    // Backend client factory; falls back to the in-memory store when unconfigured
    let backend = BackendFactory::new(&config.backend, Arc::new(MockStore::new()));
    if !backend.status().is_valid() {
        warn!(
            "Backend not configured ({}): sessions are not enforced",
            backend.status()
        );
    }

    let addr = config.bind_address();
    let app = build_router(AppState::new(config, backend));

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
