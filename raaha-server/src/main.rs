//! Raaha Server
//!
//! Simulated ride tracking with a REST API and a live position stream

use anyhow::{Context, Result};
use raaha_server::{api, config::ServerConfig, state};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting Raaha Server");

    let config = ServerConfig::load().context("Failed to load configuration")?;
    let addr = config.bind;

    // Create application state
    let state = state::AppState::new(config);

    // Build the router
    let app = api::create_router(state);

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
