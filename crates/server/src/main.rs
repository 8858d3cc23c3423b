//! trendlens server entry point.
//!
//! Boots the HTTP API: loads configuration, constructs one source service
//! per site, kicks off detached cache warming, and serves until a shutdown
//! signal arrives.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use trendlens_client::warm_cache;
use trendlens_core::AppConfig;

mod routes;
mod state;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = AppConfig::load()?;
    let state = state::AppState::new(config.clone())?;

    // warming is detached: startup never waits for upstream sites
    let github = state.github.clone();
    tokio::spawn(async move {
        warm_cache(&github).await;
    });
    let product_hunt = state.product_hunt.clone();
    tokio::spawn(async move {
        warm_cache(&product_hunt).await;
    });

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "trendlens API listening");

    let app = routes::router(state.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
