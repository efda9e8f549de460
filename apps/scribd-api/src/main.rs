use anyhow::Result;
use poller::{HttpStatusClient, PollerConfig};
use scraper_chromiumoxide::ChromiumLauncher;
use shared::core::config::ServiceConfig;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scribd_api::{create_api_router, Pipeline};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServiceConfig::from_env()?;

    let launcher = Arc::new(ChromiumLauncher::new(config.browser.clone()));
    let status = Arc::new(HttpStatusClient::new(PollerConfig::from(&config))?);
    let pipeline = Arc::new(Pipeline::from_config(&config, launcher, status));

    // Create the API router
    let app = create_api_router(pipeline);

    // Start the server
    info!("Scribd Downloader API listening on {}", config.bind_addr);

    axum::Server::bind(&config.bind_addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
