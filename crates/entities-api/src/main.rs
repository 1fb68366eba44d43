//! # entities-api: Binary Entry Point
//!
//! Starts the Axum HTTP server for the Entities API.
//! Binds to `HOST`:`PORT` (default `0.0.0.0:8080`).

use entities_api::state::{AppConfig, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Structured tracing; `LOG_FORMAT=json` switches to JSON lines.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Configuration error: {e}");
        e
    })?;
    let addr = config.socket_addr();
    let metrics_enabled = config.metrics_enabled;

    let app = entities_api::app(AppState::with_config(config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, metrics_enabled, "Entities API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Entities API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
