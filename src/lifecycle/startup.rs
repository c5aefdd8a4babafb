//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener starts last (traffic only when ready)

use thiserror::Error;
use tokio::net::TcpListener;

use crate::clients::ClientError;
use crate::config::ServiceConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::pipeline::Endpoints;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build clients: {0}")]
    Clients(#[from] ClientError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Start every subsystem and serve until SIGINT/SIGTERM.
pub async fn run(config: ServiceConfig, endpoints: Endpoints) -> Result<(), StartupError> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        rate_limit_requests = config.rate_limit.requests,
        rate_limit_window_secs = config.rate_limit.window_secs,
        identity_url = %config.identity.base_url,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let address = config.listener.bind_address.clone();
    let server = HttpServer::new(config, endpoints)?;

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    server.run(listener, shutdown.signal()).await?;
    Ok(())
}
