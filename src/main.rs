//! Field service (v1)
//!
//! Request pipeline for the field-service HTTP API, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ request-id ─▶ trace ─▶ timeout ─▶ route match
//!                                                           │
//!                          ┌────────────────────────────────┘
//!                          ▼
//!                    ┌───────────┐   ┌────────────┐   ┌───────────┐   ┌───────────────┐
//!                    │panic guard│──▶│ rate limit │──▶│ signature │──▶│ authorization │──▶ handler
//!                    └───────────┘   └────────────┘   └───────────┘   └───────┬───────┘
//!                                                                             │
//!                                                                             ▼
//!                                                                    identity service
//!                                                                    (user-by-token)
//! ```
//!
//! Which stages run for a route is decided by `pipeline::routes::ROUTES`.

use std::path::PathBuf;

use clap::Parser;

use field_service::config::load_config;
use field_service::lifecycle::startup;
use field_service::observability::logging;
use field_service::Endpoints;

#[derive(Parser)]
#[command(name = "field-service")]
#[command(about = "Field service API request pipeline", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args.config)?;

    logging::init_logging(&config.observability);

    tracing::info!(
        app_name = %config.app_name,
        version = env!("CARGO_PKG_VERSION"),
        "field-service starting"
    );

    startup::run(config, Endpoints::new()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
