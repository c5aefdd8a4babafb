//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build shared pipeline components (rate limiter, verifier, identity client)
//! - Mount the route table behind per-route pipelines
//! - Wire up global layers (request ID, tracing, request timeout)
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::clients::{ClientError, ClientRegistry};
use crate::config::ServiceConfig;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::response::ApiResponse;
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::pipeline::routes::{HEALTH, ROUTES};
use crate::pipeline::{Composer, Endpoints};
use crate::security::{IdentityResolver, RateLimiter, SignatureVerifier};

/// HTTP server for the field service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a server resolving identities through the configured user service.
    pub fn new(config: ServiceConfig, endpoints: Endpoints) -> Result<Self, ClientError> {
        let registry = ClientRegistry::from_config(&config)?;
        let resolver: Arc<dyn IdentityResolver> = Arc::new(registry.user().clone());
        Ok(Self::with_resolver(config, endpoints, resolver))
    }

    /// Create a server with an explicit identity resolver.
    pub fn with_resolver(
        config: ServiceConfig,
        endpoints: Endpoints,
        resolver: Arc<dyn IdentityResolver>,
    ) -> Self {
        let composer = Composer::new(
            Arc::new(RateLimiter::from_config(&config.rate_limit)),
            Arc::new(SignatureVerifier::new(config.signature_key.clone())),
            resolver,
        );

        let endpoints = if endpoints.contains(HEALTH) {
            endpoints
        } else {
            endpoints.handle(HEALTH, health)
        };

        let router = Self::build_router(&config, &composer, endpoints);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, composer: &Composer, endpoints: Endpoints) -> Router {
        composer
            .compose(ROUTES, endpoints)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            app_name = %self.config.app_name,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.wait().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router (for in-process testing).
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub version: &'static str,
    pub status: &'static str,
}

async fn health() -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse::success(HealthStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    }))
}
