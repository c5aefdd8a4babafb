//! Metrics collection and exposition.
//!
//! # Metrics
//! - `field_service_requests_total` (counter): requests by route, status
//! - `field_service_pipeline_rejections_total` (counter): rejections by stage, reason
//! - `field_service_panics_total` (counter): panics contained by the guard
//! - `field_service_identity_lookup_seconds` (histogram): identity service latency
//!
//! Without an installed recorder every call here is a no-op, so tests can
//! exercise instrumented code freely.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request.
pub fn record_request(route: &'static str, status: u16) {
    counter!(
        "field_service_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a request terminated by a pipeline stage.
pub fn record_rejection(stage: &'static str, reason: &'static str) {
    counter!(
        "field_service_pipeline_rejections_total",
        "stage" => stage,
        "reason" => reason
    )
    .increment(1);
}

/// Record a panic caught by the guard.
pub fn record_panic() {
    counter!("field_service_panics_total").increment(1);
}

/// Record the latency of one identity lookup.
pub fn record_identity_lookup(outcome: &'static str, start: Instant) {
    histogram!("field_service_identity_lookup_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}
