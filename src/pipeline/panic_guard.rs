//! Last-resort containment of panics raised while handling a request.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use axum::response::{IntoResponse, Response};
use futures_util::FutureExt;

use crate::observability::metrics;
use crate::pipeline::PipelineError;

/// Converts a panic anywhere inside the wrapped future into a generic 500.
///
/// The panic payload is logged; the caller only ever sees
/// "internal server error".
#[derive(Debug, Clone, Copy, Default)]
pub struct PanicGuard;

impl PanicGuard {
    pub async fn guard<F>(&self, request_id: &str, fut: F) -> Response
    where
        F: Future<Output = Response>,
    {
        match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(response) => response,
            Err(payload) => {
                tracing::error!(
                    request_id = %request_id,
                    panic = %panic_message(payload.as_ref()),
                    "Recovered from panic"
                );
                metrics::record_panic();
                PipelineError::Internal.into_response()
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
