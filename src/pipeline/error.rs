//! Terminal outcomes of the pipeline.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::http::response::error_response;

/// Why a request was stopped before reaching its handler.
///
/// `Display` is the exact message placed in the error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("unauthorized")]
    Unauthorized,

    /// Role not in the route's allow-list. Shares 401 with `Unauthorized`.
    #[error("forbidden")]
    Forbidden,

    #[error("too many requests")]
    TooManyRequests,

    #[error("internal server error")]
    Internal,
}

impl PipelineError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::Unauthorized | PipelineError::Forbidden => StatusCode::UNAUTHORIZED,
            PipelineError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            PipelineError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metric label.
    pub fn reason(&self) -> &'static str {
        match self {
            PipelineError::Unauthorized => "unauthorized",
            PipelineError::Forbidden => "forbidden",
            PipelineError::TooManyRequests => "rate_limited",
            PipelineError::Internal => "internal",
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(PipelineError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(PipelineError::Forbidden.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            PipelineError::TooManyRequests.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            PipelineError::Internal.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(PipelineError::Unauthorized.to_string(), "unauthorized");
        assert_eq!(PipelineError::Forbidden.to_string(), "forbidden");
        assert_eq!(PipelineError::TooManyRequests.to_string(), "too many requests");
        assert_eq!(PipelineError::Internal.to_string(), "internal server error");
    }

    #[tokio::test]
    async fn test_into_response_body() {
        let response = PipelineError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "status": "error", "message": "forbidden" }));
    }
}
