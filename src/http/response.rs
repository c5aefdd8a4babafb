//! Response envelopes.
//!
//! Every JSON body this service produces has the same outer shape:
//! `{ "status": "success" | "error", "message": ..., "data": ... }`.
//! Error bodies omit `data`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

/// Standard JSON envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Successful envelope carrying `data`.
    pub fn success(data: T) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: STATUS_SUCCESS.to_string(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Error envelope with no payload.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            message: message.into(),
            data: None,
        }
    }
}

/// Build an error response with the standard envelope.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::error(message))).into_response()
}

/// Fallback for routes whose business handler has not been registered.
pub async fn not_implemented() -> Response {
    error_response(StatusCode::NOT_IMPLEMENTED, "not implemented")
}

/// Fallback for paths outside the route table.
pub async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "not found")
}

/// Fallback for a known path requested with a method it does not serve.
pub async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::error("unauthorized")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "status": "error", "message": "unauthorized" })
        );
    }

    #[test]
    fn test_success_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::success(serde_json::json!({ "ok": true })))
            .unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "success");
        assert_eq!(body["data"]["ok"], true);
    }
}
