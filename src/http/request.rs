//! Request metadata helpers.
//!
//! # Responsibilities
//! - Generate a request ID (UUID v4) when the client did not send one
//! - Echo the request ID on the response
//! - Read header values the pipeline cares about
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Headers that are absent or not visible ASCII read as empty

use axum::http::{HeaderMap, HeaderName};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Layer that stamps `X-Request-Id` on requests lacking one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid)
}

/// Layer that copies the request's `X-Request-Id` onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

/// Header value as text, empty when absent or unreadable.
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// The request ID for log lines.
pub fn request_id(headers: &HeaderMap) -> &str {
    match header_str(headers, X_REQUEST_ID.as_str()) {
        "" => "unknown",
        id => id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_header_str_missing_is_empty() {
        let headers = HeaderMap::new();
        assert_eq!(header_str(&headers, "x-service-name"), "");
        assert_eq!(request_id(&headers), "unknown");
    }

    #[test]
    fn test_header_str_non_ascii_is_empty() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-service-name",
            HeaderValue::from_bytes(b"caf\xe9").unwrap(),
        );
        assert_eq!(header_str(&headers, "x-service-name"), "");
    }

    #[test]
    fn test_request_id_read() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc-123"));
        assert_eq!(request_id(&headers), "abc-123");
    }
}
