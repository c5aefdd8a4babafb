//! Header names consumed by the pipeline and bearer-token extraction.

use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::http::request::header_str;

/// Hex SHA-256 digest proving the caller holds the shared key.
pub const X_API_KEY: &str = "x-api-key";
/// Name of the calling service, first part of the signed string.
pub const X_SERVICE_NAME: &str = "x-service-name";
/// Caller-chosen timestamp, last part of the signed string.
pub const X_REQUEST_AT: &str = "x-request-at";

/// The bearer token from `Authorization`, with an optional `Bearer ` prefix
/// removed. `None` when the header is absent or blank.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = header_str(headers, AUTHORIZATION.as_str()).trim();
    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ if value.eq_ignore_ascii_case("bearer") => "",
        _ => value,
    };
    (!token.is_empty()).then_some(token)
}
