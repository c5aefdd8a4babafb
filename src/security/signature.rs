//! Service-to-service request signatures.
//!
//! A trusted caller sends `X-Service-Name`, `X-Request-At` and
//! `X-Api-Key = hex(sha256("{service}:{key}:{request_at}"))`. The key itself
//! never crosses the wire.
//!
//! The timestamp is only bound into the digest; it is not checked for
//! freshness, so a captured header triple stays valid.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::HeaderMap;
use futures_util::future::{self, BoxFuture, FutureExt};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::http::request::header_str;
use crate::pipeline::{PipelineError, RequestContext, Stage};
use crate::security::headers::{X_API_KEY, X_REQUEST_AT, X_SERVICE_NAME};

/// Lowercase hex SHA-256 of `service_name:key:timestamp`.
pub fn sign(service_name: &str, key: &str, timestamp: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{service_name}:{key}:{timestamp}").as_bytes());
    hex::encode(hasher.finalize())
}

/// The three headers of one signed outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub service_name: String,
    pub request_at: String,
    pub api_key: String,
}

impl Signature {
    /// Sign with an explicit timestamp.
    pub fn at(service_name: &str, key: &str, request_at: impl Into<String>) -> Self {
        let request_at = request_at.into();
        Self {
            api_key: sign(service_name, key, &request_at),
            service_name: service_name.to_string(),
            request_at,
        }
    }

    /// Sign with the current unix time in seconds.
    pub fn now(service_name: &str, key: &str) -> Self {
        let unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self::at(service_name, key, unix.to_string())
    }

    /// Header name/value pairs, ready to attach to a request.
    pub fn headers(&self) -> [(&'static str, &str); 3] {
        [
            (X_SERVICE_NAME, self.service_name.as_str()),
            (X_API_KEY, self.api_key.as_str()),
            (X_REQUEST_AT, self.request_at.as_str()),
        ]
    }
}

/// Verifies inbound signatures against the configured key.
pub struct SignatureVerifier {
    key: String,
}

impl SignatureVerifier {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Accept the request only if `X-Api-Key` matches the digest recomputed
    /// from the other two headers and the configured key.
    pub fn verify(&self, headers: &HeaderMap) -> Result<(), PipelineError> {
        let supplied = header_str(headers, X_API_KEY);
        if supplied.is_empty() {
            return Err(PipelineError::Unauthorized);
        }

        let expected = sign(
            header_str(headers, X_SERVICE_NAME),
            &self.key,
            header_str(headers, X_REQUEST_AT),
        );

        if bool::from(expected.as_bytes().ct_eq(supplied.as_bytes())) {
            Ok(())
        } else {
            Err(PipelineError::Unauthorized)
        }
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("key", &"<redacted>")
            .finish()
    }
}

impl Stage for SignatureVerifier {
    fn name(&self) -> &'static str {
        "signature"
    }

    fn handle<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, Result<(), PipelineError>> {
        future::ready(self.verify(ctx.headers())).boxed()
    }
}
