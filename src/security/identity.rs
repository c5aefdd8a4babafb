//! Caller identity and the resolver seam.

use axum::{extract::FromRequestParts, http::request::Parts};
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::pipeline::PipelineError;

/// The authenticated user behind a request.
///
/// Inserted into request extensions by the authorization gate and read-only
/// afterwards. Handlers take it as an argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub user_id: Uuid,
    pub role: String,
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

impl CallerIdentity {
    pub fn new(user_id: Uuid, role: impl Into<String>) -> Self {
        Self {
            user_id,
            role: role.into(),
            name: None,
            username: None,
            email: None,
            phone_number: None,
        }
    }
}

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = PipelineError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or(PipelineError::Unauthorized)
    }
}

/// Errors from an identity lookup.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Connection, TLS or body read failure.
    #[error("identity service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("identity lookup timed out after {0} seconds")]
    Timeout(u64),

    /// Non-success reply; `message` is the service's own explanation.
    #[error("identity service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed identity response: {0}")]
    Decode(String),

    #[error("invalid identity: {0}")]
    InvalidIdentity(&'static str),
}

/// Resolves a bearer token to the user it belongs to.
pub trait IdentityResolver: Send + Sync {
    fn resolve<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<CallerIdentity, IdentityError>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn test_extractor_reads_extension() {
        let identity = CallerIdentity::new(Uuid::new_v4(), "admin");
        let mut request = Request::new(());
        request.extensions_mut().insert(identity.clone());
        let (mut parts, _) = request.into_parts();

        let extracted = CallerIdentity::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted, identity);
    }

    #[tokio::test]
    async fn test_extractor_without_identity_is_unauthorized() {
        let (mut parts, _) = Request::new(()).into_parts();
        let err = CallerIdentity::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err, PipelineError::Unauthorized);
    }

    #[test]
    fn test_status_error_display() {
        let err = IdentityError::Status {
            status: 401,
            message: "token expired".into(),
        };
        assert_eq!(err.to_string(), "identity service returned 401: token expired");
    }
}
