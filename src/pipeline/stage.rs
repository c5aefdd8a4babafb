//! The unit of the request chain.

use axum::{body::Body, http::HeaderMap, http::Request};
use futures_util::future::BoxFuture;

use crate::pipeline::PipelineError;
use crate::security::identity::CallerIdentity;

/// Per-request state threaded through the stages.
///
/// Owned by the request's task; never shared between requests.
pub struct RequestContext {
    request: Request<Body>,
    identity: Option<CallerIdentity>,
}

impl RequestContext {
    pub fn new(request: Request<Body>) -> Self {
        Self {
            request,
            identity: None,
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    /// Identity resolved by an earlier stage, if any.
    pub fn identity(&self) -> Option<&CallerIdentity> {
        self.identity.as_ref()
    }

    pub fn attach_identity(&mut self, identity: CallerIdentity) {
        self.identity = Some(identity);
    }

    /// Hand the request on, carrying the identity in its extensions.
    pub fn into_request(self) -> Request<Body> {
        let mut request = self.request;
        if let Some(identity) = self.identity {
            request.extensions_mut().insert(identity);
        }
        request
    }
}

/// One step of the chain: allow (`Ok`) or stop the request with a rejection.
pub trait Stage: Send + Sync {
    /// Name used in logs and metric labels.
    fn name(&self) -> &'static str;

    fn handle<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, Result<(), PipelineError>>;
}
