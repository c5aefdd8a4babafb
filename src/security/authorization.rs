//! Role-based authorization backed by the remote identity service.
//!
//! The gate resolves the caller on every request (no caching), then checks
//! the resolved role against the route's allow-list.

use std::sync::Arc;

use axum::http::HeaderMap;
use futures_util::future::{BoxFuture, FutureExt};

use crate::http::request::request_id;
use crate::pipeline::{PipelineError, RequestContext, Stage};
use crate::security::headers::bearer_token;
use crate::security::identity::{CallerIdentity, IdentityResolver};

pub struct AuthorizationGate {
    resolver: Arc<dyn IdentityResolver>,
    allowed_roles: Vec<String>,
    require_token: bool,
}

impl AuthorizationGate {
    /// Gate for human-user routes: a missing bearer token is rejected before
    /// the identity service is contacted.
    pub fn require_token<I, R>(resolver: Arc<dyn IdentityResolver>, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self::build(resolver, roles, true)
    }

    /// Gate for service routes: whatever token is present (possibly none) is
    /// forwarded to the identity service.
    pub fn without_token_check<I, R>(resolver: Arc<dyn IdentityResolver>, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self::build(resolver, roles, false)
    }

    fn build<I, R>(resolver: Arc<dyn IdentityResolver>, roles: I, require_token: bool) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self {
            resolver,
            allowed_roles: roles.into_iter().map(Into::into).collect(),
            require_token,
        }
    }

    /// Resolve the caller and check its role.
    pub async fn authorize(&self, headers: &HeaderMap) -> Result<CallerIdentity, PipelineError> {
        let token = match bearer_token(headers) {
            Some(token) => token,
            None if self.require_token => return Err(PipelineError::Unauthorized),
            None => "",
        };

        let identity = match self.resolver.resolve(token).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(
                    request_id = %request_id(headers),
                    error = %e,
                    "Identity resolution failed"
                );
                return Err(PipelineError::Unauthorized);
            }
        };

        if !self.allowed_roles.iter().any(|role| *role == identity.role) {
            tracing::info!(
                request_id = %request_id(headers),
                user_id = %identity.user_id,
                role = %identity.role,
                "Role not permitted for route"
            );
            return Err(PipelineError::Forbidden);
        }

        Ok(identity)
    }
}

impl Stage for AuthorizationGate {
    fn name(&self) -> &'static str {
        "authorization"
    }

    fn handle<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, Result<(), PipelineError>> {
        async move {
            let identity = self.authorize(ctx.headers()).await?;
            ctx.attach_identity(identity);
            Ok(())
        }
        .boxed()
    }
}
