//! Per-route pipeline assembly.
//!
//! # Stage order
//! ```text
//! PanicGuard (always, outermost)
//!     → RateLimiter (always)
//!     → SignatureVerifier (Service, ServiceWithRoles, User)
//!     → AuthorizationGate (ServiceWithRoles: no token check, User: token required)
//!     → business handler
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    handler::Handler,
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{on, MethodFilter, MethodRouter},
    Router,
};

use crate::http::request::request_id;
use crate::http::response::{method_not_allowed, not_found, not_implemented};
use crate::observability::metrics;
use crate::pipeline::panic_guard::PanicGuard;
use crate::pipeline::routes::{Access, RouteSpec};
use crate::pipeline::stage::{RequestContext, Stage};
use crate::security::authorization::AuthorizationGate;
use crate::security::identity::IdentityResolver;
use crate::security::rate_limit::RateLimiter;
use crate::security::signature::SignatureVerifier;

/// Metric and log label for requests that match no route.
pub const UNMATCHED: &str = "unmatched";

/// The ordered chain guarding one route.
pub struct Pipeline {
    route: &'static str,
    guard: PanicGuard,
    stages: Vec<Arc<dyn Stage>>,
}

impl Pipeline {
    pub fn new(route: &'static str, stages: Vec<Arc<dyn Stage>>) -> Self {
        Self {
            route,
            guard: PanicGuard,
            stages,
        }
    }

    /// Stage names in execution order (the panic guard is implicit).
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Run the stages, then the handler, all under the panic guard.
    pub async fn process(&self, request: Request<Body>, next: Next) -> Response {
        let request_id = request_id(request.headers()).to_owned();
        let response = self
            .guard
            .guard(&request_id, self.run(&request_id, request, next))
            .await;
        metrics::record_request(self.route, response.status().as_u16());
        response
    }

    async fn run(&self, request_id: &str, request: Request<Body>, next: Next) -> Response {
        let mut ctx = RequestContext::new(request);

        for stage in &self.stages {
            if let Err(rejection) = stage.handle(&mut ctx).await {
                tracing::warn!(
                    request_id = %request_id,
                    route = self.route,
                    stage = stage.name(),
                    reason = %rejection,
                    "Request rejected"
                );
                metrics::record_rejection(stage.name(), rejection.reason());
                return rejection.into_response();
            }
        }

        next.run(ctx.into_request()).await
    }
}

/// Middleware adapter so a `Pipeline` can be layered onto a route.
pub async fn pipeline_middleware(
    State(pipeline): State<Arc<Pipeline>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    pipeline.process(request, next).await
}

type MakeRoute = Box<dyn FnOnce(MethodFilter) -> MethodRouter + Send>;

/// Business handlers keyed by route name.
///
/// Routes left unregistered answer `501 Not Implemented` (behind their
/// pipeline, like any other route).
#[derive(Default)]
pub struct Endpoints {
    handlers: HashMap<&'static str, MakeRoute>,
}

impl Endpoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for route `name`.
    pub fn handle<H, T>(mut self, name: &'static str, handler: H) -> Self
    where
        H: axum::handler::Handler<T, ()>,
        T: 'static,
    {
        self.handlers
            .insert(name, Box::new(move |method| on(method, handler)));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    fn take(&mut self, name: &str) -> Option<MakeRoute> {
        self.handlers.remove(name)
    }
}

/// Builds pipelines from shared, process-wide components.
#[derive(Clone)]
pub struct Composer {
    rate_limiter: Arc<RateLimiter>,
    verifier: Arc<SignatureVerifier>,
    resolver: Arc<dyn IdentityResolver>,
}

impl Composer {
    pub fn new(
        rate_limiter: Arc<RateLimiter>,
        verifier: Arc<SignatureVerifier>,
        resolver: Arc<dyn IdentityResolver>,
    ) -> Self {
        Self {
            rate_limiter,
            verifier,
            resolver,
        }
    }

    /// The stage list for one access level.
    pub fn pipeline(&self, route: &'static str, access: Access) -> Pipeline {
        let mut stages: Vec<Arc<dyn Stage>> = vec![self.rate_limiter.clone()];

        match access {
            Access::Public => {}
            Access::Service => {
                stages.push(self.verifier.clone());
            }
            Access::ServiceWithRoles(roles) => {
                stages.push(self.verifier.clone());
                stages.push(Arc::new(AuthorizationGate::without_token_check(
                    self.resolver.clone(),
                    roles.iter().copied(),
                )));
            }
            Access::User(roles) => {
                stages.push(self.verifier.clone());
                stages.push(Arc::new(AuthorizationGate::require_token(
                    self.resolver.clone(),
                    roles.iter().copied(),
                )));
            }
        }

        Pipeline::new(route, stages)
    }

    /// Mount every route of `routes`, each behind its own pipeline.
    ///
    /// Requests matching no route (unknown path, or a known path with another
    /// method) still run the panic guard and the rate limiter.
    pub fn compose(&self, routes: &[RouteSpec], mut endpoints: Endpoints) -> Router {
        let unmatched = Arc::new(self.pipeline(UNMATCHED, Access::Public));

        let mut paths: Vec<(&'static str, Vec<&RouteSpec>)> = Vec::new();
        for spec in routes {
            match paths.iter_mut().find(|(path, _)| *path == spec.path) {
                Some((_, specs)) => specs.push(spec),
                None => paths.push((spec.path, vec![spec])),
            }
        }

        let mut router = Router::new();
        for (path, specs) in paths {
            let method_router = specs
                .into_iter()
                .map(|spec| self.guarded(spec, &mut endpoints))
                .reduce(|merged, next| merged.merge(next));

            if let Some(method_router) = method_router {
                let fallback = method_not_allowed.layer(middleware::from_fn_with_state(
                    unmatched.clone(),
                    pipeline_middleware,
                ));
                router = router.route(path, method_router.fallback(fallback));
            }
        }

        for name in endpoints.handlers.keys() {
            tracing::warn!(route = *name, "Handler registered for unknown route");
        }

        router.fallback(not_found.layer(middleware::from_fn_with_state(
            unmatched,
            pipeline_middleware,
        )))
    }

    /// One route's handler (or the 501 placeholder) behind its pipeline.
    fn guarded(&self, spec: &RouteSpec, endpoints: &mut Endpoints) -> MethodRouter {
        let pipeline = Arc::new(self.pipeline(spec.name, spec.access));
        let method_router = match endpoints.take(spec.name) {
            Some(make_route) => make_route(spec.method),
            None => {
                tracing::debug!(route = spec.name, "No handler registered");
                on(spec.method, not_implemented)
            }
        };
        method_router.route_layer(middleware::from_fn_with_state(pipeline, pipeline_middleware))
    }
}
