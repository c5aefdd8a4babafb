//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use field_service::config::ServiceConfig;
use field_service::lifecycle::Shutdown;
use field_service::security::headers::{X_API_KEY, X_REQUEST_AT, X_SERVICE_NAME};
use field_service::security::signature::{sign, Signature};
use field_service::{Endpoints, HttpServer};

/// Key inbound callers sign with.
pub const FIELD_KEY: &str = "field-secret";
/// Key the field service signs identity lookups with.
pub const USER_KEY: &str = "user-secret";
/// Calling service used by the tests.
pub const CALLER: &str = "order-service";

pub const ADMIN_TOKEN: &str = "admin-token";
pub const CUSTOMER_TOKEN: &str = "customer-token";
pub const EXPIRED_TOKEN: &str = "expired-token";
pub const SLOW_TOKEN: &str = "slow-token";

/// Mock identity service.
///
/// Rejects lookups whose signature does not verify against `USER_KEY`, so a
/// successful lookup proves the outbound headers were correct.
pub struct MockIdentity {
    pub addr: SocketAddr,
    state: MockState,
}

#[derive(Clone, Default)]
struct MockState {
    calls: Arc<AtomicUsize>,
    /// Set when a `SLOW_TOKEN` lookup is dropped before it answers.
    cancelled: Arc<AtomicBool>,
}

/// Raises its flag if dropped while still armed.
struct CancelGuard {
    flag: Arc<AtomicBool>,
    armed: bool,
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if self.armed {
            self.flag.store(true, Ordering::SeqCst);
        }
    }
}

impl MockIdentity {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub fn lookup_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }
}

pub async fn start_mock_identity() -> MockIdentity {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = MockState::default();

    let app = Router::new()
        .route("/api/v1/auth/user", get(user_by_token))
        .with_state(state.clone());

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockIdentity { addr, state }
}

async fn user_by_token(
    State(state): State<MockState>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    state.calls.fetch_add(1, Ordering::SeqCst);

    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };

    let service = header(X_SERVICE_NAME);
    let expected = sign(&service, USER_KEY, &header(X_REQUEST_AT));
    if service != "field-service" || header(X_API_KEY) != expected {
        return envelope_error(StatusCode::UNAUTHORIZED, "invalid signature");
    }

    let token = header("authorization")
        .strip_prefix("Bearer ")
        .unwrap_or_default()
        .to_string();

    let role = match token.as_str() {
        ADMIN_TOKEN => "admin",
        CUSTOMER_TOKEN => "customer",
        EXPIRED_TOKEN => return envelope_error(StatusCode::UNAUTHORIZED, "token expired"),
        SLOW_TOKEN => {
            let mut guard = CancelGuard {
                flag: state.cancelled.clone(),
                armed: true,
            };
            tokio::time::sleep(Duration::from_secs(5)).await;
            guard.armed = false;
            "admin"
        }
        _ => return envelope_error(StatusCode::NOT_FOUND, "user not found"),
    };

    (
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "message": "success",
            "data": {
                "uuid": "6f1c2a8e-3b9d-4c5e-9f0a-1b2c3d4e5f60",
                "name": format!("{role} user"),
                "username": role,
                "email": format!("{role}@example.com"),
                "role": role,
                "phoneNumber": "+620000000"
            }
        })),
    )
}

fn envelope_error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "status": "error", "message": message })))
}

/// Config pointing at `identity_url`, with a generous rate limit.
pub fn test_config(identity_url: &str) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.signature_key = FIELD_KEY.to_string();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.rate_limit.requests = 1000;
    config.identity.base_url = identity_url.to_string();
    config.identity.signature_key = USER_KEY.to_string();
    config.identity.timeout_secs = 1;
    config.observability.metrics_enabled = false;
    config
}

/// A field service running on an ephemeral port.
pub struct RunningService {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

impl RunningService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub async fn start_service(config: ServiceConfig, endpoints: Endpoints) -> RunningService {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config, endpoints).unwrap();

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, shutdown.signal()));

    RunningService {
        addr,
        shutdown,
        handle,
    }
}

/// Signature headers for `CALLER`, optionally with a bearer token.
pub fn signed_headers(token: Option<&str>) -> reqwest::header::HeaderMap {
    let signature = Signature::now(CALLER, FIELD_KEY);
    let mut headers = reqwest::header::HeaderMap::new();
    for (name, value) in signature.headers() {
        headers.insert(name, value.parse().unwrap());
    }
    if let Some(token) = token {
        headers.insert(
            reqwest::header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
    }
    headers
}

/// An address nothing listens on.
pub async fn closed_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
