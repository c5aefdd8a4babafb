//! HTTP client for the user (identity) service.
//!
//! # Responsibilities
//! - Sign each call as this service (`X-Service-Name`, `X-Api-Key`, `X-Request-At`)
//! - Forward the caller's bearer token
//! - Bound each lookup with a timeout
//! - Map the service's reply envelope to a `CallerIdentity`

use std::time::{Duration, Instant};

use futures_util::future::{BoxFuture, FutureExt};
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::time::timeout;
use url::Url;
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::observability::metrics;
use crate::security::identity::{CallerIdentity, IdentityError, IdentityResolver};
use crate::security::signature::Signature;

use super::ClientError;

/// Path of the "who owns this token" endpoint.
pub const USER_BY_TOKEN_PATH: &str = "api/v1/auth/user";

/// Reply envelope of the user service.
#[derive(Debug, Deserialize)]
pub struct UserResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<UserData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub uuid: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub role: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl UserData {
    fn into_identity(self) -> Result<CallerIdentity, IdentityError> {
        if self.role.trim().is_empty() {
            return Err(IdentityError::InvalidIdentity("empty role"));
        }
        Ok(CallerIdentity {
            user_id: self.uuid,
            role: self.role,
            name: self.name,
            username: self.username,
            email: self.email,
            phone_number: self.phone_number,
        })
    }
}

/// Identity resolver backed by the user service.
#[derive(Clone)]
pub struct UserClient {
    http: reqwest::Client,
    user_url: Url,
    app_name: String,
    signature_key: String,
    timeout: Duration,
}

impl UserClient {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        app_name: impl Into<String>,
        signature_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        let user_url = base.join(USER_BY_TOKEN_PATH)?;

        Ok(Self {
            http,
            user_url,
            app_name: app_name.into(),
            signature_key: signature_key.into(),
            timeout,
        })
    }

    pub fn from_config(http: reqwest::Client, config: &ServiceConfig) -> Result<Self, ClientError> {
        Self::new(
            http,
            &config.identity.base_url,
            config.app_name.clone(),
            config.identity.signature_key.clone(),
            Duration::from_secs(config.identity.timeout_secs),
        )
    }

    pub fn user_url(&self) -> &Url {
        &self.user_url
    }

    /// Look up the user owning `token`.
    pub async fn get_user_by_token(&self, token: &str) -> Result<CallerIdentity, IdentityError> {
        let start = Instant::now();

        let result = match timeout(self.timeout, self.fetch_user(token)).await {
            Ok(result) => result,
            Err(_) => Err(IdentityError::Timeout(self.timeout.as_secs())),
        };

        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics::record_identity_lookup(outcome, start);
        result
    }

    async fn fetch_user(&self, token: &str) -> Result<CallerIdentity, IdentityError> {
        let signature = Signature::now(&self.app_name, &self.signature_key);

        let mut request = self.http.get(self.user_url.clone()).bearer_auth(token);
        for (name, value) in signature.headers() {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        let envelope = serde_json::from_slice::<UserResponse>(&body);

        if status != StatusCode::OK {
            return Err(IdentityError::Status {
                status: status.as_u16(),
                message: envelope.map(|e| e.message).unwrap_or_default(),
            });
        }

        let envelope = envelope.map_err(|e| IdentityError::Decode(e.to_string()))?;
        envelope
            .data
            .ok_or(IdentityError::InvalidIdentity("missing user data"))?
            .into_identity()
    }
}

impl IdentityResolver for UserClient {
    fn resolve<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<CallerIdentity, IdentityError>> {
        self.get_user_by_token(token).boxed()
    }
}

impl std::fmt::Debug for UserClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserClient")
            .field("user_url", &self.user_url.as_str())
            .field("app_name", &self.app_name)
            .field("timeout_secs", &self.timeout.as_secs())
            .finish()
    }
}
