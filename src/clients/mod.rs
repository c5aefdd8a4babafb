//! Outbound clients for other services.
//!
//! The registry is built once at startup and hands out configured clients;
//! all of them share one connection pool.

pub mod user;

use thiserror::Error;

use crate::config::ServiceConfig;

pub use user::UserClient;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Configured clients for every service this one talks to.
#[derive(Debug, Clone)]
pub struct ClientRegistry {
    user: UserClient,
}

impl ClientRegistry {
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .default_headers(default_headers())
            .build()?;

        Ok(Self {
            user: UserClient::from_config(http, config)?,
        })
    }

    pub fn user(&self) -> &UserClient {
        &self.user
    }
}

fn default_headers() -> reqwest::header::HeaderMap {
    use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}
