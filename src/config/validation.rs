//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject missing secrets and unusable addresses
//! - Validate value ranges (limits and timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} is not a valid URL: {value}")]
    InvalidUrl { field: &'static str, value: String },
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.app_name.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "app_name" });
    }
    if config.signature_key.is_empty() {
        errors.push(ValidationError::Empty {
            field: "signature_key",
        });
    }
    if config.identity.signature_key.is_empty() {
        errors.push(ValidationError::Empty {
            field: "identity.signature_key",
        });
    }

    if config.rate_limit.requests == 0 {
        errors.push(ValidationError::Zero {
            field: "rate_limit.requests",
        });
    }
    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "rate_limit.window_secs",
        });
    }
    if config.identity.timeout_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "identity.timeout_secs",
        });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "timeouts.request_secs",
        });
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if url::Url::parse(&config.identity.base_url).is_err() {
        errors.push(ValidationError::InvalidUrl {
            field: "identity.base_url",
            value: config.identity.base_url.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
