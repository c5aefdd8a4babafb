//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (global request budget)
//!     → signature.rs (verify X-Api-Key digest)
//!     → authorization.rs (resolve bearer token, check role)
//!     → Pass to handler
//! ```
//!
//! # Design Decisions
//! - Defense in depth: multiple layers of protection
//! - Fail closed: reject on any security check failure
//! - No trust in client input

pub mod authorization;
pub mod headers;
pub mod identity;
pub mod rate_limit;
pub mod signature;

pub use authorization::AuthorizationGate;
pub use identity::{CallerIdentity, IdentityError, IdentityResolver};
pub use rate_limit::RateLimiter;
pub use signature::{Signature, SignatureVerifier};
