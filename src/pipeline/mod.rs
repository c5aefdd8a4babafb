//! Request-processing pipeline.
//!
//! # Data Flow
//! ```text
//! Incoming request (after request-id / trace / timeout layers):
//!     → panic_guard.rs (contain faults from everything below)
//!     → security::rate_limit (global budget)
//!     → security::signature (service-to-service digest)
//!     → security::authorization (remote identity + role allow-list)
//!     → business handler (reads CallerIdentity)
//! ```
//!
//! # Design Decisions
//! - Fail closed: every stage rejection is terminal
//! - Stages are plain objects behind one trait; the composer orders them
//! - Which stages guard a route is decided only by `routes::ROUTES`

pub mod composer;
pub mod error;
pub mod panic_guard;
pub mod routes;
pub mod stage;

pub use composer::{Composer, Endpoints, Pipeline};
pub use error::PipelineError;
pub use panic_guard::PanicGuard;
pub use routes::{Access, RouteSpec, ROUTES};
pub use stage::{RequestContext, Stage};
