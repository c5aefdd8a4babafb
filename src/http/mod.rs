//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, global layers)
//!     → request.rs (request ID, header access)
//!     → [pipeline decides admit / reject]
//!     → response.rs (JSON envelopes)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::ApiResponse;
pub use server::HttpServer;
