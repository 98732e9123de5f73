//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → server.rs gateway handler:
//!         path normalization (dot segments)
//!         /health → response.rs health
//!         OPTIONS → response.rs preflight
//!         auth (token extraction + verification)
//!         routing (function name), registry existence check
//!         body limit, functions (load / invoke)
//!     → response.rs (CORS merge, error translation)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, X_REQUEST_ID};
pub use response::{GatewayError, CORS_HEADERS};
pub use server::{GatewayState, HttpServer};
