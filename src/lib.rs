//! Edge Function Gateway Library
//!
//! Authenticates inbound requests with bearer tokens and dispatches them by
//! the last path segment to a registered edge function.

pub mod auth;
pub mod config;
pub mod functions;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::GatewayConfig;
pub use functions::{EdgeFunction, FunctionRegistry};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
