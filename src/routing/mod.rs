//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request path
//!     → router.rs (resolve dot segments, split path, drop empty segments)
//!     → Return: last segment as function name, or None
//! ```
//!
//! # Design Decisions
//! - Only the final path segment is significant: `/hello`,
//!   `/functions/v1/hello` and `/anything/hello` all route to `hello`
//! - No prefix table, nothing compiled at startup
//! - Deterministic: same input always yields the same name

pub mod router;

pub use router::{normalize_path, route_of_path, HEALTH_PATH};
