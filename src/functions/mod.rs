//! Edge function subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     FunctionRegistry::builtin()
//!     → register(name, factory) for each compiled-in function
//!     → with_disabled(config.functions.disabled)
//!     → frozen, shared via Arc
//!
//! Per request:
//!     function name (from routing)
//!     → registry.rs (exists / load)
//!     → handler.rs (invoke with deadline, panics caught)
//!     → Response
//! ```

pub mod handler;
pub mod hello_world;
pub mod registry;

pub use handler::{invoke, EdgeFunction, FunctionError};
pub use hello_world::HelloWorld;
pub use registry::{FunctionFactory, FunctionRegistry, RegistryError};
