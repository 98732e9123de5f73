//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request headers
//!     → extract.rs (Authorization: Bearer …, else apikey)
//!     → token.rs (bypass keys, HS256 signature, exp)
//!     → bool
//! ```
//!
//! # Design Decisions
//! - Verification failures are logged but never surface as errors
//! - Secrets are read once from config; the verifier is immutable

pub mod extract;
pub mod token;

pub use extract::extract_token;
pub use token::{sign_token, unix_now, TokenError, TokenVerifier};
