//! The contract every edge function implements.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use futures_util::FutureExt;
use thiserror::Error;

/// Failures raised while loading or running a function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FunctionError {
    #[error("failed to load function: {0}")]
    Load(String),

    #[error("{0}")]
    Execution(String),

    #[error("function did not respond within {0:?}")]
    Timeout(Duration),
}

/// A request handler mounted under its function name.
///
/// The gateway hands over the inbound request untouched and returns the
/// response as-is apart from CORS headers it fills in.
#[async_trait]
pub trait EdgeFunction: Send + Sync {
    async fn call(&self, request: Request<Body>) -> Result<Response, FunctionError>;
}

/// Run a function under a deadline, turning panics into [`FunctionError::Execution`].
pub async fn invoke(
    function: Arc<dyn EdgeFunction>,
    request: Request<Body>,
    deadline: Duration,
) -> Result<Response, FunctionError> {
    let call = AssertUnwindSafe(function.call(request)).catch_unwind();

    match tokio::time::timeout(deadline, call).await {
        Ok(Ok(result)) => result,
        Ok(Err(panic)) => Err(FunctionError::Execution(panic_message(panic.as_ref()))),
        Err(_) => Err(FunctionError::Timeout(deadline)),
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "Unknown error".to_string()
    }
}
