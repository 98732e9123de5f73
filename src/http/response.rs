//! Response construction and transformation.
//!
//! # Responsibilities
//! - Fill in CORS headers on every response without overwriting a function's own
//! - Build the gateway's own JSON responses (health, preflight, errors)
//! - Map gateway errors to HTTP status codes
//!
//! # Design Decisions
//! - Function responses pass through verbatim: status, body, headers
//! - Error bodies are always JSON with an `error` field

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use thiserror::Error;

use crate::functions::FunctionError;

/// Cross-origin headers attached to every response.
pub const CORS_HEADERS: [(HeaderName, &str); 3] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        "authorization, x-client-info, apikey, content-type",
    ),
    (
        header::ACCESS_CONTROL_ALLOW_METHODS,
        "POST, GET, OPTIONS, PUT, DELETE",
    ),
];

/// Set each CORS header that is not already present.
pub fn merge_cors(headers: &mut HeaderMap) {
    for (name, value) in CORS_HEADERS {
        if !headers.contains_key(&name) {
            headers.insert(name, HeaderValue::from_static(value));
        }
    }
}

/// Add CORS headers to a response, keeping any the response already carries.
pub fn with_cors(mut response: Response) -> Response {
    merge_cors(response.headers_mut());
    response
}

/// JSON response with CORS headers.
pub fn json_response(status: StatusCode, body: Value) -> Response {
    with_cors((status, Json(body)).into_response())
}

/// Body of `GET /health`.
pub fn health() -> Response {
    json_response(
        StatusCode::OK,
        json!({
            "status": "healthy",
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }),
    )
}

/// Answer to a CORS preflight: 204, no body.
pub fn preflight() -> Response {
    with_cors(StatusCode::NO_CONTENT.into_response())
}

/// Per-request failures, each surfaced as a JSON error response.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Missing authentication token")]
    MissingToken,

    #[error("Invalid authentication token")]
    InvalidToken,

    #[error("Function name not specified in URL path")]
    MissingRoute,

    #[error("Function '{name}' not found")]
    FunctionNotFound { name: String, available: Vec<String> },

    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Internal server error")]
    Function(#[from] FunctionError),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingToken | GatewayError::InvalidToken => StatusCode::UNAUTHORIZED,
            GatewayError::MissingRoute => StatusCode::BAD_REQUEST,
            GatewayError::FunctionNotFound { .. } => StatusCode::NOT_FOUND,
            GatewayError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Function(FunctionError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Function(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn source_message(&self) -> String {
        match self {
            GatewayError::Function(err) => err.to_string(),
            _ => "Unknown error".to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            GatewayError::FunctionNotFound { available, .. } => json!({
                "error": self.to_string(),
                "available_functions": available,
            }),
            GatewayError::Function(FunctionError::Timeout(_)) => json!({
                "error": "Function execution timed out",
                "message": self.source_message(),
            }),
            GatewayError::Function(_) => json!({
                "error": self.to_string(),
                "message": self.source_message(),
            }),
            _ => json!({ "error": self.to_string() }),
        };
        json_response(status, body)
    }
}
