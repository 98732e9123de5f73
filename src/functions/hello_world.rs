//! Built-in greeting function.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderValue, Request};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::functions::handler::{EdgeFunction, FunctionError};

#[derive(Debug, Default, Deserialize)]
struct Greeting {
    name: Option<String>,
}

/// Replies with a greeting for the `name` field of a JSON body.
///
/// An unreadable or non-JSON body greets "World".
#[derive(Debug, Default, Clone, Copy)]
pub struct HelloWorld;

#[async_trait]
impl EdgeFunction for HelloWorld {
    async fn call(&self, request: Request<Body>) -> Result<Response, FunctionError> {
        let greeting = match axum::body::to_bytes(request.into_body(), usize::MAX).await {
            Ok(bytes) => serde_json::from_slice::<Greeting>(&bytes).unwrap_or_default(),
            Err(e) => {
                tracing::debug!(error = %e, "Could not read request body");
                Greeting::default()
            }
        };

        let name = greeting.name.as_deref().unwrap_or("World");
        let message = format!("Hello, {name}! This is an Edge Function.");
        tracing::info!(%message, "Generated greeting");

        let mut response = Json(json!({
            "message": message,
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "success": true,
        }))
        .into_response();

        let headers = response.headers_mut();
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("authorization, x-client-info, apikey, content-type"),
        );

        Ok(response)
    }
}
