//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower::ServiceExt;

use edge_gateway::auth::{sign_token, unix_now};
use edge_gateway::functions::{EdgeFunction, FunctionError, FunctionRegistry};
use edge_gateway::{GatewayConfig, HttpServer};

pub const SECRET: &str = "s3cr3t";
pub const ANON_KEY: &str = "anon-key";
pub const SERVICE_KEY: &str = "service-role-key";

/// Config with auth required and the test secret/bypass keys.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.auth.jwt_secret = SECRET.into();
    config.auth.anon_key = ANON_KEY.into();
    config.auth.service_role_key = SERVICE_KEY.into();
    config.auth.require_auth = true;
    config.listener.bind_address = "127.0.0.1:0".into();
    config
}

/// A valid token that expires in an hour.
pub fn valid_token() -> String {
    sign_token(SECRET, &json!({ "role": "authenticated", "exp": unix_now() + 3600 })).unwrap()
}

/// Echoes method, path and body back as JSON.
pub struct Echo;

#[async_trait]
impl EdgeFunction for Echo {
    async fn call(&self, request: Request<Body>) -> Result<Response, FunctionError> {
        let (parts, body) = request.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(|e| FunctionError::Execution(e.to_string()))?;
        let client_info = parts
            .headers
            .get("x-client-info")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(Json(json!({
            "method": parts.method.as_str(),
            "path": parts.uri.path(),
            "body": String::from_utf8_lossy(&bytes),
            "client_info": client_info,
        }))
        .into_response())
    }
}

/// Sets its own CORS origin and a custom status/header.
pub struct CustomHeaders;

#[async_trait]
impl EdgeFunction for CustomHeaders {
    async fn call(&self, _request: Request<Body>) -> Result<Response, FunctionError> {
        let mut response = (StatusCode::CREATED, "created").into_response();
        response.headers_mut().insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("https://app.example"),
        );
        response
            .headers_mut()
            .insert("x-custom", HeaderValue::from_static("yes"));
        Ok(response)
    }
}

/// Always fails during execution.
pub struct Failing;

#[async_trait]
impl EdgeFunction for Failing {
    async fn call(&self, _request: Request<Body>) -> Result<Response, FunctionError> {
        Err(FunctionError::Execution("database unavailable".into()))
    }
}

/// Panics during execution.
pub struct Panicking;

#[async_trait]
impl EdgeFunction for Panicking {
    async fn call(&self, _request: Request<Body>) -> Result<Response, FunctionError> {
        panic!("handler crashed");
    }
}

/// Never answers within a test deadline.
pub struct Slow;

#[async_trait]
impl EdgeFunction for Slow {
    async fn call(&self, _request: Request<Body>) -> Result<Response, FunctionError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(StatusCode::OK.into_response())
    }
}

/// Builtin functions plus the test doubles above.
pub fn test_registry() -> FunctionRegistry {
    let mut registry = FunctionRegistry::builtin();
    registry.register_instance("echo", std::sync::Arc::new(Echo));
    registry.register_instance("custom-headers", std::sync::Arc::new(CustomHeaders));
    registry.register_instance("failing", std::sync::Arc::new(Failing));
    registry.register_instance("panicking", std::sync::Arc::new(Panicking));
    registry.register_instance("slow", std::sync::Arc::new(Slow));
    registry.register("broken", || Err(FunctionError::Load("missing default export".into())));
    registry
}

pub fn gateway(config: GatewayConfig) -> Router {
    HttpServer::new(config, test_registry()).router()
}

/// Send a request through the router, returning status, headers and raw body.
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    (status, headers, body)
}

/// Same as [`send`] with the body parsed as JSON.
pub async fn send_json(router: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let (status, headers, body) = send(router, request).await;
    let json = serde_json::from_slice(&body)
        .unwrap_or_else(|e| panic!("body is not JSON ({e}): {:?}", String::from_utf8_lossy(&body)));
    (status, headers, json)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn assert_cors(headers: &HeaderMap) {
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(
        headers["access-control-allow-headers"],
        "authorization, x-client-info, apikey, content-type"
    );
    assert_eq!(
        headers["access-control-allow-methods"],
        "POST, GET, OPTIONS, PUT, DELETE"
    );
}
