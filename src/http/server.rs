//! HTTP server setup and the gateway request handler.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all gateway handler
//! - Wire up middleware (tracing, request ID)
//! - Bind server to listener, shut down gracefully
//! - Per request: health, preflight, auth, routing, body limit, dispatch, CORS merge
//!
//! # Design Decisions
//! - Body limit applies only to requests bound for a registered function
//! - Metric labels: function name for registered functions, fixed labels otherwise

use axum::{
    body::Body,
    extract::State,
    http::{header, Method, Request},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use http_body_util::Limited;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::auth::{extract_token, TokenVerifier};
use crate::config::GatewayConfig;
use crate::functions::{invoke, FunctionRegistry, RegistryError};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::response::{self, GatewayError};
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::metrics;
use crate::routing::{normalize_path, route_of_path, HEALTH_PATH};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<GatewayConfig>,
    pub verifier: Arc<TokenVerifier>,
    pub registry: Arc<FunctionRegistry>,
}

impl GatewayState {
    pub fn new(config: GatewayConfig, registry: FunctionRegistry) -> Self {
        let verifier = TokenVerifier::new(&config.auth);
        let registry = registry.with_disabled(config.functions.disabled.iter().cloned());
        if registry.is_empty() {
            tracing::warn!("No functions enabled; routed requests will get 404");
        } else {
            tracing::info!(functions = registry.len(), "Functions enabled");
        }
        Self {
            config: Arc::new(config),
            verifier: Arc::new(verifier),
            registry: Arc::new(registry),
        }
    }
}

/// HTTP server for the edge gateway.
pub struct HttpServer {
    router: Router,
    config: Arc<GatewayConfig>,
}

impl HttpServer {
    /// Create a new HTTP server dispatching to the given functions.
    pub fn new(config: GatewayConfig, registry: FunctionRegistry) -> Self {
        let state = GatewayState::new(config, registry);
        let config = state.config.clone();
        let router = Self::build_router(state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: GatewayState) -> Router {
        Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until ctrl-c, SIGTERM, or `shutdown` fires (or its sender is dropped).
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            require_auth = self.config.auth.require_auth,
            "HTTP server starting"
        );

        let shutdown = async move {
            tokio::select! {
                _ = shutdown_signal() => {}
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown requested");
                }
            }
        };

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Gateway handler: every request enters here.
async fn gateway_handler(State(state): State<GatewayState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let path = normalize_path(request.uri().path());

    if path == HEALTH_PATH {
        metrics::record_request("health", 200, start_time);
        return response::health();
    }

    if request.method() == Method::OPTIONS {
        metrics::record_request("preflight", 204, start_time);
        return response::preflight();
    }

    let request_id = request_id(&request);

    tracing::debug!(
        request_id = %request_id,
        method = %request.method(),
        path = %path,
        "Dispatching request"
    );

    let (label, result) = match resolve(&state, &request, &path) {
        Ok(name) => {
            let result = call(&state, &name, request).await;
            (name, result)
        }
        Err(err) => (rejection_label(&err).to_string(), Err(err)),
    };

    let response = match result {
        Ok(reply) => response::with_cors(reply),
        Err(err) => {
            match &err {
                GatewayError::Function(e) => {
                    tracing::error!(request_id = %request_id, function = %label, error = %e, "Function failed");
                }
                other => {
                    tracing::warn!(request_id = %request_id, path = %path, error = %other, "Request rejected");
                }
            }
            err.into_response()
        }
    };

    metrics::record_request(&label, response.status().as_u16(), start_time);
    response
}

/// Auth, routing and existence check. Yields the name of a registered function.
fn resolve(state: &GatewayState, request: &Request<Body>, path: &str) -> Result<String, GatewayError> {
    if state.config.auth.require_auth {
        let token = extract_token(request.headers()).ok_or(GatewayError::MissingToken)?;
        if !state.verifier.verify(&token) {
            return Err(GatewayError::InvalidToken);
        }
    }

    let name = route_of_path(path).ok_or(GatewayError::MissingRoute)?;

    if !state.registry.exists(name) {
        return Err(not_found(state, name.to_string()));
    }
    Ok(name.to_string())
}

/// Body limit, load and invocation of a registered function.
async fn call(state: &GatewayState, name: &str, request: Request<Body>) -> Result<Response, GatewayError> {
    let request = limit_body(request, state.config.limits.max_body_size)?;

    let function = state.registry.load(name).map_err(|e| match e {
        RegistryError::NotFound(name) => not_found(state, name),
        RegistryError::Load { source, .. } => GatewayError::Function(source),
    })?;

    let deadline = Duration::from_secs(state.config.timeouts.function_secs);
    let response = invoke(function, request, deadline).await?;
    Ok(response)
}

/// Reject a declared `Content-Length` over `limit`; cap streamed bodies at `limit`.
fn limit_body(request: Request<Body>, limit: usize) -> Result<Request<Body>, GatewayError> {
    let declared = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    if declared.is_some_and(|len| len > limit as u64) {
        return Err(GatewayError::PayloadTooLarge { limit });
    }
    Ok(request.map(|body| Body::new(Limited::new(body, limit))))
}

fn not_found(state: &GatewayState, name: String) -> GatewayError {
    GatewayError::FunctionNotFound {
        name,
        available: state.registry.list_available(),
    }
}

/// Metrics label for a request that never reached a function.
fn rejection_label(err: &GatewayError) -> &'static str {
    match err {
        GatewayError::MissingToken | GatewayError::InvalidToken => "unauthorized",
        GatewayError::MissingRoute => "no_route",
        GatewayError::FunctionNotFound { .. } => "not_found",
        GatewayError::PayloadTooLarge { .. } => "too_large",
        GatewayError::Function(_) => "error",
    }
}
