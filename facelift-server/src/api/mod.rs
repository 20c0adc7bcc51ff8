//! API Module
//!
//! HTTP API layer for the proxy. Cross-origin headers, body limits and
//! request tracing are fixed decorations applied by layers on the router,
//! not per-handler state.

pub mod error;
pub mod health;
pub mod restore;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, StatusCode, header::CONTENT_TYPE},
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use facelift_client::PredictionClient;

/// Inbound bodies are capped at 10 MiB; data-URI images are large
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Shared, immutable per-process state
///
/// Requests share nothing mutable: the client is cloned per request and the
/// model version is fixed for the life of the process.
#[derive(Clone)]
pub struct AppState {
    pub client: PredictionClient,
    pub model_version: String,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    // Open to any origin by design.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // The proxy endpoint; unsupported methods get a JSON 405
        .route(
            "/restore",
            post(restore::restore)
                .options(options_ok)
                .fallback(error::method_not_allowed),
        )
        // Add state and middleware
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Answers non-preflight OPTIONS probes with an empty success; real
/// preflights are short-circuited by the CORS layer before reaching here
async fn options_ok() -> StatusCode {
    StatusCode::OK
}
