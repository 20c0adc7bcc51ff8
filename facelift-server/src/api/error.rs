//! API Error Handling
//!
//! Unified error types and conversion for API responses. Every error leaves
//! the proxy as `{ "error": <message> }` plus a status code; internal detail
//! stays in the logs.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use facelift_client::ClientError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    MethodNotAllowed,
    Throttled(String),
    Upstream(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed".to_string(),
            ),
            ApiError::Throttled(msg) => {
                tracing::warn!("upstream throttling: {}", msg);
                (StatusCode::TOO_MANY_REQUESTS, msg)
            }
            ApiError::Upstream(msg) => {
                tracing::error!("upstream failure: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Throttled(msg) => ApiError::Throttled(msg),
            ClientError::Transport(e) => {
                tracing::error!("transport error calling the prediction API: {}", e);
                ApiError::Internal("failed to call the prediction API".to_string())
            }
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

/// Fallback for unsupported methods on an existing route
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub type ApiResult<T> = Result<T, ApiError>;
