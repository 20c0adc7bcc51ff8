//! Restoration API Handler
//!
//! The single proxy endpoint: validate the inbound image, submit it
//! upstream, poll to completion, relay the output.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};

/// Marker every inbound image must carry: a data-URI MIME prefix
const IMAGE_DATA_PREFIX: &str = "data:image/";

#[derive(Debug, Deserialize)]
pub struct RestoreRequest {
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RestoreResponse {
    pub result: serde_json::Value,
}

/// POST /restore
/// Submit an image for restoration and wait for the result
pub async fn restore(
    State(state): State<AppState>,
    payload: Result<Json<RestoreRequest>, JsonRejection>,
) -> ApiResult<Json<RestoreResponse>> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError::BadRequest(format!("invalid request body: {}", rejection.body_text()))
    })?;

    let image = validate_image(request.image.as_deref())?;

    let created = state
        .client
        .create_prediction(&state.model_version, image)
        .await?;
    tracing::info!(id = %created.id, "prediction submitted");

    let output = state.client.wait_for_completion(&created.urls.get).await?;
    tracing::info!(id = %created.id, "prediction completed");

    Ok(Json(RestoreResponse { result: output }))
}

/// Rejects payloads the upstream API would charge for and slowly refuse.
/// Runs before any outbound call.
fn validate_image(image: Option<&str>) -> Result<&str, ApiError> {
    match image {
        None => Err(ApiError::BadRequest("missing image field".to_string())),
        Some("") => Err(ApiError::BadRequest("image must not be empty".to_string())),
        Some(image) if !image.starts_with(IMAGE_DATA_PREFIX) => Err(ApiError::BadRequest(
            format!("image must be a {IMAGE_DATA_PREFIX}* data URI"),
        )),
        Some(image) => Ok(image),
    }
}
