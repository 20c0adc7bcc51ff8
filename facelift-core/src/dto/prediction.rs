//! Prediction DTOs for the upstream API

use serde::{Deserialize, Serialize};

use crate::domain::prediction::{PredictionStatus, PredictionUrls};

/// Restoration mode requested from the model. The observed behavior always
/// submits the highest-quality mode.
pub const DEFAULT_MODE: &str = "best";

/// Model input submitted alongside the prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionInput {
    pub image: String,
    pub mode: String,
}

impl PredictionInput {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            mode: DEFAULT_MODE.to_string(),
        }
    }
}

/// Request to create a new prediction
///
/// Built once per inbound request and discarded after submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePrediction {
    pub version: String,
    pub input: PredictionInput,
}

/// Successful creation response
///
/// `urls.get` is required: a creation response without a polling handle
/// fails deserialization into this shape and is surfaced as a rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedPrediction {
    pub id: String,
    pub status: PredictionStatus,
    pub urls: PredictionUrls,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Error body returned by the upstream API
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamRejection {
    pub detail: String,
}

/// Closed set of creation response shapes
///
/// Parsed with untagged dispatch: a body is either a created prediction
/// (with a polling handle) or an explicit rejection. Anything else is a
/// malformed response.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CreateResponse {
    Created(CreatedPrediction),
    Rejected(UpstreamRejection),
}

/// Status record returned by a poll of the `urls.get` handle
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionUpdate {
    pub id: String,
    pub status: PredictionStatus,
    #[serde(default)]
    pub output: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}
