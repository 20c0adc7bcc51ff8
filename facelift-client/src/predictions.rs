//! Prediction lifecycle operations
//!
//! Submission and the sequential poll loop. Submission happens exactly once
//! per inbound request and strictly precedes the first poll; polls against
//! one handle never overlap.

use crate::PredictionClient;
use crate::error::{ClientError, Result};
use facelift_core::domain::prediction::PredictionStatus;
use facelift_core::dto::prediction::{
    CreatePrediction, CreateResponse, CreatedPrediction, PredictionInput, PredictionUpdate,
    UpstreamRejection,
};
use reqwest::{StatusCode, header};
use tokio::time::{Instant, sleep};
use tracing::debug;

impl PredictionClient {
    // =============================================================================
    // Submission
    // =============================================================================

    /// Submit an image to the prediction API
    ///
    /// # Arguments
    /// * `version` - The fixed model version identifier
    /// * `image` - The validated, data-URI encoded image
    ///
    /// # Returns
    /// The created prediction, including the polling handle. A creation
    /// response without a polling handle is never treated as success.
    pub async fn create_prediction(
        &self,
        version: &str,
        image: &str,
    ) -> Result<CreatedPrediction> {
        let url = format!("{}/v1/predictions", self.base_url());
        let request = CreatePrediction {
            version: version.to_string(),
            input: PredictionInput::new(image),
        };

        let response = self
            .http()
            .post(&url)
            .header(header::AUTHORIZATION, self.auth_header())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::Throttled(rejection_detail(&body)));
        }

        if !status.is_success() {
            let detail = rejection_detail(&body);
            if mentions_throttling(&detail) {
                return Err(ClientError::Throttled(detail));
            }
            return Err(ClientError::rejected(status.as_u16(), detail));
        }

        match serde_json::from_str::<CreateResponse>(&body) {
            Ok(CreateResponse::Created(prediction)) => {
                debug!(id = %prediction.id, "prediction created");
                Ok(prediction)
            }
            Ok(CreateResponse::Rejected(rejection)) => {
                if mentions_throttling(&rejection.detail) {
                    Err(ClientError::Throttled(rejection.detail))
                } else {
                    Err(ClientError::rejected(status.as_u16(), rejection.detail))
                }
            }
            Err(_) => Err(ClientError::MalformedResponse(
                "creation response carried no polling URL".to_string(),
            )),
        }
    }

    // =============================================================================
    // Polling
    // =============================================================================

    /// Read the current status of a prediction
    ///
    /// # Arguments
    /// * `poll_url` - The polling handle returned on creation
    pub async fn get_status(&self, poll_url: &str) -> Result<PredictionUpdate> {
        let response = self
            .http()
            .get(poll_url)
            .header(header::AUTHORIZATION, self.auth_header())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::Throttled(rejection_detail(&body)));
        }

        if !status.is_success() {
            return Err(ClientError::rejected(status.as_u16(), rejection_detail(&body)));
        }

        serde_json::from_str::<PredictionUpdate>(&body).map_err(|e| {
            ClientError::MalformedResponse(format!("could not parse status record: {e}"))
        })
    }

    /// Poll a prediction until it reaches a terminal state
    ///
    /// Status reads are issued sequentially at the configured fixed interval
    /// until the prediction succeeds, fails, or the configured deadline
    /// elapses. Terminal states are final: the loop returns on the first one
    /// observed.
    ///
    /// # Arguments
    /// * `poll_url` - The polling handle returned on creation
    ///
    /// # Returns
    /// The prediction output, passed through verbatim.
    pub async fn wait_for_completion(&self, poll_url: &str) -> Result<serde_json::Value> {
        let poll = self.poll_config();
        let deadline = Instant::now() + poll.timeout;

        loop {
            let update = self.get_status(poll_url).await?;
            debug!(id = %update.id, status = ?update.status, "polled prediction");

            match update.status {
                PredictionStatus::Succeeded => {
                    return update.output.ok_or_else(|| {
                        ClientError::MalformedResponse(
                            "succeeded prediction carried no output".to_string(),
                        )
                    });
                }
                status if status.is_failure() => {
                    let message = update.error.unwrap_or_else(|| {
                        "prediction reached a failed state without an error message".to_string()
                    });
                    return Err(ClientError::PredictionFailed(message));
                }
                // starting / processing / anything unrecognized: still in flight
                _ => {
                    if Instant::now() >= deadline {
                        return Err(ClientError::PollTimeout(poll.timeout));
                    }
                    sleep(poll.interval).await;
                }
            }
        }
    }
}

/// Extract the `detail` message from an upstream error body, falling back
/// to the (truncated) raw body when it matches no known shape
fn rejection_detail(body: &str) -> String {
    match serde_json::from_str::<UpstreamRejection>(body) {
        Ok(rejection) => rejection.detail,
        Err(_) if body.trim().is_empty() => "upstream returned an empty error body".to_string(),
        Err(_) => body.trim().chars().take(200).collect(),
    }
}

/// Heuristic for rate-limit messages that arrive without an HTTP 429
fn mentions_throttling(detail: &str) -> bool {
    let lower = detail.to_lowercase();
    lower.contains("rate limit") || lower.contains("throttl") || lower.contains("too many requests")
}
