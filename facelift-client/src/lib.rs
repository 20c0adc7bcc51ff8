//! Prediction API HTTP Client
//!
//! A type-safe client for the asynchronous prediction API that hosts the
//! restoration model.
//!
//! The upstream API is job-based: creating a prediction returns a polling
//! handle, and the result only becomes available once a later status read
//! reports a terminal state. This crate owns both halves — submission and
//! the sequential poll loop — and collapses every upstream failure into
//! [`ClientError`] before it leaves the crate.
//!
//! # Example
//!
//! ```no_run
//! use facelift_client::PredictionClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PredictionClient::new("https://api.replicate.com", "r8_secret");
//!
//!     let created = client
//!         .create_prediction("model-version-id", "data:image/png;base64,...")
//!         .await?;
//!     let output = client.wait_for_completion(&created.urls.get).await?;
//!
//!     println!("restored: {output}");
//!     Ok(())
//! }
//! ```

pub mod error;
mod predictions;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use facelift_core::domain::prediction::{PredictionStatus, PredictionUrls};
pub use facelift_core::dto::prediction::{CreatedPrediction, PredictionUpdate};

use reqwest::Client;
use std::time::Duration;

/// Polling behavior for [`PredictionClient::wait_for_completion`]
///
/// The interval is fixed (no exponential backoff): the upstream API is
/// doing the heavy lifting and a steady cadence keeps latency predictable.
/// The timeout bounds total elapsed polling time so a stuck prediction
/// cannot hold a request open forever.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Fixed delay between consecutive status reads
    pub interval: Duration,
    /// Maximum total time to keep polling before giving up
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1500),
            timeout: Duration::from_secs(300),
        }
    }
}

/// HTTP client for the asynchronous prediction API
///
/// Authenticated with a bearer token supplied at construction; the token
/// is never read from the environment mid-request.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    /// Base URL of the prediction API (e.g., "https://api.replicate.com")
    base_url: String,
    /// Bearer credential sent on every request
    token: String,
    /// Poll loop behavior
    poll: PollConfig,
    /// HTTP client instance
    client: Client,
}

impl PredictionClient {
    /// Create a new prediction API client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the prediction API
    /// * `token` - The API bearer credential
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            poll: PollConfig::default(),
            client: Client::new(),
        }
    }

    /// Create a client with a custom HTTP client
    ///
    /// This allows configuring timeouts, proxies, TLS settings, etc.
    pub fn with_client(
        base_url: impl Into<String>,
        token: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            poll: PollConfig::default(),
            client,
        }
    }

    /// Override the default polling interval and deadline
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Get the base URL of the prediction API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn poll_config(&self) -> PollConfig {
        self.poll
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    /// The `Authorization` header value for upstream requests
    pub(crate) fn auth_header(&self) -> String {
        format!("Token {}", self.token)
    }
}
