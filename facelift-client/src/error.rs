//! Error types for the prediction API client

use std::time::Duration;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the prediction API
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API rejected the request with an error status
    #[error("prediction API error (status {status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// The API is rate limiting requests
    #[error("prediction API is rate limiting requests: {0}")]
    Throttled(String),

    /// A response body did not match any expected shape
    #[error("unexpected prediction API response: {0}")]
    MalformedResponse(String),

    /// The prediction reached a terminal failed state
    #[error("prediction failed: {0}")]
    PredictionFailed(String),

    /// The prediction did not reach a terminal state before the deadline
    #[error("prediction did not finish within {0:?}")]
    PollTimeout(Duration),
}

impl ClientError {
    /// Create a rejection error from status code and message
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is an upstream rate-limit signal
    pub fn is_throttled(&self) -> bool {
        matches!(self, Self::Throttled(_))
    }

    /// Check if this error is a poll deadline expiry
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::PollTimeout(_))
    }
}
