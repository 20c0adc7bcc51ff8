//! Prediction domain types

use serde::{Deserialize, Serialize};

/// Lifecycle state reported by the prediction API
///
/// Only `succeeded`, `failed` and `canceled` are terminal; everything else
/// (including statuses this proxy does not know about yet) means the
/// prediction is still in flight and should be polled again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    /// Any status value not listed above. Treated as still in flight.
    #[serde(other)]
    Unknown,
}

impl PredictionStatus {
    /// Returns true once no further status transitions can occur
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }

    /// Returns true for a terminal state without usable output
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Failed | Self::Canceled)
    }
}

/// Links returned by the prediction API on creation
///
/// `get` is the polling handle: the only URL the proxy reads status from.
/// A creation response without it is treated as a failed submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionUrls {
    pub get: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel: Option<String>,
}
