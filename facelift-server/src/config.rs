//! Proxy configuration
//!
//! All settings are read from the environment once at startup, validated,
//! and passed into the router state. Nothing reads the environment
//! mid-request.

use std::time::Duration;

/// Version identifier of the restoration model. Fixed for the life of the
/// process; never user-supplied.
pub const DEFAULT_MODEL_VERSION: &str =
    "e70c94fdc3f6c4f7c377c6986a5eacba1db6e28b06ebdfb4d1e0520c1e0f1527";

const DEFAULT_API_URL: &str = "https://api.replicate.com";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);
const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(300);

/// Proxy configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer credential for the prediction API
    pub api_token: String,

    /// Model version submitted with every prediction
    pub model_version: String,

    /// Base URL of the prediction API
    pub api_base_url: String,

    /// Address the proxy listens on
    pub bind_addr: String,

    /// Fixed delay between consecutive status reads
    pub poll_interval: Duration,

    /// Maximum total time to poll one prediction before giving up
    pub poll_timeout: Duration,
}

impl Config {
    /// Creates a configuration with defaults for everything but the token
    pub fn new(api_token: String) -> Self {
        Self {
            api_token,
            model_version: DEFAULT_MODEL_VERSION.to_string(),
            api_base_url: DEFAULT_API_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - REPLICATE_API_TOKEN (required)
    /// - MODEL_VERSION (optional, default: the baked-in model version)
    /// - REPLICATE_API_URL (optional, default: https://api.replicate.com)
    /// - BIND_ADDR (optional, default: 0.0.0.0:3000)
    /// - POLL_INTERVAL_MS (optional, default: 1500)
    /// - POLL_TIMEOUT_SECS (optional, default: 300)
    pub fn from_env() -> anyhow::Result<Self> {
        let api_token = std::env::var("REPLICATE_API_TOKEN")
            .map_err(|_| anyhow::anyhow!("REPLICATE_API_TOKEN environment variable not set"))?;

        let model_version =
            std::env::var("MODEL_VERSION").unwrap_or_else(|_| DEFAULT_MODEL_VERSION.to_string());

        let api_base_url =
            std::env::var("REPLICATE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let poll_interval = std::env::var("POLL_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        let poll_timeout = std::env::var("POLL_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_TIMEOUT);

        Ok(Self {
            api_token,
            model_version,
            api_base_url,
            bind_addr,
            poll_interval,
            poll_timeout,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_token.is_empty() {
            anyhow::bail!("api_token cannot be empty");
        }

        if self.model_version.is_empty() {
            anyhow::bail!("model_version cannot be empty");
        }

        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            anyhow::bail!("api_base_url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.poll_timeout < self.poll_interval {
            anyhow::bail!("poll_timeout must be at least the poll_interval");
        }

        Ok(())
    }
}
