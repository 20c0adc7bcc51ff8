use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use facelift_client::{PollConfig, PredictionClient};
use facelift_server::api::{self, AppState};
use facelift_server::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "facelift_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Facelift proxy...");

    // A missing credential is fatal here, before any request is served.
    let config = Config::from_env()?;
    config.validate()?;

    info!(
        "Loaded configuration: api={}, model_version={}",
        config.api_base_url, config.model_version
    );

    let client = PredictionClient::new(config.api_base_url.as_str(), config.api_token.as_str())
        .with_poll_config(PollConfig {
            interval: config.poll_interval,
            timeout: config.poll_timeout,
        });

    let app = api::create_router(AppState {
        client,
        model_version: config.model_version.clone(),
    });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .context("server error")?;

    Ok(())
}
