//! Label Sync webhook server
//!
//! Main binary for running the webhook receiver.
//!
//! # Environment Variables
//!
//! - `API_PORT`: Port to listen on (default: 8080)
//! - `API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `RUST_LOG`: Log level (default: info)
//! - `LABEL_SYNC_CONFIG`: Path of the configuration file (default: config.toml)

use std::env;
use std::sync::Arc;

use anyhow::Context;
use github_client::{create_token_client, GitHubClient};
use label_sync_api::{ApiConfig, ApiServer, AppState};
use label_sync_core::{SyncConfig, WebhookProcessor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let api_config = ApiConfig::from_env()?;

    // Configuration problems are fatal before any request is served
    let config_path = SyncConfig::default_path();
    let config = SyncConfig::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;

    let octocrab = create_token_client(
        &config.github_token,
        config.github_api_url.as_deref(),
        config.request_timeout,
    )
    .context("Failed to create GitHub client")?;
    let client = Arc::new(GitHubClient::new(octocrab));

    let processor = WebhookProcessor::new(&config, client)?;

    tracing::info!("Starting label sync webhook server");
    tracing::info!(
        targets = config.target_repos.len(),
        kinds = config.entity_label_config.len(),
        "Configuration loaded"
    );

    // Start server with graceful shutdown
    ApiServer::new(api_config, AppState::new(processor))
        .serve()
        .await
}
