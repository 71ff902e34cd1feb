use std::path::Path;
use std::sync::Arc;

use clap::Args;
use github_client::{create_token_client, GitHubClient, RepositoryRef};
use label_sync_core::{BulkSync, BulkSyncSummary, SyncConfig};
use tracing::{debug, instrument};

use crate::errors::Error;

#[cfg(test)]
#[path = "sync_cmd_tests.rs"]
mod tests;

/// Arguments for a bulk sync run
#[derive(Args, Debug, Clone)]
pub struct SyncArgs {
    /// Source repository whose open issues and milestones are mirrored, as
    /// `owner/name`
    #[arg(value_name = "SOURCE_REPO")]
    pub source: RepositoryRef,
}

/// Execute a bulk sync with the configuration found at the default location.
pub async fn execute(args: &SyncArgs) -> Result<BulkSyncSummary, Error> {
    run_with_config_file(&SyncConfig::default_path(), &args.source).await
}

/// Load the configuration at `path` and mirror `source` onto every target.
///
/// # Errors
///
/// Fails before touching GitHub when the configuration is invalid, and with
/// the first GitHub error otherwise.
#[instrument(skip(path, source), fields(source = %source))]
pub async fn run_with_config_file(
    path: &Path,
    source: &RepositoryRef,
) -> Result<BulkSyncSummary, Error> {
    let config = SyncConfig::load(path)?;
    debug!(
        targets = config.target_repos.len(),
        "Loaded configuration from {:?}", path
    );

    let octocrab = create_token_client(
        &config.github_token,
        config.github_api_url.as_deref(),
        config.request_timeout,
    )?;
    let client = Arc::new(GitHubClient::new(octocrab));

    let bulk = BulkSync::new(&config, client.clone(), client);
    Ok(bulk.run(source).await?)
}
