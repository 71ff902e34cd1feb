use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use label_sync_cli::commands::sync_cmd::{self, SyncArgs};

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

/// Environment variable holding the log filter
const LOG_ENV: &str = "LABEL_SYNC_LOG";

/// Label Sync: mirror the open issues and milestones of a repository as labels
/// on every configured target repository
///
/// Configuration is read from `config.toml`, or from the file named by
/// `LABEL_SYNC_CONFIG`.
#[derive(Parser)]
#[command(name = "label-sync")]
#[command(version, long_about = None)]
struct Cli {
    #[command(flatten)]
    sync: SyncArgs,
}

#[tokio::main]
async fn main() {
    // Progress goes to stderr
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    match sync_cmd::execute(&cli.sync).await {
        Ok(summary) => {
            info!(
                "Synced {} entities to {} repositories ({} created, {} updated, {} unchanged)",
                summary.entities,
                summary.targets,
                summary.created,
                summary.updated,
                summary.unchanged
            );
        }
        Err(e) => {
            error!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
