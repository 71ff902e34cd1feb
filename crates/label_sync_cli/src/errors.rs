use label_sync_core::{ConfigurationError, SyncError};
use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur in the Label Sync CLI application.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error occurred while loading or validating configuration.
    ///
    /// Returned before any GitHub request is made.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigurationError),

    /// The GitHub client could not be constructed.
    #[error("GitHub client error: {0}")]
    Client(#[from] github_client::Error),

    /// Reading entities or writing labels failed part way through.
    ///
    /// Labels written before the failure stay in place.
    #[error("Sync failed: {0}")]
    Sync(#[from] SyncError),
}

impl Error {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        1
    }
}
