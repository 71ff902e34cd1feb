//! Error types for label synchronisation.
//!
//! [`SyncError`] covers everything that can stop a webhook delivery or a bulk
//! run; [`ConfigurationError`] covers startup failures and is always fatal.

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Configuration loading and validation errors.
///
/// These occur before any request is served or any label is touched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to access configuration file: {path} - {reason}")]
    FileAccessError { path: String, reason: String },

    #[error("Failed to parse configuration: {reason}")]
    ParseError { reason: String },

    #[error("Required configuration missing: {key}")]
    RequiredConfigMissing { key: String },

    #[error("Invalid configuration: {field} - {reason}")]
    InvalidConfiguration { field: String, reason: String },
}

/// Errors raised while relaying entity changes into labels.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The request body does not match the presented signature, or no
    /// signature was presented. Nothing has been changed.
    #[error("Request signature is invalid")]
    InvalidSignature,

    /// The event kind is not one this service maps to an entity, or the
    /// entity kind has no label configuration.
    #[error("Unroutable event '{event}'")]
    UnroutableEvent { event: String },

    /// The body could not be read as an event of the announced kind.
    #[error("Invalid event payload: {0}")]
    InvalidPayload(String),

    /// The label store or the source repository refused a request.
    #[error(transparent)]
    Remote(#[from] github_client::Error),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Result alias for synchronisation operations.
pub type SyncResult<T> = Result<T, SyncError>;
