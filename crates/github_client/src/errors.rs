//! Error types for GitHub client operations.
//!
//! This module defines the error types that can occur when talking to the GitHub
//! label and issue APIs through the github_client crate.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during GitHub client operations.
///
/// ## Examples
///
/// ```rust,ignore
/// use github_client::Error;
///
/// match client.create_label(&repo, &label).await {
///     Ok(()) => println!("Label created"),
///     Err(Error::RemoteError { status, .. }) => eprintln!("GitHub said {}", status),
///     Err(err) => eprintln!("Other error: {}", err),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Building the GitHub client failed.
    ///
    /// The contained string provides specific details about the failure, for
    /// instance an unparseable API base URI.
    #[error("Failed to authenticate or initialize GitHub client: {0}")]
    AuthError(String),

    /// Error deserializing the response from GitHub.
    #[error("Failed to deserialize GitHub response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// A repository identifier was not of the form `owner/name`.
    #[error("Invalid repository identifier '{0}', expected 'owner/name'")]
    InvalidRepository(String),

    /// GitHub answered with a status code the operation does not accept.
    ///
    /// Carries the HTTP status and the raw response body so callers can log
    /// the reason the label store gave.
    #[error("{message}: GitHub returned {status}: {body}")]
    RemoteError {
        message: String,
        status: u16,
        body: String,
    },

    /// The request never produced an HTTP response (connection failure,
    /// timeout, malformed URI).
    #[error("GitHub request failed: {0}")]
    Transport(String),
}

impl Error {
    /// Returns the HTTP status code if GitHub produced a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::RemoteError { status, .. } => Some(*status),
            _ => None,
        }
    }
}
