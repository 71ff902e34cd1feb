//! Crate for interacting with the GitHub REST API.
//!
//! This crate provides a client for the label endpoints of a repository and for
//! listing the issues and milestones of a source repository, authenticated
//! with a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use octocrab::service::middleware::retry::RetryConfig;
use octocrab::{Octocrab, Page};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

pub mod errors;
pub use errors::Error;

pub mod label;
pub use label::{
    truncate_description, Label, LabelUpdate, NewLabel, ELLIPSIS, MAX_DESCRIPTION_LENGTH,
};

pub mod models;
pub use models::{EntitySummary, RepositoryRef};

use models::EntityRecord;

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Base used only to percent-encode API paths; the host is never contacted.
const PATH_ENCODING_BASE: &str = "https://api.github.com/";

/// Number of items requested per page when listing issues and milestones.
const PAGE_SIZE: u8 = 100;

/// A client for interacting with the GitHub API, authenticated with a token.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Octocrab,
}

impl GitHubClient {
    /// Creates a new `GitHubClient` from a configured `Octocrab` instance.
    ///
    /// Use [`create_token_client`] to build an instance with the retry and
    /// timeout behaviour the label operations expect.
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }

    async fn list_entities(
        &self,
        repo: &RepositoryRef,
        collection: &str,
    ) -> Result<Vec<EntityRecord>, Error> {
        let route = format!("/repos/{}/{}/{}", repo.owner, repo.name, collection);
        let params = ListParams {
            state: "open",
            per_page: PAGE_SIZE,
        };

        let first_page: Page<EntityRecord> = self
            .client
            .get(&route, Some(&params))
            .await
            .map_err(|e| map_octocrab_error(&format!("Failed to list {}", collection), e))?;

        let records = self
            .client
            .all_pages(first_page)
            .await
            .map_err(|e| map_octocrab_error(&format!("Failed to page {}", collection), e))?;

        info!(
            repo = %repo,
            collection = collection,
            count = records.len(),
            "Listed source entities"
        );

        Ok(records)
    }
}

/// Query parameters for the paged list endpoints.
#[derive(Debug, Serialize)]
struct ListParams {
    state: &'static str,
    per_page: u8,
}

/// Label operations on a single repository.
///
/// Every operation is a single request: there is no retry and no backoff, a
/// failure is reported to the caller as is.
#[async_trait]
pub trait LabelClient: Send + Sync {
    /// Looks up a label by name.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(label))` - The label exists
    /// * `Ok(None)` - GitHub answered 404
    ///
    /// # Errors
    /// Returns `Error::RemoteError` for any other non-success status.
    async fn fetch_label(&self, repo: &RepositoryRef, name: &str) -> Result<Option<Label>, Error>;

    /// Creates a label.
    ///
    /// # Errors
    /// Returns `Error::RemoteError` ("Unable to create label") unless GitHub
    /// answers 201 Created.
    async fn create_label(&self, repo: &RepositoryRef, label: &NewLabel) -> Result<(), Error>;

    /// Applies a partial update to an existing label.
    ///
    /// # Errors
    /// Returns `Error::RemoteError` ("Unable to modify label") unless GitHub
    /// answers 200 OK.
    async fn update_label(
        &self,
        repo: &RepositoryRef,
        name: &str,
        update: &LabelUpdate,
    ) -> Result<(), Error>;

    /// Deletes a label. A label that is already gone counts as deleted.
    ///
    /// # Errors
    /// Returns `Error::RemoteError` ("Unable to delete label") for any status
    /// other than 204 No Content or 404 Not Found.
    async fn delete_label(&self, repo: &RepositoryRef, name: &str) -> Result<(), Error>;
}

/// Enumeration of the issues and milestones of a source repository.
#[async_trait]
pub trait EntitySource: Send + Sync {
    /// Lists the open issues of a repository, pull requests excluded.
    async fn list_issues(&self, repo: &RepositoryRef) -> Result<Vec<EntitySummary>, Error>;

    /// Lists the open milestones of a repository.
    async fn list_milestones(&self, repo: &RepositoryRef) -> Result<Vec<EntitySummary>, Error>;
}

#[async_trait]
impl LabelClient for GitHubClient {
    #[instrument(skip(self), fields(repo = %repo, label = %name))]
    async fn fetch_label(&self, repo: &RepositoryRef, name: &str) -> Result<Option<Label>, Error> {
        let path = label_path(repo, name)?;
        let response = self
            .client
            ._get(path.as_str())
            .await
            .map_err(|e| map_octocrab_error("Failed to fetch label", e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("Label does not exist");
            return Ok(None);
        }

        let body = self
            .client
            .body_to_string(response)
            .await
            .map_err(|e| map_octocrab_error("Failed to read label response", e))?;

        if !status.is_success() {
            error!(
                url = %path,
                status = status.as_u16(),
                body = %body,
                "Failed to fetch label"
            );
            return Err(Error::RemoteError {
                message: "Unable to fetch label".to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let label: Label = serde_json::from_str(&body)?;
        Ok(Some(label))
    }

    #[instrument(skip(self, label), fields(repo = %repo, label = %label.name))]
    async fn create_label(&self, repo: &RepositoryRef, label: &NewLabel) -> Result<(), Error> {
        let path = labels_path(repo)?;
        let response = self
            .client
            ._post(path.as_str(), Some(label))
            .await
            .map_err(|e| map_octocrab_error("Failed to create label", e))?;

        let status = response.status();
        if status == StatusCode::CREATED {
            info!(color = %label.color, "Created label");
            return Ok(());
        }

        let body = self
            .client
            .body_to_string(response)
            .await
            .unwrap_or_default();
        error!(
            url = %path,
            status = status.as_u16(),
            body = %body,
            "Unable to create label"
        );
        Err(Error::RemoteError {
            message: "Unable to create label".to_string(),
            status: status.as_u16(),
            body,
        })
    }

    #[instrument(skip(self, update), fields(repo = %repo, label = %name))]
    async fn update_label(
        &self,
        repo: &RepositoryRef,
        name: &str,
        update: &LabelUpdate,
    ) -> Result<(), Error> {
        let path = label_path(repo, name)?;
        let response = self
            .client
            ._patch(path.as_str(), Some(update))
            .await
            .map_err(|e| map_octocrab_error("Failed to modify label", e))?;

        let status = response.status();
        if status == StatusCode::OK {
            info!(
                description_changed = update.description.is_some(),
                color_changed = update.color.is_some(),
                "Modified label"
            );
            return Ok(());
        }

        let body = self
            .client
            .body_to_string(response)
            .await
            .unwrap_or_default();
        error!(
            url = %path,
            status = status.as_u16(),
            body = %body,
            "Unable to modify label"
        );
        Err(Error::RemoteError {
            message: "Unable to modify label".to_string(),
            status: status.as_u16(),
            body,
        })
    }

    #[instrument(skip(self), fields(repo = %repo, label = %name))]
    async fn delete_label(&self, repo: &RepositoryRef, name: &str) -> Result<(), Error> {
        let path = label_path(repo, name)?;
        let response = self
            .client
            ._delete(path.as_str(), None::<&()>)
            .await
            .map_err(|e| map_octocrab_error("Failed to delete label", e))?;

        let status = response.status();
        match status {
            StatusCode::NO_CONTENT => {
                info!("Deleted label");
                Ok(())
            }
            StatusCode::NOT_FOUND => {
                debug!("Label was already absent");
                Ok(())
            }
            _ => {
                let body = self
                    .client
                    .body_to_string(response)
                    .await
                    .unwrap_or_default();
                warn!(
                    url = %path,
                    status = status.as_u16(),
                    body = %body,
                    "Unable to delete label"
                );
                Err(Error::RemoteError {
                    message: "Unable to delete label".to_string(),
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

#[async_trait]
impl EntitySource for GitHubClient {
    #[instrument(skip(self), fields(repo = %repo))]
    async fn list_issues(&self, repo: &RepositoryRef) -> Result<Vec<EntitySummary>, Error> {
        let records = self.list_entities(repo, "issues").await?;
        Ok(records
            .into_iter()
            .filter(|r| !r.is_pull_request())
            .map(EntitySummary::from)
            .collect())
    }

    #[instrument(skip(self), fields(repo = %repo))]
    async fn list_milestones(&self, repo: &RepositoryRef) -> Result<Vec<EntitySummary>, Error> {
        let records = self.list_entities(repo, "milestones").await?;
        Ok(records.into_iter().map(EntitySummary::from).collect())
    }
}

/// Creates an `Octocrab` client that authenticates with a bearer token.
///
/// Octocrab's retry layer is switched off so every label operation is a
/// single attempt, and both connect and read are bounded by `timeout`.
///
/// # Arguments
///
/// * `token` - Personal access or installation token.
/// * `base_uri` - API root to use instead of `https://api.github.com`, for
///   GitHub Enterprise installations.
/// * `timeout` - Upper bound for connecting and for reading a response.
///
/// # Errors
///
/// Returns `Error::AuthError` if the base URI cannot be parsed or the client
/// cannot be built.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use github_client::{create_token_client, GitHubClient};
/// use secrecy::SecretString;
///
/// # fn example() -> Result<(), github_client::Error> {
/// let token = SecretString::from("ghp_example".to_string());
/// let octocrab = create_token_client(&token, None, Duration::from_secs(30))?;
/// let client = GitHubClient::new(octocrab);
/// # Ok(())
/// # }
/// ```
#[instrument(skip(token))]
pub fn create_token_client(
    token: &SecretString,
    base_uri: Option<&str>,
    timeout: Duration,
) -> Result<Octocrab, Error> {
    let mut builder = Octocrab::builder()
        .personal_token(token.expose_secret().to_string())
        .add_retry_config(RetryConfig::None)
        .set_connect_timeout(Some(timeout))
        .set_read_timeout(Some(timeout));

    if let Some(uri) = base_uri {
        builder = builder.base_uri(uri).map_err(|e| {
            Error::AuthError(format!("Invalid GitHub API URL '{}': {}", uri, e))
        })?;
    }

    builder.build().map_err(|e| {
        error!(error = ?e, "Failed to build Octocrab client");
        Error::AuthError(format!("Failed to build GitHub client: {}", e))
    })
}

fn labels_path(repo: &RepositoryRef) -> Result<String, Error> {
    encoded_path(repo, &["repos", &repo.owner, &repo.name, "labels"])
}

fn label_path(repo: &RepositoryRef, name: &str) -> Result<String, Error> {
    encoded_path(repo, &["repos", &repo.owner, &repo.name, "labels", name])
}

/// Joins path segments, percent-encoding each one.
fn encoded_path(repo: &RepositoryRef, segments: &[&str]) -> Result<String, Error> {
    let mut url =
        Url::parse(PATH_ENCODING_BASE).map_err(|_| Error::InvalidRepository(repo.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| Error::InvalidRepository(repo.to_string()))?
        .clear()
        .extend(segments);
    Ok(url.path().to_string())
}

/// Logs an octocrab failure and converts it into a crate error.
///
/// Errors that carry a GitHub response keep its status and message; all
/// others are transport failures.
fn map_octocrab_error(message: &str, e: octocrab::Error) -> Error {
    match e {
        octocrab::Error::GitHub { source, backtrace } => {
            error!(
                error_message = source.message,
                status = source.status_code.as_u16(),
                backtrace = backtrace.to_string(),
                "{}. Received an error from GitHub",
                message
            );
            Error::RemoteError {
                message: message.to_string(),
                status: source.status_code.as_u16(),
                body: source.message,
            }
        }
        octocrab::Error::UriParse { source, backtrace } => {
            error!(
                error_message = source.to_string(),
                backtrace = backtrace.to_string(),
                "{}. Failed to parse URI.",
                message
            );
            Error::Transport(format!("{}: {}", message, source))
        }
        octocrab::Error::Uri { source, backtrace } => {
            error!(
                error_message = source.to_string(),
                backtrace = backtrace.to_string(),
                "{}, Failed to parse URI.",
                message
            );
            Error::Transport(format!("{}: {}", message, source))
        }
        other => {
            error!(error_message = other.to_string(), "{}", message);
            Error::Transport(format!("{}: {}", message, other))
        }
    }
}
