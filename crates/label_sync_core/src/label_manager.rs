//! Label reconciliation for a single repository.
//!
//! This module provides the [`LabelManager`] component, which brings one
//! label on one repository into the desired state with the fewest possible
//! writes.

use std::fmt;
use std::sync::Arc;

use github_client::{LabelClient, LabelUpdate, NewLabel, RepositoryRef};
use tracing::{debug, info, instrument};

use crate::{label_key, truncate_description, SyncResult};

#[cfg(test)]
#[path = "label_manager_tests.rs"]
mod tests;

/// What a reconcile call did to the remote label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelChange {
    /// The label did not exist and was created
    Created,
    /// The label existed with a different description or colour
    Updated,
    /// The label already matched; nothing was written
    Unchanged,
    /// The label was deleted, or was already absent
    Deleted,
}

impl fmt::Display for LabelChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LabelChange::Created => "created",
            LabelChange::Updated => "updated",
            LabelChange::Unchanged => "unchanged",
            LabelChange::Deleted => "deleted",
        };
        f.write_str(text)
    }
}

/// A label operation for one entity, independent of the target repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelOperation {
    /// Make sure the label exists with this colour and description
    Upsert {
        prefix: String,
        number: u64,
        color: String,
        description: String,
    },
    /// Make sure the label does not exist
    Delete { prefix: String, number: u64 },
}

impl LabelOperation {
    /// Name of the label this operation acts on.
    pub fn label_key(&self) -> String {
        match self {
            LabelOperation::Upsert { prefix, number, .. }
            | LabelOperation::Delete { prefix, number } => label_key(prefix, *number),
        }
    }
}

/// Reconciles entity labels on target repositories.
///
/// The manager reads the current label before writing, so repeated calls with
/// the same input make exactly one read and no writes once the label matches.
/// Redelivered webhooks therefore never create duplicate labels.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use github_client::{GitHubClient, RepositoryRef};
/// use label_sync_core::{LabelChange, LabelManager};
///
/// # async fn example(client: GitHubClient) -> Result<(), Box<dyn std::error::Error>> {
/// let manager = LabelManager::new(Arc::new(client));
/// let repo: RepositoryRef = "example-org/frontend".parse()?;
///
/// let change = manager.upsert(&repo, "issue", 42, "b4f291", "Fix bug").await?;
/// assert!(matches!(change, LabelChange::Created | LabelChange::Updated | LabelChange::Unchanged));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LabelManager {
    /// GitHub client for label API operations
    client: Arc<dyn LabelClient>,
}

impl LabelManager {
    /// Creates a new LabelManager.
    pub fn new(client: Arc<dyn LabelClient>) -> Self {
        Self { client }
    }

    /// Creates or updates the label for an entity so it carries `color` and
    /// `description`.
    ///
    /// # Behavior
    ///
    /// 1. Fetches the label named `prefix:number`
    /// 2. Missing: creates it
    /// 3. Present: compares the stored description with the *truncated*
    ///    desired description, and colours without regard to case; sends
    ///    only the fields that differ
    /// 4. Matching: no write at all
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Remote` if any of the GitHub calls fails. No retry
    /// is attempted.
    #[instrument(skip(self, description), fields(repo = %repo))]
    pub async fn upsert(
        &self,
        repo: &RepositoryRef,
        prefix: &str,
        number: u64,
        color: &str,
        description: &str,
    ) -> SyncResult<LabelChange> {
        let name = label_key(prefix, number);
        let desired_description = truncate_description(description);

        let existing = match self.client.fetch_label(repo, &name).await? {
            Some(label) => label,
            None => {
                let label = NewLabel::new(name.as_str(), color, description);
                self.client.create_label(repo, &label).await?;
                info!(label = %name, "Label created");
                return Ok(LabelChange::Created);
            }
        };

        let mut update = LabelUpdate::default();
        if existing.description.as_deref().unwrap_or_default() != desired_description {
            update = update.with_description(description);
        }
        if !existing.color.eq_ignore_ascii_case(color) {
            update = update.with_color(color);
        }

        if update.is_empty() {
            debug!(label = %name, "Label already up to date");
            return Ok(LabelChange::Unchanged);
        }

        self.client.update_label(repo, &name, &update).await?;
        info!(label = %name, "Label updated");
        Ok(LabelChange::Updated)
    }

    /// Deletes the label for an entity without checking whether it exists.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Remote` if GitHub refuses the deletion. A label
    /// that is already absent is not an error.
    #[instrument(skip(self), fields(repo = %repo))]
    pub async fn delete(
        &self,
        repo: &RepositoryRef,
        prefix: &str,
        number: u64,
    ) -> SyncResult<LabelChange> {
        let name = label_key(prefix, number);
        self.client.delete_label(repo, &name).await?;
        info!(label = %name, "Label deleted");
        Ok(LabelChange::Deleted)
    }

    /// Applies a [`LabelOperation`] to one repository.
    pub async fn apply(
        &self,
        repo: &RepositoryRef,
        operation: &LabelOperation,
    ) -> SyncResult<LabelChange> {
        match operation {
            LabelOperation::Upsert {
                prefix,
                number,
                color,
                description,
            } => {
                self.upsert(repo, prefix, *number, color, description)
                    .await
            }
            LabelOperation::Delete { prefix, number } => self.delete(repo, prefix, *number).await,
        }
    }
}
