//! Applying one label operation to every target repository.

use futures::stream::{self, StreamExt};
use github_client::RepositoryRef;
use tracing::{info, instrument, warn};

use crate::{LabelChange, LabelManager, LabelOperation, SyncConfig, SyncResult};

#[cfg(test)]
#[path = "fan_out_tests.rs"]
mod tests;

/// A target repository whose label operation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFailure {
    /// Repository the operation was attempted on
    pub repo: RepositoryRef,

    /// Error reported for that repository
    pub error: String,
}

/// Result of applying a label operation to all target repositories.
///
/// Contains counters for the different outcomes and the failed targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanOutResult {
    /// Number of labels created
    pub created: usize,

    /// Number of labels updated
    pub updated: usize,

    /// Number of labels that already had the desired state
    pub unchanged: usize,

    /// Number of labels deleted
    pub deleted: usize,

    /// Targets whose operation failed, in target order
    pub failed_targets: Vec<TargetFailure>,
}

impl FanOutResult {
    /// Creates a new empty result.
    pub fn new() -> Self {
        Self {
            created: 0,
            updated: 0,
            unchanged: 0,
            deleted: 0,
            failed_targets: Vec::new(),
        }
    }

    /// Adds the outcome for one target.
    pub fn record(&mut self, repo: &RepositoryRef, outcome: SyncResult<LabelChange>) {
        match outcome {
            Ok(LabelChange::Created) => self.created += 1,
            Ok(LabelChange::Updated) => self.updated += 1,
            Ok(LabelChange::Unchanged) => self.unchanged += 1,
            Ok(LabelChange::Deleted) => self.deleted += 1,
            Err(e) => self.failed_targets.push(TargetFailure {
                repo: repo.clone(),
                error: e.to_string(),
            }),
        }
    }

    /// Number of targets that failed.
    pub fn failed(&self) -> usize {
        self.failed_targets.len()
    }

    /// Number of targets an attempt was made on.
    pub fn attempted(&self) -> usize {
        self.created + self.updated + self.unchanged + self.deleted + self.failed()
    }

    /// Returns true if every target succeeded.
    pub fn is_success(&self) -> bool {
        self.failed_targets.is_empty()
    }

    /// Returns true if any label was written.
    pub fn has_changes(&self) -> bool {
        self.created > 0 || self.updated > 0 || self.deleted > 0
    }
}

impl Default for FanOutResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs a [`LabelOperation`] against every configured target repository.
///
/// Targets are independent: a failure on one never stops the others. Up to
/// `max_concurrency` targets are processed at the same time and results are
/// reported in target order.
#[derive(Clone)]
pub struct FanOutDriver {
    manager: LabelManager,
    targets: Vec<RepositoryRef>,
    max_concurrency: usize,
}

impl FanOutDriver {
    /// Creates a driver for the configured target repositories.
    pub fn new(config: &SyncConfig, manager: LabelManager) -> Self {
        Self::with_targets(
            manager,
            config.target_repos.clone(),
            config.max_concurrency,
        )
    }

    /// Creates a driver for an explicit list of targets.
    pub fn with_targets(
        manager: LabelManager,
        targets: Vec<RepositoryRef>,
        max_concurrency: usize,
    ) -> Self {
        Self {
            manager,
            targets,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// The target repositories, in the order they are processed.
    pub fn targets(&self) -> &[RepositoryRef] {
        &self.targets
    }

    /// Applies `operation` to every target and collects the outcomes.
    #[instrument(skip(self, operation), fields(label = %operation.label_key(), targets = self.targets.len()))]
    pub async fn apply(&self, operation: &LabelOperation) -> FanOutResult {
        // Each future owns its inputs so the whole fan-out stays `Send`
        let outcomes: Vec<(RepositoryRef, SyncResult<LabelChange>)> =
            stream::iter(self.targets.iter().cloned())
                .map(|repo| {
                    let manager = self.manager.clone();
                    let operation = operation.clone();
                    async move {
                        let outcome = manager.apply(&repo, &operation).await;
                        (repo, outcome)
                    }
                })
                .buffered(self.max_concurrency)
                .collect()
                .await;

        let mut result = FanOutResult::new();
        for (repo, outcome) in outcomes {
            if let Err(e) = &outcome {
                warn!(repo = %repo, error = %e, "Label operation failed for target");
            }
            result.record(&repo, outcome);
        }

        info!(
            created = result.created,
            updated = result.updated,
            unchanged = result.unchanged,
            deleted = result.deleted,
            failed = result.failed(),
            "Label fan-out complete"
        );

        result
    }
}
