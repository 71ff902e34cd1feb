//! Bulk reconciliation of every open entity of a source repository.
//!
//! Used to seed labels on new target repositories, or to repair drift after
//! missed webhook deliveries. This path never deletes labels.

use std::sync::Arc;

use github_client::{EntitySource, EntitySummary, LabelClient, RepositoryRef};
use tracing::{error, info, instrument, warn};

use crate::{EntityKind, LabelChange, LabelManager, LabelStyle, SyncConfig, SyncResult};

#[cfg(test)]
#[path = "bulk_sync_tests.rs"]
mod tests;

/// Counts for a bulk run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkSyncSummary {
    /// Target repositories processed
    pub targets: usize,

    /// Entities read from the source repository, over all kinds
    pub entities: usize,

    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl BulkSyncSummary {
    fn record(&mut self, change: LabelChange) {
        match change {
            LabelChange::Created => self.created += 1,
            LabelChange::Updated => self.updated += 1,
            LabelChange::Unchanged => self.unchanged += 1,
            // upserts never delete
            LabelChange::Deleted => {}
        }
    }
}

/// Entities of one kind together with the style their labels use.
struct KindBatch {
    kind: EntityKind,
    style: LabelStyle,
    entities: Vec<EntitySummary>,
}

/// Upserts a label for every open issue and milestone of a source repository
/// on every target repository.
pub struct BulkSync {
    source: Arc<dyn EntitySource>,
    manager: LabelManager,
    styles: Vec<(EntityKind, LabelStyle)>,
    targets: Vec<RepositoryRef>,
}

impl BulkSync {
    pub fn new(
        config: &SyncConfig,
        source: Arc<dyn EntitySource>,
        client: Arc<dyn LabelClient>,
    ) -> Self {
        let styles = EntityKind::ALL
            .iter()
            .filter_map(|kind| match config.label_style(*kind) {
                Some(style) => Some((*kind, style.clone())),
                None => {
                    warn!(kind = %kind, "No label configuration for entity kind, skipping it");
                    None
                }
            })
            .collect();

        Self {
            source,
            manager: LabelManager::new(client),
            styles,
            targets: config.target_repos.clone(),
        }
    }

    /// Reconciles all entities of `source_repo` onto every target.
    ///
    /// Entities are listed once per kind. Targets are then processed one at a
    /// time, each receiving every entity.
    ///
    /// # Errors
    ///
    /// Returns the first `SyncError::Remote` encountered, after logging the
    /// entity and target it happened on. Later items are not attempted.
    #[instrument(skip(self), fields(source = %source_repo))]
    pub async fn run(&self, source_repo: &RepositoryRef) -> SyncResult<BulkSyncSummary> {
        let mut summary = BulkSyncSummary::default();

        let mut batches = Vec::with_capacity(self.styles.len());
        for (kind, style) in &self.styles {
            let entities = self.list(source_repo, *kind).await.inspect_err(|e| {
                error!(kind = %kind, error = %e, "Failed to list source entities");
            })?;
            info!(kind = %kind, count = entities.len(), "Listed source entities");
            summary.entities += entities.len();
            batches.push(KindBatch {
                kind: *kind,
                style: style.clone(),
                entities,
            });
        }

        for target in &self.targets {
            info!("Syncing {} to {}", source_repo, target);
            summary.targets += 1;

            for batch in &batches {
                for entity in &batch.entities {
                    info!(
                        "-- syncing {} '{}:{}'",
                        batch.kind, entity.number, entity.title
                    );
                    let change = self
                        .manager
                        .upsert(
                            target,
                            &batch.style.prefix,
                            entity.number,
                            &batch.style.color,
                            &entity.title,
                        )
                        .await
                        .inspect_err(|e| {
                            error!(
                                target = %target,
                                kind = %batch.kind,
                                number = entity.number,
                                error = %e,
                                "Label sync failed, stopping"
                            );
                            log_summary(&summary);
                        })?;
                    summary.record(change);
                }
            }
        }

        log_summary(&summary);
        Ok(summary)
    }

    async fn list(
        &self,
        repo: &RepositoryRef,
        kind: EntityKind,
    ) -> SyncResult<Vec<EntitySummary>> {
        let entities = match kind {
            EntityKind::Issue => self.source.list_issues(repo).await?,
            EntityKind::Milestone => self.source.list_milestones(repo).await?,
        };
        Ok(entities)
    }
}

fn log_summary(summary: &BulkSyncSummary) {
    info!(
        targets = summary.targets,
        entities = summary.entities,
        created = summary.created,
        updated = summary.updated,
        unchanged = summary.unchanged,
        "Bulk sync summary"
    );
}
