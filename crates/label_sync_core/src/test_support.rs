//! In-memory stand-ins for the GitHub traits, shared by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use github_client::{
    EntitySource, EntitySummary, Error, Label, LabelClient, LabelUpdate, NewLabel, RepositoryRef,
};

/// A call received by [`RecordingLabelClient`].
#[derive(Debug, Clone, PartialEq)]
pub enum LabelCall {
    Fetch {
        repo: String,
        name: String,
    },
    Create {
        repo: String,
        label: NewLabel,
    },
    Update {
        repo: String,
        name: String,
        update: LabelUpdate,
    },
    Delete {
        repo: String,
        name: String,
    },
}

impl LabelCall {
    pub fn repo(&self) -> &str {
        match self {
            LabelCall::Fetch { repo, .. }
            | LabelCall::Create { repo, .. }
            | LabelCall::Update { repo, .. }
            | LabelCall::Delete { repo, .. } => repo,
        }
    }

    pub fn is_write(&self) -> bool {
        !matches!(self, LabelCall::Fetch { .. })
    }
}

/// Label store that behaves like GitHub's and records every call.
///
/// Repositories marked as failing answer every call with a 500.
#[derive(Default)]
pub struct RecordingLabelClient {
    labels: Mutex<HashMap<(String, String), Label>>,
    calls: Mutex<Vec<LabelCall>>,
    failing_repos: Mutex<HashSet<String>>,
}

impl RecordingLabelClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(self, repo: &str, name: &str, color: &str, description: &str) -> Self {
        self.labels.lock().unwrap().insert(
            (repo.to_string(), name.to_string()),
            Label {
                name: name.to_string(),
                color: color.to_string(),
                description: Some(description.to_string()),
            },
        );
        self
    }

    pub fn with_failing_repo(self, repo: &str) -> Self {
        self.failing_repos.lock().unwrap().insert(repo.to_string());
        self
    }

    pub fn calls(&self) -> Vec<LabelCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<LabelCall> {
        self.calls().into_iter().filter(|c| c.is_write()).collect()
    }

    pub fn label(&self, repo: &str, name: &str) -> Option<Label> {
        self.labels
            .lock()
            .unwrap()
            .get(&(repo.to_string(), name.to_string()))
            .cloned()
    }

    fn record(&self, call: LabelCall) -> Result<(), Error> {
        let repo = call.repo().to_string();
        self.calls.lock().unwrap().push(call);
        if self.failing_repos.lock().unwrap().contains(&repo) {
            return Err(Error::RemoteError {
                message: "Simulated failure".to_string(),
                status: 500,
                body: format!("{} is unavailable", repo),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LabelClient for RecordingLabelClient {
    async fn fetch_label(&self, repo: &RepositoryRef, name: &str) -> Result<Option<Label>, Error> {
        self.record(LabelCall::Fetch {
            repo: repo.to_string(),
            name: name.to_string(),
        })?;
        Ok(self.label(&repo.to_string(), name))
    }

    async fn create_label(&self, repo: &RepositoryRef, label: &NewLabel) -> Result<(), Error> {
        self.record(LabelCall::Create {
            repo: repo.to_string(),
            label: label.clone(),
        })?;
        let key = (repo.to_string(), label.name.clone());
        let mut labels = self.labels.lock().unwrap();
        if labels.contains_key(&key) {
            return Err(Error::RemoteError {
                message: "Unable to create label".to_string(),
                status: 422,
                body: "already_exists".to_string(),
            });
        }
        labels.insert(
            key,
            Label {
                name: label.name.clone(),
                color: label.color.clone(),
                description: Some(label.description.clone()),
            },
        );
        Ok(())
    }

    async fn update_label(
        &self,
        repo: &RepositoryRef,
        name: &str,
        update: &LabelUpdate,
    ) -> Result<(), Error> {
        self.record(LabelCall::Update {
            repo: repo.to_string(),
            name: name.to_string(),
            update: update.clone(),
        })?;
        let mut labels = self.labels.lock().unwrap();
        let label = labels
            .get_mut(&(repo.to_string(), name.to_string()))
            .ok_or_else(|| Error::RemoteError {
                message: "Unable to modify label".to_string(),
                status: 404,
                body: "Not Found".to_string(),
            })?;
        if let Some(description) = &update.description {
            label.description = Some(description.clone());
        }
        if let Some(color) = &update.color {
            label.color = color.clone();
        }
        Ok(())
    }

    async fn delete_label(&self, repo: &RepositoryRef, name: &str) -> Result<(), Error> {
        self.record(LabelCall::Delete {
            repo: repo.to_string(),
            name: name.to_string(),
        })?;
        self.labels
            .lock()
            .unwrap()
            .remove(&(repo.to_string(), name.to_string()));
        Ok(())
    }
}

/// Entity source returning fixed lists.
#[derive(Default)]
pub struct StaticEntitySource {
    pub issues: Vec<EntitySummary>,
    pub milestones: Vec<EntitySummary>,
    pub listed: Mutex<Vec<String>>,
}

pub fn entity(number: u64, title: &str) -> EntitySummary {
    EntitySummary {
        number,
        title: title.to_string(),
    }
}

#[async_trait]
impl EntitySource for StaticEntitySource {
    async fn list_issues(&self, repo: &RepositoryRef) -> Result<Vec<EntitySummary>, Error> {
        self.listed
            .lock()
            .unwrap()
            .push(format!("{}/issues", repo));
        Ok(self.issues.clone())
    }

    async fn list_milestones(&self, repo: &RepositoryRef) -> Result<Vec<EntitySummary>, Error> {
        self.listed
            .lock()
            .unwrap()
            .push(format!("{}/milestones", repo));
        Ok(self.milestones.clone())
    }
}

/// Configuration used across tests: two targets, both entity kinds.
pub fn test_config() -> crate::SyncConfig {
    crate::SyncConfig::from_toml_str(
        r#"
github_token = "ghp_test"
webhook_secret = "It's a Secret to Everybody"
target_repos = ["octo/alpha", "octo/beta"]

[entity_label_config.issue]
prefix = "issue"
color = "b4f291"

[entity_label_config.milestone]
prefix = "milestone"
color = "5319e7"
"#,
    )
    .expect("test configuration is valid")
}
