//! # Models
//!
//! Repository identifiers and the source entities (issues, milestones) that are
//! read from GitHub when labels are reconciled in bulk.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// A repository identified by owner and name, written `owner/name`.
///
/// Parsing rejects anything that is not exactly two non-empty segments made of
/// the characters GitHub allows in owner and repository names.
///
/// # Examples
///
/// ```
/// use github_client::RepositoryRef;
///
/// let repo: RepositoryRef = "example-org/example-repo".parse().unwrap();
/// assert_eq!(repo.owner, "example-org");
/// assert_eq!(repo.name, "example-repo");
/// assert_eq!(repo.to_string(), "example-org/example-repo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    /// Creates a repository reference from its parts.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

impl FromStr for RepositoryRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (owner, name) = trimmed
            .split_once('/')
            .ok_or_else(|| Error::InvalidRepository(s.to_string()))?;

        if !is_valid_segment(owner) || !is_valid_segment(name) {
            return Err(Error::InvalidRepository(s.to_string()));
        }

        Ok(Self::new(owner, name))
    }
}

impl TryFrom<String> for RepositoryRef {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RepositoryRef> for String {
    fn from(value: RepositoryRef) -> Self {
        value.to_string()
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// The parts of an issue or milestone that label synchronisation needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySummary {
    /// Number of the issue or milestone, unique within its repository and kind
    pub number: u64,

    /// Current title
    pub title: String,
}

/// Raw list item returned by the issues and milestones endpoints.
///
/// The issues endpoint also returns pull requests; those carry a
/// `pull_request` member.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EntityRecord {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl EntityRecord {
    pub(crate) fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

impl From<EntityRecord> for EntitySummary {
    fn from(value: EntityRecord) -> Self {
        Self {
            number: value.number,
            title: value.title,
        }
    }
}
