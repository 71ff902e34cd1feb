//! Entity kinds tracked by the service.

use std::fmt;

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "entity_tests.rs"]
mod tests;

/// The kinds of source entity whose state is mirrored into labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Issue,
    Milestone,
}

impl EntityKind {
    /// Every supported kind, in the order bulk synchronisation visits them.
    pub const ALL: [EntityKind; 2] = [EntityKind::Issue, EntityKind::Milestone];

    /// Maps a webhook event name (the `X-Github-Event` header) to a kind.
    ///
    /// Returns `None` for every event that does not describe an issue or a
    /// milestone.
    pub fn from_event(event: &str) -> Option<Self> {
        match event {
            "issues" => Some(Self::Issue),
            "milestone" => Some(Self::Milestone),
            _ => None,
        }
    }

    /// Maps a configuration key (`issue`, `milestone`) to a kind.
    pub fn from_config_key(key: &str) -> Option<Self> {
        match key {
            "issue" => Some(Self::Issue),
            "milestone" => Some(Self::Milestone),
            _ => None,
        }
    }

    /// The name used for this kind in configuration and as the key of the
    /// entity object inside webhook payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::Milestone => "milestone",
        }
    }

    /// The webhook event name that reports changes to this kind.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Issue => "issues",
            Self::Milestone => "milestone",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
