//! Label domain types.
//!
//! This module contains the types exchanged with the GitHub label endpoints and
//! the description length rule the label store enforces.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "label_tests.rs"]
mod tests;

/// Maximum number of characters GitHub accepts in a label description.
pub const MAX_DESCRIPTION_LENGTH: usize = 100;

/// Marker appended to descriptions that had to be shortened.
pub const ELLIPSIS: char = '…';

/// Shortens a description so it fits the label store.
///
/// Text of `MAX_DESCRIPTION_LENGTH` characters or more is cut to its first 99
/// characters followed by [`ELLIPSIS`]. Counting is done on characters, never
/// bytes, so multi-byte characters are never split.
///
/// # Examples
///
/// ```
/// use github_client::truncate_description;
///
/// assert_eq!(truncate_description("Fix bug"), "Fix bug");
///
/// let long = "x".repeat(120);
/// let short = truncate_description(&long);
/// assert_eq!(short.chars().count(), 100);
/// assert!(short.ends_with('…'));
/// ```
pub fn truncate_description(text: &str) -> String {
    if text.chars().count() >= MAX_DESCRIPTION_LENGTH {
        let mut truncated: String = text.chars().take(MAX_DESCRIPTION_LENGTH - 1).collect();
        truncated.push(ELLIPSIS);
        truncated
    } else {
        text.to_string()
    }
}

/// A label as stored on a repository.
///
/// # Examples
///
/// ```
/// use github_client::Label;
///
/// let label: Label = serde_json::from_str(
///     r#"{"name": "issue:42", "color": "b4f291", "description": "Fix bug"}"#,
/// ).unwrap();
/// assert_eq!(label.name, "issue:42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// The name of the label
    pub name: String,

    /// Six hex digit colour, without a leading `#`
    pub color: String,

    /// Free text description, `None` when GitHub reports `null`
    #[serde(default)]
    pub description: Option<String>,
}

/// Request body for creating a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewLabel {
    pub name: String,
    pub description: String,
    pub color: String,
}

impl NewLabel {
    /// Builds a creation payload, shortening the description to the store limit.
    pub fn new(
        name: impl Into<String>,
        color: impl Into<String>,
        description: &str,
    ) -> Self {
        Self {
            name: name.into(),
            description: truncate_description(description),
            color: color.into(),
        }
    }
}

/// Partial update for an existing label.
///
/// Only the fields that are set are sent; absent fields are left untouched by
/// GitHub.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl LabelUpdate {
    /// Sets the description, shortened to the store limit. Empty text is ignored.
    pub fn with_description(mut self, description: &str) -> Self {
        if !description.is_empty() {
            self.description = Some(truncate_description(description));
        }
        self
    }

    /// Sets the colour. Empty text is ignored.
    pub fn with_color(mut self, color: &str) -> Self {
        if !color.is_empty() {
            self.color = Some(color.to_string());
        }
        self
    }

    /// Returns true if the update would not change anything.
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.color.is_none()
    }
}
