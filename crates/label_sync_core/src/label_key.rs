//! Label naming and description rules.
//!
//! A label is named after the entity it mirrors: the configured prefix and the
//! entity number joined by [`LABEL_KEY_SEPARATOR`], e.g. `issue:42`.

pub use github_client::{truncate_description, ELLIPSIS, MAX_DESCRIPTION_LENGTH};

#[cfg(test)]
#[path = "label_key_tests.rs"]
mod tests;

/// Separator between prefix and number in a label key.
pub const LABEL_KEY_SEPARATOR: char = ':';

/// Derives the label name for an entity.
///
/// # Examples
///
/// ```
/// use label_sync_core::label_key;
///
/// assert_eq!(label_key("issue", 42), "issue:42");
/// ```
pub fn label_key(prefix: &str, number: u64) -> String {
    format!("{}{}{}", prefix, LABEL_KEY_SEPARATOR, number)
}
