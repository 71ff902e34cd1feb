//! Configuration for the label synchronisation service.
//!
//! The configuration is read once at startup from a TOML file, validated, and
//! handed by value to the components that need it. Nothing reads it again
//! while requests are being served.
//!
//! # Example TOML Configuration
//!
//! ```toml
//! github_token = "ghp_..."
//! webhook_secret = "shared-secret"
//! target_repos = ["example-org/frontend", "example-org/backend"]
//!
//! [entity_label_config.issue]
//! prefix = "issue"
//! color = "b4f291"
//!
//! [entity_label_config.milestone]
//! prefix = "milestone"
//! color = "#5319E7"
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use github_client::RepositoryRef;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{ConfigurationError, EntityKind, LABEL_KEY_SEPARATOR};

#[cfg(test)]
#[path = "configuration_tests.rs"]
mod tests;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "config.toml";

/// Environment variable that overrides the configuration file location
pub const CONFIG_PATH_ENV: &str = "LABEL_SYNC_CONFIG";

/// Default bound on a single GitHub request, in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Default number of target repositories updated at the same time
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// How labels for one entity kind are named and coloured.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LabelStyle {
    /// Text placed before the entity number in the label name
    pub prefix: String,

    /// Six hex digit colour, lowercase, without a leading `#`
    pub color: String,
}

/// File layout as written by operators, before validation.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    github_token: Option<String>,
    webhook_secret: Option<String>,
    #[serde(default)]
    target_repos: Vec<String>,
    #[serde(default)]
    entity_label_config: BTreeMap<String, LabelStyle>,
    github_api_url: Option<String>,
    request_timeout_seconds: Option<u64>,
    max_concurrency: Option<usize>,
}

/// Validated service configuration.
///
/// Secrets are wrapped in [`SecretString`] so they never show up in `Debug`
/// output or logs.
#[derive(Debug)]
pub struct SyncConfig {
    /// Bearer token used for every GitHub request
    pub github_token: SecretString,

    /// Shared secret for webhook signatures; only the server requires it
    pub webhook_secret: Option<SecretString>,

    /// Label naming per entity kind
    pub entity_label_config: BTreeMap<EntityKind, LabelStyle>,

    /// Repositories that receive the labels, in configuration order
    pub target_repos: Vec<RepositoryRef>,

    /// Alternative API root, for GitHub Enterprise
    pub github_api_url: Option<String>,

    /// Bound on a single GitHub request
    pub request_timeout: Duration,

    /// Number of target repositories updated at the same time
    pub max_concurrency: usize,
}

impl SyncConfig {
    /// Returns the configuration path: `LABEL_SYNC_CONFIG` if set, otherwise
    /// `config.toml` in the working directory.
    pub fn default_path() -> PathBuf {
        env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILENAME))
    }

    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if the file is missing or unreadable,
    /// is not valid TOML, or fails validation (see [`SyncConfig::from_toml_str`]).
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        debug!("Loading configuration from {:?}", path);

        if !path.exists() {
            return Err(ConfigurationError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content =
            fs::read_to_string(path).map_err(|e| ConfigurationError::FileAccessError {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        Self::from_toml_str(&content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// - `RequiredConfigMissing` when `github_token` or `entity_label_config`
    ///   is absent
    /// - `InvalidConfiguration` for unknown entity kinds, empty or duplicate
    ///   prefixes, prefixes containing the key separator, colours that are not
    ///   six hex digits, malformed repository identifiers, or a zero
    ///   concurrency limit
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigurationError> {
        let raw: RawConfig = toml::from_str(content).map_err(|e| ConfigurationError::ParseError {
            reason: e.to_string(),
        })?;

        let github_token = raw
            .github_token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ConfigurationError::RequiredConfigMissing {
                key: "github_token".to_string(),
            })?;

        let webhook_secret = raw
            .webhook_secret
            .filter(|s| !s.is_empty())
            .map(SecretString::from);

        let entity_label_config = validate_label_config(raw.entity_label_config)?;

        let target_repos = raw
            .target_repos
            .iter()
            .map(|repo| {
                repo.parse::<RepositoryRef>()
                    .map_err(|e| ConfigurationError::InvalidConfiguration {
                        field: "target_repos".to_string(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if target_repos.is_empty() {
            warn!("No target repositories configured, label operations will have no effect");
        }

        let max_concurrency = raw.max_concurrency.unwrap_or(DEFAULT_MAX_CONCURRENCY);
        if max_concurrency == 0 {
            return Err(ConfigurationError::InvalidConfiguration {
                field: "max_concurrency".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let timeout_seconds = raw
            .request_timeout_seconds
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS);
        if timeout_seconds == 0 {
            return Err(ConfigurationError::InvalidConfiguration {
                field: "request_timeout_seconds".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            github_token: SecretString::from(github_token),
            webhook_secret,
            entity_label_config,
            target_repos,
            github_api_url: raw.github_api_url.filter(|u| !u.is_empty()),
            request_timeout: Duration::from_secs(timeout_seconds),
            max_concurrency,
        })
    }

    /// Returns the label style for an entity kind, if one is configured.
    pub fn label_style(&self, kind: EntityKind) -> Option<&LabelStyle> {
        self.entity_label_config.get(&kind)
    }

    /// Returns the webhook secret, which the server cannot run without.
    ///
    /// # Errors
    /// Returns `RequiredConfigMissing` when no secret is configured.
    pub fn require_webhook_secret(&self) -> Result<&SecretString, ConfigurationError> {
        self.webhook_secret
            .as_ref()
            .ok_or_else(|| ConfigurationError::RequiredConfigMissing {
                key: "webhook_secret".to_string(),
            })
    }
}

fn validate_label_config(
    raw: BTreeMap<String, LabelStyle>,
) -> Result<BTreeMap<EntityKind, LabelStyle>, ConfigurationError> {
    if raw.is_empty() {
        return Err(ConfigurationError::RequiredConfigMissing {
            key: "entity_label_config".to_string(),
        });
    }

    let mut styles = BTreeMap::new();
    let mut prefixes = HashSet::new();

    for (key, style) in raw {
        let field = format!("entity_label_config.{}", key);
        let kind = EntityKind::from_config_key(&key).ok_or_else(|| {
            ConfigurationError::InvalidConfiguration {
                field: field.clone(),
                reason: "unknown entity kind, expected 'issue' or 'milestone'".to_string(),
            }
        })?;

        let prefix = style.prefix.trim().to_string();
        if prefix.is_empty() {
            return Err(ConfigurationError::InvalidConfiguration {
                field: format!("{}.prefix", field),
                reason: "must not be empty".to_string(),
            });
        }
        if prefix.contains(LABEL_KEY_SEPARATOR) {
            return Err(ConfigurationError::InvalidConfiguration {
                field: format!("{}.prefix", field),
                reason: format!("must not contain '{}'", LABEL_KEY_SEPARATOR),
            });
        }
        if !prefixes.insert(prefix.clone()) {
            return Err(ConfigurationError::InvalidConfiguration {
                field: format!("{}.prefix", field),
                reason: format!("prefix '{}' is used by another entity kind", prefix),
            });
        }

        let color = normalize_color(&style.color).ok_or_else(|| {
            ConfigurationError::InvalidConfiguration {
                field: format!("{}.color", field),
                reason: format!("'{}' is not six hex digits", style.color),
            }
        })?;

        styles.insert(kind, LabelStyle { prefix, color });
    }

    Ok(styles)
}

/// Strips an optional `#` and lowercases, the form GitHub stores colours in.
fn normalize_color(color: &str) -> Option<String> {
    let hex = color.trim().trim_start_matches('#');
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(hex.to_ascii_lowercase())
    } else {
        None
    }
}
