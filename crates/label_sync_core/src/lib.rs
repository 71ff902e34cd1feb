//! # Label Sync Core
//!
//! This crate relays the state of GitHub issues and milestones in a source
//! repository into labels on a set of target repositories, so that items in
//! the targets can be tagged with the upstream issue or milestone they belong
//! to.
//!
//! ## Overview
//!
//! Every tracked entity gets one label per target repository, named
//! `{prefix}:{number}` and described by the entity's title. Two paths keep
//! those labels current:
//!
//! 1. Webhook deliveries ([`WebhookProcessor`]): the signature is verified
//!    ([`SignatureVerifier`]), the event is mapped to an operation
//!    ([`EventRouter`]), and the operation is applied to every target
//!    ([`FanOutDriver`]).
//! 2. Bulk reconciliation ([`BulkSync`]): every open entity of a source
//!    repository is upserted on every target.
//!
//! Both paths end in [`LabelManager`], which reads before it writes so that
//! repeated deliveries converge on the same state without duplicate labels.
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use github_client::{create_token_client, GitHubClient};
//! use label_sync_core::{SyncConfig, WebhookDelivery, WebhookProcessor};
//!
//! # async fn example(body: &[u8], signature: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let config = SyncConfig::load(&SyncConfig::default_path())?;
//! let octocrab = create_token_client(
//!     &config.github_token,
//!     config.github_api_url.as_deref(),
//!     config.request_timeout,
//! )?;
//! let processor = WebhookProcessor::new(&config, Arc::new(GitHubClient::new(octocrab)))?;
//!
//! let outcome = processor
//!     .process(WebhookDelivery {
//!         event: "issues",
//!         signature: Some(signature),
//!         delivery_id: None,
//!         body,
//!     })
//!     .await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! GitHub access goes through the [`github_client::LabelClient`] and
//! [`github_client::EntitySource`] traits so every component can be tested
//! against in-memory implementations.

mod errors;

// Re-export error types for public API
pub use errors::{ConfigurationError, SyncError, SyncResult};

/// Entity kinds (issue, milestone)
pub mod entity;

/// Label naming and description truncation
pub mod label_key;

/// Service configuration
pub mod configuration;

/// Single-repository label reconciliation
pub mod label_manager;

/// Applying an operation to all targets
pub mod fan_out;

/// Webhook signature checks
pub mod signature;

/// Webhook event routing
pub mod event_router;

/// Webhook delivery processing
pub mod webhook;

/// Bulk reconciliation from a source repository
pub mod bulk_sync;

// Re-export commonly used types
pub use bulk_sync::{BulkSync, BulkSyncSummary};
pub use configuration::{LabelStyle, SyncConfig};
pub use entity::EntityKind;
pub use event_router::{EventRouter, RoutedEvent};
pub use fan_out::{FanOutDriver, FanOutResult, TargetFailure};
pub use label_key::{
    label_key, truncate_description, ELLIPSIS, LABEL_KEY_SEPARATOR, MAX_DESCRIPTION_LENGTH,
};
pub use label_manager::{LabelChange, LabelManager, LabelOperation};
pub use signature::{compute_signature, SignatureVerifier, SIGNATURE_PREFIX};
pub use webhook::{DeliveryOutcome, WebhookDelivery, WebhookProcessor};

#[cfg(test)]
pub(crate) mod test_support;
