//! Mapping webhook deliveries onto label operations.
//!
//! The router looks at the event kind header and the `action` member of the
//! payload and decides which label, if any, has to change. Kinds other than
//! `issues` and `milestone` are rejected outright; actions other than the four
//! that affect labels are accepted and ignored.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{EntityKind, LabelOperation, LabelStyle, SyncConfig, SyncError, SyncResult};

#[cfg(test)]
#[path = "event_router_tests.rs"]
mod tests;

/// The entity fields carried in issue and milestone payloads.
#[derive(Debug, Clone, Deserialize)]
struct EntityPayload {
    number: u64,
    #[serde(default)]
    title: Option<String>,
}

/// The result of routing one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedEvent {
    /// Kind of entity the event is about
    pub kind: EntityKind,

    /// Action as sent by GitHub
    pub action: String,

    /// Label change to make on every target, `None` for ignored actions
    pub operation: Option<LabelOperation>,
}

/// How an action affects the label of its entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionEffect {
    Upsert,
    Delete,
    Ignore,
}

impl ActionEffect {
    pub fn of(action: &str) -> Self {
        match action {
            "opened" | "edited" | "created" => ActionEffect::Upsert,
            "deleted" => ActionEffect::Delete,
            _ => ActionEffect::Ignore,
        }
    }
}

/// Turns webhook deliveries into [`LabelOperation`]s.
#[derive(Debug, Clone)]
pub struct EventRouter {
    styles: BTreeMap<EntityKind, LabelStyle>,
}

impl EventRouter {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            styles: config.entity_label_config.clone(),
        }
    }

    /// Routes a delivery given its event kind and raw JSON body.
    ///
    /// # Errors
    ///
    /// - `UnroutableEvent` when the event kind is not `issues` or
    ///   `milestone`, or that kind has no label configuration
    /// - `InvalidPayload` when the body is not JSON, has no `action`, or an
    ///   upsert/delete action lacks the entity's number or (for upserts) title
    #[instrument(skip(self, body), fields(event = %event_kind))]
    pub fn route(&self, event_kind: &str, body: &[u8]) -> SyncResult<RoutedEvent> {
        let kind = EntityKind::from_event(event_kind).ok_or_else(|| SyncError::UnroutableEvent {
            event: event_kind.to_string(),
        })?;
        let style = self
            .styles
            .get(&kind)
            .ok_or_else(|| SyncError::UnroutableEvent {
                event: event_kind.to_string(),
            })?;

        let payload: Value = serde_json::from_slice(body)
            .map_err(|e| SyncError::InvalidPayload(format!("body is not JSON: {}", e)))?;
        let action = payload
            .get("action")
            .and_then(Value::as_str)
            .ok_or_else(|| SyncError::InvalidPayload("missing 'action'".to_string()))?
            .to_string();

        let effect = ActionEffect::of(&action);
        if effect == ActionEffect::Ignore {
            debug!(action = %action, "Action does not affect labels");
            return Ok(RoutedEvent {
                kind,
                action,
                operation: None,
            });
        }

        let entity = entity_payload(&payload, kind)?;
        let operation = match effect {
            ActionEffect::Upsert => {
                let title = entity.title.ok_or_else(|| {
                    SyncError::InvalidPayload(format!("missing '{}.title'", kind.as_str()))
                })?;
                LabelOperation::Upsert {
                    prefix: style.prefix.clone(),
                    number: entity.number,
                    color: style.color.clone(),
                    description: title,
                }
            }
            _ => LabelOperation::Delete {
                prefix: style.prefix.clone(),
                number: entity.number,
            },
        };

        debug!(action = %action, label = %operation.label_key(), "Event routed");
        Ok(RoutedEvent {
            kind,
            action,
            operation: Some(operation),
        })
    }
}

fn entity_payload(payload: &Value, kind: EntityKind) -> SyncResult<EntityPayload> {
    let key = kind.as_str();
    let value = payload
        .get(key)
        .ok_or_else(|| SyncError::InvalidPayload(format!("missing '{}'", key)))?;

    EntityPayload::deserialize(value)
        .map_err(|e| SyncError::InvalidPayload(format!("invalid '{}': {}", key, e)))
}
