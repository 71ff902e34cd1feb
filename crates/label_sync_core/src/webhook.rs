//! Handling of a single webhook delivery, independent of the HTTP server.

use std::sync::Arc;

use github_client::LabelClient;
use tracing::{info, instrument};

use crate::{
    ConfigurationError, EventRouter, FanOutDriver, FanOutResult, LabelManager, SignatureVerifier,
    SyncConfig, SyncResult,
};

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;

/// One inbound delivery as received from GitHub.
#[derive(Debug, Clone, Copy)]
pub struct WebhookDelivery<'a> {
    /// Value of `X-Github-Event`
    pub event: &'a str,

    /// Value of `X-Hub-Signature`, if the header was present
    pub signature: Option<&'a str>,

    /// Value of `X-Github-Delivery`, used only for logging
    pub delivery_id: Option<&'a str>,

    /// Raw request body, exactly as received
    pub body: &'a [u8],
}

/// What happened to an authenticated, routable delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The label operation was sent to every target
    Applied(FanOutResult),

    /// The action does not affect labels
    Ignored { action: String },
}

/// Verifies, routes, and applies webhook deliveries.
#[derive(Clone)]
pub struct WebhookProcessor {
    verifier: SignatureVerifier,
    router: EventRouter,
    fan_out: FanOutDriver,
}

impl WebhookProcessor {
    /// Builds a processor from configuration and a label client.
    ///
    /// # Errors
    ///
    /// Returns `RequiredConfigMissing` when no webhook secret is configured.
    pub fn new(
        config: &SyncConfig,
        client: Arc<dyn LabelClient>,
    ) -> Result<Self, ConfigurationError> {
        let secret = config.require_webhook_secret()?.clone();
        Ok(Self {
            verifier: SignatureVerifier::new(secret),
            router: EventRouter::new(config),
            fan_out: FanOutDriver::new(config, LabelManager::new(client)),
        })
    }

    /// Processes one delivery.
    ///
    /// The signature is checked on the raw body before anything is parsed.
    /// Per-target failures are reported inside the returned
    /// [`FanOutResult`], not as an error.
    ///
    /// # Errors
    ///
    /// - `InvalidSignature` when the signature is missing or wrong
    /// - `UnroutableEvent` for event kinds this service does not handle
    /// - `InvalidPayload` when the body cannot be read as that kind of event
    #[instrument(
        skip(self, delivery),
        fields(event = %delivery.event, delivery = delivery.delivery_id.unwrap_or("-"))
    )]
    pub async fn process(&self, delivery: WebhookDelivery<'_>) -> SyncResult<DeliveryOutcome> {
        self.verifier.verify(delivery.body, delivery.signature)?;

        let routed = self.router.route(delivery.event, delivery.body)?;
        let Some(operation) = routed.operation else {
            info!(action = %routed.action, "Ignoring action");
            return Ok(DeliveryOutcome::Ignored {
                action: routed.action,
            });
        };

        info!(
            kind = %routed.kind,
            action = %routed.action,
            label = %operation.label_key(),
            "Applying label operation"
        );
        let result = self.fan_out.apply(&operation).await;
        Ok(DeliveryOutcome::Applied(result))
    }
}
