//! Webhook handler trait for application-provided processing logic.
//!
//! Handlers receive verified, parsed [`EventEnvelope`]s and run after the HTTP
//! response has been produced, so long-running work never delays the sender.
//!
//! # Examples
//!
//! ```rust,no_run
//! use platform_api_sdk::webhook::WebhookHandler;
//! use platform_api_sdk::events::{EventEnvelope, EventKind};
//! use async_trait::async_trait;
//!
//! struct RevenueHandler;
//!
//! #[async_trait]
//! impl WebhookHandler for RevenueHandler {
//!     async fn handle_event(&self, envelope: &EventEnvelope) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!         match &envelope.kind {
//!             EventKind::PurchaseCompleted => println!("revenue: {}", envelope.data["amount"]),
//!             EventKind::ContentUploaded | EventKind::PayoutProcessed => {}
//!             EventKind::Unknown(_) => {}
//!         }
//!         Ok(())
//!     }
//! }
//! ```

use crate::events::{EventEnvelope, EventKind};
use async_trait::async_trait;
use std::error::Error;
use tracing::{info, warn};

/// Application-provided webhook event handler.
///
/// Handler errors are logged but never change the HTTP response. Multiple
/// handlers can be registered and run concurrently for each event, so
/// implementations must be `Send + Sync`.
#[async_trait]
pub trait WebhookHandler: Send + Sync {
    /// Handle a verified webhook event.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Event processed successfully
    /// * `Err(e)` - Event processing failed with error details
    async fn handle_event(
        &self,
        envelope: &EventEnvelope,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// Built-in handler that logs a summary of every event it receives.
#[derive(Debug, Clone, Default)]
pub struct LoggingHandler;

impl LoggingHandler {
    /// Create a new logging handler.
    pub fn new() -> Self {
        Self
    }

    /// One-line description of an event for logs and CLI output.
    pub fn describe(envelope: &EventEnvelope) -> String {
        let data = &envelope.data;
        match &envelope.kind {
            EventKind::PurchaseCompleted => format!(
                "Purchase completed: {} ({} {})",
                field(data, "purchaseId"),
                field(data, "amount"),
                field(data, "currency"),
            ),
            EventKind::ContentUploaded => format!(
                "Content uploaded: {} by {}",
                field(data, "contentId"),
                field(data, "creatorId"),
            ),
            EventKind::PayoutProcessed => format!(
                "Payout processed: {} ({} {})",
                field(data, "payoutId"),
                field(data, "amount"),
                field(data, "currency"),
            ),
            EventKind::Unknown(event_type) => format!("Unhandled event type: {}", event_type),
        }
    }
}

fn field(data: &serde_json::Value, name: &str) -> String {
    match data.get(name) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "-".to_string(),
    }
}

#[async_trait]
impl WebhookHandler for LoggingHandler {
    async fn handle_event(
        &self,
        envelope: &EventEnvelope,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let summary = Self::describe(envelope);
        if envelope.kind.is_known() {
            info!(event_id = %envelope.event_id, event_type = %envelope.kind, "{}", summary);
        } else {
            warn!(event_id = %envelope.event_id, event_type = %envelope.kind, "{}", summary);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
