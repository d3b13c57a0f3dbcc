//! Event processor for converting verified webhook bodies to envelopes.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::error::EventError;

use super::{EventEnvelope, EventId, EventKind, EventMetadata};

/// Event processor configuration.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Maximum allowed payload size in bytes
    pub max_payload_size: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            max_payload_size: 1024 * 1024, // 1MB
        }
    }
}

/// Parses raw webhook bodies into [`EventEnvelope`]s.
///
/// The processor only sees bodies whose signature has already been verified;
/// it never re-serializes them for verification purposes.
///
/// # Examples
///
/// ```rust
/// use platform_api_sdk::events::{EventKind, EventProcessor, ProcessorConfig};
///
/// let processor = EventProcessor::new(ProcessorConfig::default());
/// let envelope = processor
///     .process_webhook(br#"{"id":"evt_1","type":"content.uploaded"}"#, Some("dlv-9"))
///     .unwrap();
///
/// assert_eq!(envelope.kind, EventKind::ContentUploaded);
/// assert_eq!(envelope.event_id.as_str(), "evt_1");
/// assert_eq!(envelope.metadata.delivery_id.as_deref(), Some("dlv-9"));
/// ```
#[derive(Debug, Clone)]
pub struct EventProcessor {
    config: ProcessorConfig,
}

impl EventProcessor {
    /// Create a new event processor with the given configuration.
    pub fn new(config: ProcessorConfig) -> Self {
        Self { config }
    }

    /// Get the processor configuration.
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Process a raw webhook body into a normalized event envelope.
    ///
    /// # Arguments
    ///
    /// * `payload` - Raw webhook body bytes
    /// * `delivery_id` - Delivery ID from the `X-Webhook-Id` header, if sent
    ///
    /// # Errors
    ///
    /// Returns `EventError` if:
    /// - Payload exceeds the maximum size
    /// - Payload is not valid JSON or not a JSON object
    ///
    /// A missing `type` becomes `EventKind::Unknown("")`; a non-string one
    /// becomes `EventKind::Unknown` holding its JSON text.
    pub fn process_webhook(
        &self,
        payload: &[u8],
        delivery_id: Option<&str>,
    ) -> Result<EventEnvelope, EventError> {
        if payload.len() > self.config.max_payload_size {
            return Err(EventError::PayloadTooLarge {
                size: payload.len(),
                max: self.config.max_payload_size,
            });
        }

        let value: Value = serde_json::from_slice(payload)?;
        let object = value.as_object().ok_or_else(|| EventError::InvalidPayload {
            message: "payload must be a JSON object".to_string(),
        })?;

        let kind = match object.get("type") {
            Some(Value::String(event_type)) => EventKind::from_type(event_type),
            Some(other) => EventKind::Unknown(other.to_string()),
            None => EventKind::Unknown(String::new()),
        };

        let event_id = object
            .get("id")
            .and_then(Value::as_str)
            .or(delivery_id)
            .map(EventId::from)
            .unwrap_or_default();

        let data = object.get("data").cloned().unwrap_or(Value::Null);
        let created_at = object
            .get("createdAt")
            .and_then(Value::as_str)
            .and_then(parse_timestamp);

        Ok(EventEnvelope {
            event_id,
            kind,
            data,
            created_at,
            metadata: EventMetadata {
                received_at: Utc::now(),
                delivery_id: delivery_id.map(str::to_string),
                signature_verified: true,
            },
        })
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            debug!(error = %e, "Ignoring unparseable createdAt timestamp");
            None
        }
    }
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;
