//! Platform webhook event types.
//!
//! Webhook notifications arrive as JSON objects of the form
//! `{"id": "...", "type": "purchase.completed", "data": {...}}`. This module
//! turns the `type` string into a closed [`EventKind`] enum with an explicit
//! [`EventKind::Unknown`] variant, so handlers dispatch through an exhaustive
//! `match` and a new event kind cannot be ignored silently.
//!
//! # Examples
//!
//! ```rust
//! use platform_api_sdk::events::{EventProcessor, EventKind, ProcessorConfig};
//!
//! let processor = EventProcessor::new(ProcessorConfig::default());
//! let envelope = processor
//!     .process_webhook(br#"{"type":"payout.processed","data":{"amount":120}}"#, None)
//!     .unwrap();
//!
//! match &envelope.kind {
//!     EventKind::PurchaseCompleted => println!("purchase"),
//!     EventKind::ContentUploaded => println!("upload"),
//!     EventKind::PayoutProcessed => println!("payout of {}", envelope.data["amount"]),
//!     EventKind::Unknown(other) => println!("unknown event type: {}", other),
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

pub mod processor;

pub use processor::{EventProcessor, ProcessorConfig};

// ============================================================================
// Event Kind
// ============================================================================

/// The kinds of event the platform delivers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    /// A purchase finished and was paid (`purchase.completed`).
    PurchaseCompleted,
    /// A creator uploaded new content (`content.uploaded`).
    ContentUploaded,
    /// A payout to a creator was processed (`payout.processed`).
    PayoutProcessed,
    /// Any type string this SDK version does not recognize.
    Unknown(String),
}

impl EventKind {
    /// Wire name of `purchase.completed` events.
    pub const PURCHASE_COMPLETED: &'static str = "purchase.completed";
    /// Wire name of `content.uploaded` events.
    pub const CONTENT_UPLOADED: &'static str = "content.uploaded";
    /// Wire name of `payout.processed` events.
    pub const PAYOUT_PROCESSED: &'static str = "payout.processed";

    /// Classify a wire type string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use platform_api_sdk::events::EventKind;
    ///
    /// assert_eq!(EventKind::from_type("purchase.completed"), EventKind::PurchaseCompleted);
    /// assert_eq!(
    ///     EventKind::from_type("refund.issued"),
    ///     EventKind::Unknown("refund.issued".to_string())
    /// );
    /// ```
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            Self::PURCHASE_COMPLETED => Self::PurchaseCompleted,
            Self::CONTENT_UPLOADED => Self::ContentUploaded,
            Self::PAYOUT_PROCESSED => Self::PayoutProcessed,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The wire type string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::PurchaseCompleted => Self::PURCHASE_COMPLETED,
            Self::ContentUploaded => Self::CONTENT_UPLOADED,
            Self::PayoutProcessed => Self::PAYOUT_PROCESSED,
            Self::Unknown(other) => other,
        }
    }

    /// Whether this is one of the kinds this SDK understands.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// All kinds this SDK understands.
    pub fn known() -> [EventKind; 3] {
        [
            Self::PurchaseCompleted,
            Self::ContentUploaded,
            Self::PayoutProcessed,
        ]
    }
}

impl FromStr for EventKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_type(s))
    }
}

impl From<String> for EventKind {
    fn from(value: String) -> Self {
        Self::from_type(&value)
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Unknown(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Event ID
// ============================================================================

/// Unique identifier for a webhook event, used for correlation and deduplication.
///
/// Taken from the payload `id` when the sender provides one, otherwise from the
/// `X-Webhook-Id` delivery header, otherwise generated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(String);

impl EventId {
    /// Create a new random event ID using UUID v4.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the event ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Event Envelope
// ============================================================================

/// A verified, parsed webhook notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique identifier for this event
    pub event_id: EventId,

    /// Classified event type
    pub kind: EventKind,

    /// The `data` object of the notification (`null` when absent)
    pub data: serde_json::Value,

    /// When the sender created the event, if it said so
    pub created_at: Option<DateTime<Utc>>,

    /// Receipt metadata
    pub metadata: EventMetadata,
}

impl EventEnvelope {
    /// Create an envelope with fresh metadata.
    pub fn new(event_id: EventId, kind: EventKind, data: serde_json::Value) -> Self {
        Self {
            event_id,
            kind,
            data,
            created_at: None,
            metadata: EventMetadata::default(),
        }
    }

    /// Get the correlation ID for this event.
    pub fn correlation_id(&self) -> &str {
        self.event_id.as_str()
    }
}

/// Metadata recorded when an event is received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    /// When the event was received by this process
    pub received_at: DateTime<Utc>,

    /// Delivery ID from the `X-Webhook-Id` header
    pub delivery_id: Option<String>,

    /// Whether the signature was verified before parsing
    pub signature_verified: bool,
}

impl Default for EventMetadata {
    fn default() -> Self {
        Self {
            received_at: Utc::now(),
            delivery_id: None,
            signature_verified: false,
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
