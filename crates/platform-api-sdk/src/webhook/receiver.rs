//! Webhook receiver for HTTP intake and async processing coordination.
//!
//! The receiver follows a fire-and-forget pattern:
//! 1. Read the `X-Webhook-Signature` header
//! 2. Verify the signature over the raw body bytes
//! 3. Parse the verified body into an [`EventEnvelope`](crate::events::EventEnvelope)
//! 4. Return the HTTP response immediately
//! 5. Spawn async tasks for the registered handlers
//!
//! # Examples
//!
//! ```rust
//! use platform_api_sdk::webhook::{MessageAuthenticator, WebhookReceiver, WebhookRequest};
//! use platform_api_sdk::events::{EventProcessor, ProcessorConfig};
//! use std::collections::HashMap;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let authenticator = MessageAuthenticator::new("whsec_test123").unwrap();
//! let body = br#"{"type":"purchase.completed"}"#;
//! let signature = authenticator.sign(body);
//!
//! let receiver = WebhookReceiver::new(authenticator, EventProcessor::new(ProcessorConfig::default()));
//!
//! let headers = HashMap::from([("x-webhook-signature".to_string(), signature)]);
//! let response = receiver
//!     .receive_webhook(WebhookRequest::new(headers, bytes::Bytes::from_static(body)))
//!     .await;
//!
//! assert_eq!(response.status_code(), 200);
//! # }
//! ```

use crate::events::EventProcessor;
use crate::webhook::authenticator::{MessageAuthenticator, SIGNATURE_HEADER};
use crate::webhook::handler::WebhookHandler;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Header carrying the sender's delivery identifier.
pub const DELIVERY_ID_HEADER: &str = "x-webhook-id";

// ============================================================================
// Webhook Request/Response Types
// ============================================================================

/// Raw HTTP webhook request data.
///
/// Header names are matched case-insensitively. A header that occurs more
/// than once, including under names that differ only in case, has no single
/// value: [`header`](Self::header) returns `None` for it and the receiver
/// rejects a request carrying more than one signature.
///
/// # Examples
///
/// ```rust
/// use platform_api_sdk::webhook::WebhookRequest;
/// use std::collections::HashMap;
///
/// let headers = HashMap::from([
///     ("X-Webhook-Signature".to_string(), "abc".to_string()),
///     ("x-webhook-id".to_string(), "dlv-1".to_string()),
/// ]);
///
/// let request = WebhookRequest::new(headers, b"{}".to_vec().into());
/// assert_eq!(request.signature(), Some("abc"));
/// assert_eq!(request.delivery_id(), Some("dlv-1"));
/// ```
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    headers: HashMap<String, Vec<String>>,
    body: Bytes,
}

impl WebhookRequest {
    /// Create a new webhook request.
    pub fn new(headers: HashMap<String, String>, body: Bytes) -> Self {
        Self::from_header_pairs(headers, body)
    }

    /// Create a request from header pairs that may repeat a name.
    pub fn from_header_pairs<I>(headers: I, body: Bytes) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut collected: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            collected
                .entry(name.to_ascii_lowercase())
                .or_default()
                .push(value);
        }
        Self {
            headers: collected,
            body,
        }
    }

    /// Get the signature from the `X-Webhook-Signature` header.
    pub fn signature(&self) -> Option<&str> {
        self.header(SIGNATURE_HEADER)
    }

    /// Get the delivery ID from the `X-Webhook-Id` header.
    pub fn delivery_id(&self) -> Option<&str> {
        self.header(DELIVERY_ID_HEADER)
    }

    /// Get a header value by case-insensitive name.
    ///
    /// `None` when the header is absent or present more than once.
    pub fn header(&self, name: &str) -> Option<&str> {
        match self.headers.get(&name.to_ascii_lowercase()) {
            Some(values) if values.len() == 1 => Some(values[0].as_str()),
            _ => None,
        }
    }

    /// Number of times a header occurs.
    pub fn header_count(&self, name: &str) -> usize {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map_or(0, Vec::len)
    }

    /// Get the raw payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.body
    }
}

/// HTTP response for webhook requests.
///
/// Produced after verification and parsing, before handlers run.
#[derive(Debug, Clone)]
pub enum WebhookResponse {
    /// 200 OK - Webhook accepted and dispatched
    Ok { event_id: String },

    /// 401 Unauthorized - Missing or invalid signature
    Unauthorized { message: String },

    /// 400 Bad Request - Verified body that could not be parsed
    BadRequest { message: String },
}

impl WebhookResponse {
    /// Get the HTTP status code for this response.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Ok { .. } => 200,
            Self::Unauthorized { .. } => 401,
            Self::BadRequest { .. } => 400,
        }
    }

    /// Get the response message.
    pub fn message(&self) -> &str {
        match self {
            Self::Ok { .. } => "Webhook received",
            Self::Unauthorized { message } => message,
            Self::BadRequest { message } => message,
        }
    }

    /// Check if response indicates success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    /// JSON body to send back to the caller.
    ///
    /// Success is `{"received": true, "eventId": ...}`; failures are
    /// `{"error": message}`.
    pub fn body(&self) -> serde_json::Value {
        match self {
            Self::Ok { event_id } => serde_json::json!({
                "received": true,
                "eventId": event_id,
            }),
            Self::Unauthorized { message } | Self::BadRequest { message } => {
                serde_json::json!({ "error": message })
            }
        }
    }
}

// ============================================================================
// Webhook Receiver
// ============================================================================

/// Receives platform webhooks, authenticates them, and dispatches handlers.
///
/// A receiver is cheap to share behind an `Arc`; registered handlers are held
/// behind a lock so they can be added after the receiver is in use.
pub struct WebhookReceiver {
    authenticator: MessageAuthenticator,
    processor: EventProcessor,
    handlers: Arc<RwLock<Vec<Arc<dyn WebhookHandler>>>>,
}

impl WebhookReceiver {
    /// Create a new webhook receiver.
    pub fn new(authenticator: MessageAuthenticator, processor: EventProcessor) -> Self {
        Self {
            authenticator,
            processor,
            handlers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Register a webhook handler.
    ///
    /// Multiple handlers can be registered and execute concurrently.
    pub async fn add_handler(&self, handler: Arc<dyn WebhookHandler>) {
        let mut handlers = self.handlers.write().await;
        handlers.push(handler);
    }

    /// Number of registered handlers.
    pub async fn handler_count(&self) -> usize {
        self.handlers.read().await.len()
    }

    /// Process an incoming webhook request.
    ///
    /// Returns `Unauthorized` when the signature header is missing, repeated
    /// or does not verify against the raw body, `BadRequest` when a verified
    /// body is not a JSON object, and `Ok` otherwise. Events of an unknown kind are still
    /// acknowledged. Handlers run in spawned tasks after this returns.
    pub async fn receive_webhook(&self, request: WebhookRequest) -> WebhookResponse {
        let delivery_id = request.delivery_id();

        if request.header_count(SIGNATURE_HEADER) > 1 {
            warn!(delivery_id = ?delivery_id, "Multiple webhook signature headers");
            return WebhookResponse::Unauthorized {
                message: "Invalid signature".to_string(),
            };
        }

        let signature = match request.signature() {
            Some(sig) => sig,
            None => {
                warn!(delivery_id = ?delivery_id, "Missing webhook signature header");
                return WebhookResponse::Unauthorized {
                    message: "Invalid signature".to_string(),
                };
            }
        };

        if !self.authenticator.verify(request.payload(), signature) {
            warn!(delivery_id = ?delivery_id, "Invalid webhook signature");
            return WebhookResponse::Unauthorized {
                message: "Invalid signature".to_string(),
            };
        }

        debug!(delivery_id = ?delivery_id, "Webhook signature verified");

        let envelope = match self.processor.process_webhook(request.payload(), delivery_id) {
            Ok(env) => env,
            Err(e) => {
                error!(
                    delivery_id = ?delivery_id,
                    error = %e,
                    "Event processing failed"
                );
                return WebhookResponse::BadRequest {
                    message: format!("Invalid webhook payload: {}", e),
                };
            }
        };

        let event_id = envelope.event_id.to_string();

        if envelope.kind.is_known() {
            info!(
                event_id = %envelope.event_id,
                event_type = %envelope.kind,
                "Webhook processed successfully"
            );
        } else {
            warn!(
                event_id = %envelope.event_id,
                event_type = %envelope.kind,
                "Received webhook with unknown event type"
            );
        }

        // Fire-and-forget dispatch
        let handlers = self.handlers.clone();
        tokio::spawn(async move {
            let handlers_guard = handlers.read().await;
            for handler in handlers_guard.iter() {
                let handler_clone = handler.clone();
                let envelope_clone = envelope.clone();

                tokio::spawn(async move {
                    if let Err(e) = handler_clone.handle_event(&envelope_clone).await {
                        error!(
                            event_id = %envelope_clone.event_id,
                            error = %e,
                            "Handler execution failed"
                        );
                    }
                });
            }
        });

        WebhookResponse::Ok { event_id }
    }
}

impl std::fmt::Debug for WebhookReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let handlers = self.handlers.try_read().map(|h| h.len()).ok();
        f.debug_struct("WebhookReceiver")
            .field("authenticator", &self.authenticator)
            .field("processor", &self.processor)
            .field("handlers", &handlers)
            .finish()
    }
}

#[cfg(test)]
#[path = "receiver_tests.rs"]
mod tests;
