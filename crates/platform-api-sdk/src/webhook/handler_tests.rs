//! Tests for WebhookHandler trait and LoggingHandler.

use super::*;
use crate::events::EventId;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;

// ============================================================================
// Mock Handler for Testing
// ============================================================================

#[derive(Clone)]
struct MockHandler {
    calls: Arc<Mutex<Vec<EventId>>>,
    should_fail: bool,
}

impl MockHandler {
    fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            should_fail: false,
        }
    }

    fn new_failing() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            should_fail: true,
        }
    }
}

#[async_trait]
impl WebhookHandler for MockHandler {
    async fn handle_event(
        &self,
        envelope: &EventEnvelope,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.calls.lock().await.push(envelope.event_id.clone());

        if self.should_fail {
            Err("Handler intentionally failed".into())
        } else {
            Ok(())
        }
    }
}

fn envelope(kind: EventKind, data: serde_json::Value) -> EventEnvelope {
    EventEnvelope::new(EventId::from("evt_test"), kind, data)
}

// ============================================================================
// Trait Tests
// ============================================================================

#[tokio::test]
async fn test_handler_receives_envelope() {
    let handler = MockHandler::new();
    let envelope = envelope(EventKind::PurchaseCompleted, json!({}));

    handler.handle_event(&envelope).await.unwrap();

    let calls = handler.calls.lock().await;
    assert_eq!(calls.as_slice(), &[EventId::from("evt_test")]);
}

#[tokio::test]
async fn test_handler_error_is_returned() {
    let handler = MockHandler::new_failing();
    let envelope = envelope(EventKind::PayoutProcessed, json!({}));

    let result = handler.handle_event(&envelope).await;

    assert!(result.is_err());
    assert_eq!(handler.calls.lock().await.len(), 1);
}

#[tokio::test]
async fn test_handler_usable_as_trait_object() {
    let handlers: Vec<Arc<dyn WebhookHandler>> =
        vec![Arc::new(MockHandler::new()), Arc::new(LoggingHandler::new())];
    let envelope = envelope(EventKind::ContentUploaded, json!({}));

    for handler in handlers {
        assert!(handler.handle_event(&envelope).await.is_ok());
    }
}

// ============================================================================
// LoggingHandler Tests
// ============================================================================

#[test]
fn test_describe_purchase() {
    let envelope = envelope(
        EventKind::PurchaseCompleted,
        json!({"purchaseId": "pur_1", "amount": 1999, "currency": "USD"}),
    );

    assert_eq!(
        LoggingHandler::describe(&envelope),
        "Purchase completed: pur_1 (1999 USD)"
    );
}

#[test]
fn test_describe_content_upload() {
    let envelope = envelope(
        EventKind::ContentUploaded,
        json!({"contentId": "cnt_9", "creatorId": "usr_3"}),
    );

    assert_eq!(
        LoggingHandler::describe(&envelope),
        "Content uploaded: cnt_9 by usr_3"
    );
}

#[test]
fn test_describe_payout_with_missing_fields() {
    let envelope = envelope(EventKind::PayoutProcessed, json!(null));

    assert_eq!(
        LoggingHandler::describe(&envelope),
        "Payout processed: - (- -)"
    );
}

#[test]
fn test_describe_unknown_kind() {
    let envelope = envelope(EventKind::Unknown("refund.issued".to_string()), json!({}));

    assert_eq!(
        LoggingHandler::describe(&envelope),
        "Unhandled event type: refund.issued"
    );
}

#[tokio::test]
async fn test_logging_handler_never_fails() {
    let handler = LoggingHandler::new();
    let kinds = [
        EventKind::PurchaseCompleted,
        EventKind::ContentUploaded,
        EventKind::PayoutProcessed,
        EventKind::Unknown("x".to_string()),
    ];

    for kind in kinds {
        assert!(handler.handle_event(&envelope(kind, json!({}))).await.is_ok());
    }
}
