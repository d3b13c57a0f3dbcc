//! Tests for the HTTP layer of the webhook service.

use super::*;
use recording::RecordingHandler;
use axum::{body::Body, http::Request};
use platform_api_sdk::auth::StaticSecretProvider;
use platform_api_sdk::webhook::SIGNATURE_HEADER;
use std::collections::HashMap;
use std::time::Duration;
use tower::ServiceExt;

const SECRET: &str = "whsec_test123";
const PURCHASE_SIGNATURE: &str = "94655f089ba1437dd98593cda5a8512762099bc52b01ec01b7679a3dfb5bef2d";

mod recording {
    use platform_api_sdk::{EventEnvelope, EventKind, WebhookHandler};
    use std::sync::{Arc, Mutex};

    /// Records the kinds of all events it is given.
    #[derive(Default, Clone)]
    pub struct RecordingHandler {
        pub seen: Arc<Mutex<Vec<EventKind>>>,
    }

    #[async_trait::async_trait]
    impl WebhookHandler for RecordingHandler {
        async fn handle_event(
            &self,
            envelope: &EventEnvelope,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.seen.lock().unwrap().push(envelope.kind.clone());
            Ok(())
        }
    }
}

fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.webhooks.secret = Some(SECRET.to_string());
    config
}

async fn test_state(config: ServiceConfig) -> AppState {
    let receiver = build_receiver(&config, &StaticSecretProvider::new())
        .await
        .unwrap();
    AppState::new(config, receiver)
}

fn webhook_request(path: &str, body: &'static str, signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header(SIGNATURE_HEADER, signature);
    }
    builder.body(Body::from(body)).unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// Receiver construction
// ============================================================================

#[tokio::test]
async fn test_build_receiver_prefers_configured_secret() {
    let provider = StaticSecretProvider::new()
        .with_webhook_secret(WebhookSecret::new("whsec_other").unwrap());

    let receiver = build_receiver(&test_config(), &provider).await.unwrap();

    let mut headers = HashMap::new();
    headers.insert(SIGNATURE_HEADER.to_string(), PURCHASE_SIGNATURE.to_string());
    let response = receiver
        .receive_webhook(WebhookRequest::new(
            headers,
            Bytes::from_static(br#"{"type":"purchase.completed"}"#),
        ))
        .await;
    assert!(response.is_success());
}

#[tokio::test]
async fn test_build_receiver_falls_back_to_provider() {
    let provider =
        StaticSecretProvider::new().with_webhook_secret(WebhookSecret::new(SECRET).unwrap());

    let result = build_receiver(&ServiceConfig::default(), &provider).await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_build_receiver_without_secret_fails() {
    let err = build_receiver(&ServiceConfig::default(), &StaticSecretProvider::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Authenticator(_)));
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_build_receiver_with_empty_secret_fails() {
    let mut config = ServiceConfig::default();
    config.webhooks.secret = Some(String::new());

    let err = build_receiver(&config, &StaticSecretProvider::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Authenticator(_)));
}

// ============================================================================
// Webhook endpoint
// ============================================================================

#[tokio::test]
async fn test_valid_webhook_returns_received() {
    let app = create_router(test_state(test_config()).await);

    let response = app
        .oneshot(webhook_request(
            "/webhooks",
            r#"{"type":"purchase.completed"}"#,
            Some(PURCHASE_SIGNATURE),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["received"], true);
    assert!(body["eventId"].is_string());
}

#[tokio::test]
async fn test_delivery_id_header_becomes_event_id() {
    let app = create_router(test_state(test_config()).await);
    let mut request = webhook_request(
        "/webhooks",
        r#"{"type":"purchase.completed"}"#,
        Some(PURCHASE_SIGNATURE),
    );
    request
        .headers_mut()
        .insert("X-Webhook-Id", "dlv_42".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(json_body(response).await["eventId"], "dlv_42");
}

#[tokio::test]
async fn test_missing_signature_is_unauthorized() {
    let app = create_router(test_state(test_config()).await);

    let response = app
        .oneshot(webhook_request(
            "/webhooks",
            r#"{"type":"purchase.completed"}"#,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "Invalid signature");
}

#[tokio::test]
async fn test_wrong_signature_is_unauthorized() {
    let app = create_router(test_state(test_config()).await);

    let response = app
        .oneshot(webhook_request(
            "/webhooks",
            r#"{"type":"purchase.completed"}"#,
            Some(&"0".repeat(64)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_repeated_signature_header_is_unauthorized() {
    let app = create_router(test_state(test_config()).await);
    let request = Request::builder()
        .method("POST")
        .uri("/webhooks")
        .header(SIGNATURE_HEADER, PURCHASE_SIGNATURE)
        .header(SIGNATURE_HEADER, PURCHASE_SIGNATURE)
        .body(Body::from(r#"{"type":"purchase.completed"}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_authenticated_invalid_payload_is_bad_request() {
    let state = test_state(test_config()).await;
    let body = "not json";
    let signature = MessageAuthenticator::new(SECRET)
        .unwrap()
        .sign(body.as_bytes());
    let app = create_router(state);

    let response = app
        .oneshot(webhook_request("/webhooks", body, Some(&signature)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = json_body(response).await["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Invalid webhook payload"));
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let mut config = test_config();
    config.server.max_body_size = 16;
    let app = create_router(test_state(config).await);

    let response = app
        .oneshot(webhook_request(
            "/webhooks",
            r#"{"type":"purchase.completed"}"#,
            Some(PURCHASE_SIGNATURE),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_custom_webhook_path() {
    let mut config = test_config();
    config.webhooks.path = "/hooks/platform".to_string();
    let state = test_state(config).await;

    let on_custom = create_router(state.clone())
        .oneshot(webhook_request(
            "/hooks/platform",
            r#"{"type":"purchase.completed"}"#,
            Some(PURCHASE_SIGNATURE),
        ))
        .await
        .unwrap();
    let on_default = create_router(state)
        .oneshot(webhook_request(
            "/webhooks",
            r#"{"type":"purchase.completed"}"#,
            Some(PURCHASE_SIGNATURE),
        ))
        .await
        .unwrap();

    assert_eq!(on_custom.status(), StatusCode::OK);
    assert_eq!(on_default.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_webhook_endpoint_rejects_get() {
    let app = create_router(test_state(test_config()).await);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/webhooks")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_registered_handler_receives_event() {
    let state = test_state(test_config()).await;
    let handler = RecordingHandler::default();
    state.receiver.add_handler(Arc::new(handler.clone())).await;
    let app = create_router(state);

    let response = app
        .oneshot(webhook_request(
            "/webhooks",
            r#"{"type":"purchase.completed"}"#,
            Some(PURCHASE_SIGNATURE),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    for _ in 0..100 {
        if !handler.seen.lock().unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(
        handler.seen.lock().unwrap().as_slice(),
        &[platform_api_sdk::EventKind::PurchaseCompleted]
    );
}

// ============================================================================
// Health endpoint
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let state = test_state(test_config()).await;
    state
        .receiver
        .add_handler(Arc::new(platform_api_sdk::LoggingHandler::new()))
        .await;
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["handlers"], 1);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_bind_failure_reports_exit_code() {
    let blocker = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = blocker.local_addr().unwrap().port();
    let mut config = test_config();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = port;

    let err = start_server(test_state(config).await).await.unwrap_err();

    assert!(matches!(err, ServiceError::BindFailed { .. }));
    assert_eq!(err.exit_code(), 1);
}
