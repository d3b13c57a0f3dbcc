//! Common test utilities for the webhook service integration tests
//!
//! This module provides:
//! - A handler that records every event it receives
//! - Helpers for running the service on an ephemeral port
//! - Signing helpers for test payloads

use platform_api_sdk::auth::StaticSecretProvider;
use platform_api_sdk::{EventEnvelope, MessageAuthenticator, WebhookHandler};
use platform_webhook_service::{build_receiver, create_router, AppState, ServiceConfig};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::time::{sleep, Duration};

pub const SECRET: &str = "whsec_test123";

// ============================================================================
// Recording Handler
// ============================================================================

/// Handler that stores every envelope it is given
#[derive(Clone, Default)]
pub struct RecordingHandler {
    events: Arc<Mutex<Vec<EventEnvelope>>>,
    delay: Option<Duration>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            events: Arc::default(),
            delay: Some(delay),
        }
    }

    pub fn events(&self) -> Vec<EventEnvelope> {
        self.events.lock().unwrap().clone()
    }

    /// Poll until `count` events have arrived or two seconds pass.
    #[allow(dead_code)]
    pub async fn wait_for(&self, count: usize) -> Vec<EventEnvelope> {
        for _ in 0..200 {
            if self.events.lock().unwrap().len() >= count {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        self.events()
    }
}

#[async_trait::async_trait]
impl WebhookHandler for RecordingHandler {
    async fn handle_event(
        &self,
        envelope: &EventEnvelope,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(delay) = self.delay {
            sleep(delay).await;
        }
        self.events.lock().unwrap().push(envelope.clone());
        Ok(())
    }
}

// ============================================================================
// Service helpers
// ============================================================================

/// Configuration with the shared test secret.
#[allow(dead_code)]
pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config.webhooks.secret = Some(SECRET.to_string());
    config
}

/// A running service.
pub struct TestService {
    pub address: SocketAddr,
    #[allow(dead_code)]
    pub state: AppState,
}

impl TestService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.address, path)
    }
}

/// Start the service on an ephemeral port with `handlers` registered.
pub async fn spawn_service(
    config: ServiceConfig,
    handlers: Vec<Arc<dyn WebhookHandler>>,
) -> TestService {
    let receiver = build_receiver(&config, &StaticSecretProvider::new())
        .await
        .unwrap();
    for handler in handlers {
        receiver.add_handler(handler).await;
    }
    let state = AppState::new(config, receiver);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let app = create_router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestService { address, state }
}

/// Sign `payload` with `secret`.
pub fn sign(secret: &str, payload: &[u8]) -> String {
    MessageAuthenticator::new(secret).unwrap().sign(payload)
}
