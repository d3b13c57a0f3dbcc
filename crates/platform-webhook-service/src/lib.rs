//! # Platform Webhook Service
//!
//! HTTP server that receives Platform webhooks, authenticates them with the
//! shared secret and dispatches the parsed events to registered handlers.
//!
//! This service provides:
//! - `POST {webhooks.path}`: signature-checked webhook intake
//! - `GET /health`: liveness check

pub mod config;
pub mod errors;
pub mod responses;

pub use config::{load_config, LoggingConfig, ServerConfig, ServiceConfig, WebhookConfig};
pub use errors::{ConfigError, ServiceError};
pub use responses::HealthResponse;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use platform_api_sdk::{
    auth::{EnvSecretProvider, SecretProvider, WebhookSecret},
    EventProcessor, MessageAuthenticator, ProcessorConfig, WebhookReceiver, WebhookRequest,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{info, instrument};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub receiver: Arc<WebhookReceiver>,
}

impl AppState {
    pub fn new(config: ServiceConfig, receiver: WebhookReceiver) -> Self {
        Self {
            config: Arc::new(config),
            receiver: Arc::new(receiver),
        }
    }
}

/// Build the webhook receiver described by `config`.
///
/// The signing secret comes from `webhooks.secret` when present, otherwise
/// from `provider`. A missing or empty secret is a configuration error.
pub async fn build_receiver(
    config: &ServiceConfig,
    provider: &dyn SecretProvider,
) -> Result<WebhookReceiver, ServiceError> {
    let authenticator = match &config.webhooks.secret {
        Some(secret) => {
            let secret = WebhookSecret::new(secret.clone()).map_err(ServiceError::Authenticator)?;
            MessageAuthenticator::from_secret(&secret)
        }
        None => MessageAuthenticator::from_provider(provider).await,
    }
    .map_err(ServiceError::Authenticator)?;

    let processor = EventProcessor::new(ProcessorConfig {
        max_payload_size: config.webhooks.max_payload_size,
    });

    Ok(WebhookReceiver::new(authenticator, processor))
}

/// [`build_receiver`] with the secret fallback read from `PLATFORM_WEBHOOK_SECRET`.
pub async fn build_receiver_from_env(config: &ServiceConfig) -> Result<WebhookReceiver, ServiceError> {
    build_receiver(config, &EnvSecretProvider::new()).await
}

// ============================================================================
// Router and Server
// ============================================================================

/// Create the HTTP router
pub fn create_router(state: AppState) -> Router {
    let max_body_size = state.config.server.max_body_size;

    Router::new()
        .route(&state.config.webhooks.path, post(handle_webhook))
        .route("/health", get(handle_health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(max_body_size)),
        )
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl+C or SIGTERM.
pub async fn start_server(state: AppState) -> Result<(), ServiceError> {
    let address = state.config.server.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| ServiceError::BindFailed {
            address: address.clone(),
            message: e.to_string(),
        })?;

    info!(
        address = %address,
        path = %state.config.webhooks.path,
        "Starting HTTP server"
    );

    let app = create_router(state);

    // In-flight requests complete before the server returns.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServiceError::ServerFailed {
            message: e.to_string(),
        })?;

    info!("HTTP server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Handle an incoming webhook delivery.
///
/// The response is produced as soon as the event is authenticated and parsed;
/// handlers run in the background.
#[instrument(skip(state, headers, body), fields(body_len = body.len()))]
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<serde_json::Value>) {
    let header_pairs = headers.iter().filter_map(|(k, v)| {
        v.to_str()
            .ok()
            .map(|v| (k.as_str().to_string(), v.to_string()))
    });

    let response = state
        .receiver
        .receive_webhook(WebhookRequest::from_header_pairs(header_pairs, body))
        .await;

    let status =
        StatusCode::from_u16(response.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response.body()))
}

async fn handle_health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.receiver.handler_count().await))
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
