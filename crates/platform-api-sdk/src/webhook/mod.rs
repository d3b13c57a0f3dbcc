//! Platform webhook authentication and processing.
//!
//! # Core Components
//!
//! - [`MessageAuthenticator`] - HMAC-SHA256 signing and constant-time verification
//! - [`WebhookReceiver`] - HTTP webhook intake with verification and async dispatch
//! - [`WebhookHandler`] - Trait for application-provided event processing logic
//! - [`WebhookRequest`]/[`WebhookResponse`] - HTTP request/response types
//!
//! # Wire Contract
//!
//! The sender computes `HMAC-SHA256(secret, raw_body)`, hex-encodes it in
//! lowercase (64 characters, no prefix), and sends it in the
//! `X-Webhook-Signature` header. Receivers must verify over the exact bytes
//! received, before any JSON parsing.
//!
//! # HTTP Server Integration (Axum Example)
//!
//! ```rust,ignore
//! use platform_api_sdk::webhook::{WebhookReceiver, WebhookRequest};
//! use axum::{extract::State, http::{HeaderMap, StatusCode}, response::IntoResponse, Json};
//! use bytes::Bytes;
//! use std::sync::Arc;
//!
//! async fn handle_webhook(
//!     State(receiver): State<Arc<WebhookReceiver>>,
//!     headers: HeaderMap,
//!     body: Bytes,
//! ) -> impl IntoResponse {
//!     let header_map = headers
//!         .iter()
//!         .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
//!         .collect();
//!
//!     let response = receiver.receive_webhook(WebhookRequest::new(header_map, body)).await;
//!     let status = StatusCode::from_u16(response.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
//!     (status, Json(response.body()))
//! }
//! ```

pub mod authenticator;
pub mod handler;
pub mod receiver;

// Re-export main types
pub use authenticator::{MessageAuthenticator, SIGNATURE_HEADER, SIGNATURE_HEX_LEN};
pub use handler::{LoggingHandler, WebhookHandler};
pub use receiver::{WebhookReceiver, WebhookRequest, WebhookResponse, DELIVERY_ID_HEADER};
