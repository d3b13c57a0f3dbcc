//! # Platform API SDK
//!
//! Client SDK for the Platform API and its webhooks.
//!
//! This SDK provides:
//! - [`MessageAuthenticator`]: HMAC-SHA256 signing and constant-time
//!   verification of webhook payloads
//! - [`PlatformClient`]: authenticated access to the analytics, search,
//!   entitlement and webhook-management APIs, with retry of transient failures
//! - [`WebhookReceiver`]: signature-checked webhook intake that dispatches
//!   typed [`EventKind`]s to registered handlers
//! - [`SecretProvider`]: explicit injection of the API key and webhook secret
//!
//! # Examples
//!
//! ## Verifying a webhook
//!
//! ```rust
//! use platform_api_sdk::MessageAuthenticator;
//!
//! let authenticator = MessageAuthenticator::new("whsec_test123").unwrap();
//! let body = br#"{"type":"purchase.completed"}"#;
//!
//! assert!(authenticator.verify(
//!     body,
//!     "94655f089ba1437dd98593cda5a8512762099bc52b01ec01b7679a3dfb5bef2d"
//! ));
//! ```
//!
//! ## Calling the API
//!
//! ```rust,no_run
//! use platform_api_sdk::auth::{EnvSecretProvider};
//! use platform_api_sdk::client::{ClientConfig, PlatformClient, SearchRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = PlatformClient::from_provider(&EnvSecretProvider::new(), ClientConfig::default()).await?;
//!
//! let results = client
//!     .search_content(&SearchRequest::new("fitness workout").with_limit(10))
//!     .await?;
//! println!("{}", results.data);
//! # Ok(())
//! # }
//! ```

// Public modules
pub mod auth;
pub mod client;
pub mod error;
pub mod events;
pub mod webhook;

// Re-export commonly used types at crate root for convenience
pub use error::{ApiError, ConfigError, EventError, SecretError, ValidationError};

pub use auth::{ApiKey, EnvSecretProvider, SecretProvider, StaticSecretProvider, WebhookSecret};
pub use client::{ApiResponse, ClientConfig, PlatformClient, RetryPolicy};
pub use events::{EventEnvelope, EventId, EventKind, EventProcessor, ProcessorConfig};
pub use webhook::{
    LoggingHandler, MessageAuthenticator, WebhookHandler, WebhookReceiver, WebhookRequest,
    WebhookResponse,
};
