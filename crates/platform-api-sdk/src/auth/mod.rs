//! Credential types and secret retrieval.
//!
//! This module provides the two pieces of key material the SDK handles:
//! - [`ApiKey`] - bearer credential sent on every API request
//! - [`WebhookSecret`] - shared secret used to sign and verify webhook payloads
//!
//! Both are held in zeroizing buffers, refuse to be constructed empty, and
//! never print their contents through `Debug`.
//!
//! Secrets are resolved through the [`SecretProvider`] trait so that callers can
//! inject them explicitly (dependency injection) rather than reading ambient
//! global configuration. [`EnvSecretProvider`] reads them from environment
//! variables; [`StaticSecretProvider`] wraps values the caller already holds.
//!
//! # Examples
//!
//! ```rust
//! use platform_api_sdk::auth::{ApiKey, WebhookSecret};
//!
//! let key = ApiKey::new("pk_live_123").unwrap();
//! assert_eq!(format!("{:?}", key), "ApiKey(<REDACTED>)");
//!
//! assert!(WebhookSecret::new("").is_err());
//! ```

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::error::{ConfigError, SecretError};

/// Environment variable holding the API key for [`EnvSecretProvider`].
pub const DEFAULT_API_KEY_VAR: &str = "PLATFORM_API_KEY";

/// Environment variable holding the webhook secret for [`EnvSecretProvider`].
pub const DEFAULT_WEBHOOK_SECRET_VAR: &str = "PLATFORM_WEBHOOK_SECRET";

// ============================================================================
// API Key
// ============================================================================

/// Bearer credential for the Platform API.
#[derive(Clone)]
pub struct ApiKey(Zeroizing<String>);

impl ApiKey {
    /// Create an API key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptySecret` if the key is empty or whitespace.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = Zeroizing::new(key.into());
        if key.trim().is_empty() {
            return Err(ConfigError::EmptySecret {
                name: "api_key".to_string(),
            });
        }
        Ok(Self(key))
    }

    /// Get the raw key for building the `Authorization` header.
    ///
    /// # Security Warning
    ///
    /// Use immediately; do not log or store the returned value.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<REDACTED>)")
    }
}

// ============================================================================
// Webhook Secret
// ============================================================================

/// Shared secret used as the HMAC key for webhook signatures.
///
/// The secret is treated as opaque bytes. A string secret is keyed by its
/// UTF-8 encoding.
#[derive(Clone)]
pub struct WebhookSecret(Zeroizing<Vec<u8>>);

impl WebhookSecret {
    /// Create a webhook secret from a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptySecret` if the secret is empty.
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = Zeroizing::new(secret.into());
        Self::from_bytes(secret.as_bytes().to_vec())
    }

    /// Create a webhook secret from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptySecret` if `bytes` is empty.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ConfigError> {
        let bytes = Zeroizing::new(bytes);
        if bytes.is_empty() {
            return Err(ConfigError::EmptySecret {
                name: "webhook_secret".to_string(),
            });
        }
        Ok(Self(bytes))
    }

    /// Get the key material.
    pub fn expose_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the key material in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`: empty secrets cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookSecret(<REDACTED>)")
    }
}

// ============================================================================
// Secret Providers
// ============================================================================

/// Interface for retrieving credentials from a secret store.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Get the API key used for outbound requests.
    async fn get_api_key(&self) -> Result<ApiKey, SecretError>;

    /// Get the secret used to verify inbound webhooks.
    async fn get_webhook_secret(&self) -> Result<WebhookSecret, SecretError>;
}

/// Reads credentials from environment variables.
///
/// Variables are read at call time, so the provider can be constructed before
/// the environment is fully populated.
#[derive(Debug, Clone)]
pub struct EnvSecretProvider {
    api_key_var: String,
    webhook_secret_var: String,
}

impl EnvSecretProvider {
    /// Create a provider reading `PLATFORM_API_KEY` and `PLATFORM_WEBHOOK_SECRET`.
    pub fn new() -> Self {
        Self {
            api_key_var: DEFAULT_API_KEY_VAR.to_string(),
            webhook_secret_var: DEFAULT_WEBHOOK_SECRET_VAR.to_string(),
        }
    }

    /// Override the variable holding the API key.
    pub fn with_api_key_var(mut self, name: impl Into<String>) -> Self {
        self.api_key_var = name.into();
        self
    }

    /// Override the variable holding the webhook secret.
    pub fn with_webhook_secret_var(mut self, name: impl Into<String>) -> Self {
        self.webhook_secret_var = name.into();
        self
    }

    fn read(&self, name: &str) -> Result<Zeroizing<String>, SecretError> {
        match std::env::var(name) {
            Ok(value) if !value.is_empty() => Ok(Zeroizing::new(value)),
            Ok(_) => Err(SecretError::NotFound {
                key: name.to_string(),
            }),
            Err(std::env::VarError::NotPresent) => Err(SecretError::NotFound {
                key: name.to_string(),
            }),
            Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::InvalidFormat {
                key: name.to_string(),
            }),
        }
    }
}

impl Default for EnvSecretProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    async fn get_api_key(&self) -> Result<ApiKey, SecretError> {
        let value = self.read(&self.api_key_var)?;
        ApiKey::new(value.as_str()).map_err(|_| SecretError::InvalidFormat {
            key: self.api_key_var.clone(),
        })
    }

    async fn get_webhook_secret(&self) -> Result<WebhookSecret, SecretError> {
        let value = self.read(&self.webhook_secret_var)?;
        WebhookSecret::new(value.as_str()).map_err(|_| SecretError::InvalidFormat {
            key: self.webhook_secret_var.clone(),
        })
    }
}

/// Serves credentials the caller already holds.
///
/// Useful for tests and for multi-tenant setups where each tenant's secrets
/// are loaded elsewhere.
#[derive(Debug, Clone, Default)]
pub struct StaticSecretProvider {
    api_key: Option<ApiKey>,
    webhook_secret: Option<WebhookSecret>,
}

impl StaticSecretProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key to serve.
    pub fn with_api_key(mut self, api_key: ApiKey) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Set the webhook secret to serve.
    pub fn with_webhook_secret(mut self, secret: WebhookSecret) -> Self {
        self.webhook_secret = Some(secret);
        self
    }
}

#[async_trait]
impl SecretProvider for StaticSecretProvider {
    async fn get_api_key(&self) -> Result<ApiKey, SecretError> {
        self.api_key.clone().ok_or_else(|| SecretError::NotFound {
            key: "api_key".to_string(),
        })
    }

    async fn get_webhook_secret(&self) -> Result<WebhookSecret, SecretError> {
        self.webhook_secret
            .clone()
            .ok_or_else(|| SecretError::NotFound {
                key: "webhook_secret".to_string(),
            })
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
