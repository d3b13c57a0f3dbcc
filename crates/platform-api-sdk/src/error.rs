//! Error types for Platform API SDK operations.
//!
//! This module defines all error types used throughout the SDK, with proper
//! classification for retry logic and enough context for debugging. Note that a
//! webhook signature that fails to verify is *not* an error: it is reported as
//! `false` by [`MessageAuthenticator::verify`](crate::webhook::MessageAuthenticator::verify).

use thiserror::Error;

/// Configuration errors raised while constructing SDK components.
///
/// These are fatal: retrying with the same configuration will fail the same way.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A secret was provided but contains no key material.
    #[error("Secret is empty: {name}")]
    EmptySecret { name: String },

    /// A secret could not be used as key material.
    #[error("Invalid secret {name}: {message}")]
    InvalidSecret { name: String, message: String },

    /// The API base URL could not be parsed.
    #[error("Invalid base URL '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },

    /// The underlying HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {message}")]
    HttpClient { message: String },

    /// Secret retrieval failed while building a component.
    #[error("Secret retrieval failed: {0}")]
    Secret(#[from] SecretError),
}

/// Errors during secret retrieval from secure storage.
///
/// These errors occur when reading secrets from environment variables or
/// another secret store.
#[derive(Debug, Error)]
pub enum SecretError {
    /// The requested secret was not found in the storage provider.
    #[error("Secret not found: {key}")]
    NotFound { key: String },

    /// The secret exists but has an invalid format.
    #[error("Invalid secret format: {key}")]
    InvalidFormat { key: String },
}

/// Errors during Platform API operations.
///
/// These errors represent failures when communicating with the remote API,
/// including HTTP errors, rate limiting, and parsing failures.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP error response from the API.
    #[error("API Error ({status}): {message}")]
    HttpError { status: u16, message: String },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded { retry_after_seconds: Option<u64> },

    /// Request to the API timed out.
    #[error("Request timeout")]
    Timeout,

    /// The request was rejected locally before being sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),

    /// API key was rejected (401).
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// API key lacks permission for the operation (403).
    #[error("Authorization failed: {message}")]
    AuthorizationFailed { message: String },

    /// The requested resource was not found (404).
    #[error("Resource not found: {message}")]
    NotFound { message: String },

    /// The response body was not valid JSON.
    #[error("Invalid JSON response (status {status}): {body}")]
    InvalidResponse { status: u16, body: String },

    /// Failed to map a JSON response onto the requested type.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// HTTP client error (network, TLS, etc.).
    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),
}

impl ApiError {
    /// Check if this error represents a transient condition that may succeed if retried.
    ///
    /// Transient conditions include:
    /// - Server errors (5xx)
    /// - Rate limiting (429)
    /// - Request timeouts
    /// - Network/transport errors
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpError { status, .. } => *status >= 500 || *status == 429,
            Self::RateLimitExceeded { .. } => true,
            Self::Timeout => true,
            Self::InvalidRequest(_) => false,
            Self::AuthenticationFailed { .. } => false,
            Self::AuthorizationFailed { .. } => false,
            Self::NotFound { .. } => false,
            Self::InvalidResponse { status, .. } => *status >= 500,
            Self::JsonError(_) => false,
            Self::HttpClientError(e) => !e.is_builder() && !e.is_decode(),
        }
    }

    /// Delay requested by the server via `Retry-After`, if any.
    ///
    /// Returns `None` to use the default exponential backoff policy.
    pub fn retry_after(&self) -> Option<std::time::Duration> {
        match self {
            Self::RateLimitExceeded {
                retry_after_seconds: Some(seconds),
            } => Some(std::time::Duration::from_secs(*seconds)),
            _ => None,
        }
    }

    /// HTTP status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpError { status, .. } => Some(*status),
            Self::RateLimitExceeded { .. } => Some(429),
            Self::AuthenticationFailed { .. } => Some(401),
            Self::AuthorizationFailed { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::InvalidResponse { status, .. } => Some(*status),
            Self::HttpClientError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Errors while turning a verified webhook body into an event.
#[derive(Debug, Error)]
pub enum EventError {
    /// Payload exceeded the configured size limit.
    #[error("Payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// Payload was not valid JSON.
    #[error("Invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Payload was JSON but not shaped like a webhook notification.
    #[error("Invalid webhook payload: {message}")]
    InvalidPayload { message: String },
}

/// Input validation errors.
///
/// These errors occur when validating user input before it is sent anywhere.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing.
    #[error("Required field missing: {field}")]
    Required { field: String },

    /// A field has an invalid format.
    #[error("Invalid format for {field}: {message}")]
    InvalidFormat { field: String, message: String },

    /// A field value is out of the acceptable range.
    #[error("Value out of range for {field}: {message}")]
    OutOfRange { field: String, message: String },
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
