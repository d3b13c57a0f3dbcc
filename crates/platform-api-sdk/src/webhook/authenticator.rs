//! Webhook message authentication.
//!
//! Provides HMAC-SHA256 signing and constant-time verification of webhook
//! payloads. The signature is the lowercase hex encoding of
//! `HMAC-SHA256(secret, raw_body)`, carried in the `X-Webhook-Signature`
//! header without any prefix.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::auth::{SecretProvider, WebhookSecret};
use crate::error::ConfigError;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// Length of a hex-encoded HMAC-SHA256 signature.
pub const SIGNATURE_HEX_LEN: usize = 64;

/// Signs and verifies webhook payloads with a shared secret.
///
/// The authenticator is keyed once at construction and is immutable
/// afterwards. It holds no other state, so a single instance can be shared
/// across threads and tasks without locking (it is `Send + Sync + Clone`).
///
/// # Security
///
/// - Verification compares the full signature in constant time
/// - Verification always operates on the raw body bytes, never a re-encoded form
/// - The key never appears in `Debug` output or logs
/// - An empty secret is rejected at construction
///
/// # Examples
///
/// ```rust
/// use platform_api_sdk::webhook::MessageAuthenticator;
///
/// let authenticator = MessageAuthenticator::new("whsec_test123").unwrap();
///
/// let payload = br#"{"type":"purchase.completed"}"#;
/// let signature = authenticator.sign(payload);
///
/// assert_eq!(signature.len(), 64);
/// assert!(authenticator.verify(payload, &signature));
/// assert!(!authenticator.verify(payload, ""));
/// ```
#[derive(Clone)]
pub struct MessageAuthenticator {
    mac: HmacSha256,
}

impl MessageAuthenticator {
    /// Create an authenticator keyed by `secret`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptySecret` if `secret` is empty.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, ConfigError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(ConfigError::EmptySecret {
                name: "webhook_secret".to_string(),
            });
        }

        let mac = HmacSha256::new_from_slice(secret).map_err(|e| ConfigError::InvalidSecret {
            name: "webhook_secret".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self { mac })
    }

    /// Create an authenticator from an already validated [`WebhookSecret`].
    pub fn from_secret(secret: &WebhookSecret) -> Result<Self, ConfigError> {
        Self::new(secret.expose_bytes())
    }

    /// Create an authenticator from the webhook secret held by `provider`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Secret` if the provider has no secret configured.
    pub async fn from_provider(provider: &dyn SecretProvider) -> Result<Self, ConfigError> {
        let secret = provider.get_webhook_secret().await?;
        Self::from_secret(&secret)
    }

    /// Compute the signature of `payload`.
    ///
    /// Returns the lowercase hex encoding of the HMAC-SHA256 tag. The output is
    /// always [`SIGNATURE_HEX_LEN`] characters regardless of payload length.
    pub fn sign(&self, payload: &[u8]) -> String {
        let mut mac = self.mac.clone();
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Check `candidate_signature` against the signature of `payload`.
    ///
    /// Returns `true` only when the candidate is exactly the lowercase hex
    /// signature of `payload`. Any other input, including empty, truncated,
    /// over-long, upper-case or non-hex strings, yields `false`. This method
    /// never fails.
    pub fn verify(&self, payload: &[u8], candidate_signature: &str) -> bool {
        let expected = self.sign(payload);
        constant_time_eq(expected.as_bytes(), candidate_signature.as_bytes())
    }
}

/// Compare a signature against a candidate without short-circuiting.
///
/// The comparison always walks the full expected signature. A candidate of the
/// wrong length is padded or truncated into a fixed buffer first and the length
/// check is folded into the result, so neither the position of the first
/// differing byte nor the candidate length changes the amount of work done.
fn constant_time_eq(expected: &[u8], candidate: &[u8]) -> bool {
    debug_assert_eq!(expected.len(), SIGNATURE_HEX_LEN);

    let mut padded = [0u8; SIGNATURE_HEX_LEN];
    let copied = candidate.len().min(SIGNATURE_HEX_LEN);
    padded[..copied].copy_from_slice(&candidate[..copied]);

    let length_matches = (candidate.len() as u64).ct_eq(&(expected.len() as u64));
    let content_matches = expected.ct_eq(&padded[..expected.len()]);

    (length_matches & content_matches).into()
}

// Security: Don't expose key material in debug output
impl std::fmt::Debug for MessageAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageAuthenticator")
            .field("algorithm", &"HMAC-SHA256")
            .field("key", &"<REDACTED>")
            .finish()
    }
}

#[cfg(test)]
#[path = "authenticator_tests.rs"]
mod tests;
