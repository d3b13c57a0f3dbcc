//! Platform API client for authenticated operations.
//!
//! [`PlatformClient`] wraps a `reqwest` client, attaches the bearer API key and
//! a correlation ID to every request, maps error responses onto [`ApiError`],
//! and retries transient failures according to its [`RetryPolicy`].
//!
//! Operations are grouped by API area in submodules:
//! - `analytics` - overview, revenue, content performance, engagement, payouts
//! - `search` - content search, suggestions, similar and trending content
//! - `entitlements` - access verification and statistics
//! - `webhooks` - webhook endpoint management

mod analytics;
mod entitlements;
mod retry;
mod search;
mod webhooks;

use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::auth::{ApiKey, SecretProvider};
use crate::error::{ApiError, ConfigError};

pub use entitlements::{AccessType, EntitlementCheck};
pub use retry::RetryPolicy;
pub use search::{SearchRequest, SearchType};
pub use webhooks::{CreateWebhookEndpointRequest, WebhookRetryPolicy};

/// Default Platform API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.platform.com/v1";

/// Header carrying the per-request correlation ID.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Configuration for Platform API client behavior.
///
/// # Examples
///
/// ```
/// use platform_api_sdk::client::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(60))
///     .with_max_retries(5);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, including any version prefix
    pub base_url: String,
    /// User agent string for API requests
    pub user_agent: String,
    /// Request timeout duration
    pub timeout: Duration,
    /// Retry behavior for transient failures
    pub retry_policy: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: format!("platform-api-sdk/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for client configuration.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Set the API base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry_policy.max_retries = max_retries;
        self
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }
}

/// Builder for constructing `ClientConfig` instances.
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new configuration builder with defaults.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Set the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the maximum number of retries.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.retry_policy.max_retries = max_retries;
        self
    }

    /// Replace the retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.config.retry_policy = policy;
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Successful API response envelope.
///
/// The API wraps results as `{"data": ..., "meta": ...}`. `data` is `null`
/// (or `T::default()`) when the response carries none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T = serde_json::Value> {
    /// Response payload
    #[serde(default)]
    pub data: T,

    /// Pagination and other response metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

/// Platform API client.
///
/// # Examples
///
/// ```no_run
/// # use platform_api_sdk::auth::ApiKey;
/// # use platform_api_sdk::client::{ClientConfig, PlatformClient};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = PlatformClient::new(ApiKey::new("pk_live_123")?, ClientConfig::default())?;
///
/// let overview = client.get_analytics_overview("7d").await?;
/// println!("Analytics overview: {}", overview.data);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PlatformClient {
    api_key: ApiKey,
    http_client: reqwest::Client,
    base_url: Url,
    config: ClientConfig,
}

impl PlatformClient {
    /// Create a client with the given API key and configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` if the base URL is not an absolute
    /// `http`/`https` URL, or `ConfigError::HttpClient` if the HTTP client cannot
    /// be created.
    pub fn new(api_key: ApiKey, config: ClientConfig) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(&config.base_url)?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ConfigError::HttpClient {
                message: e.to_string(),
            })?;

        Ok(Self {
            api_key,
            http_client,
            base_url,
            config,
        })
    }

    /// Create a client whose API key comes from `provider`.
    pub async fn from_provider(
        provider: &dyn SecretProvider,
        config: ClientConfig,
    ) -> Result<Self, ConfigError> {
        let api_key = provider.get_api_key().await?;
        Self::new(api_key, config)
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the full URL for a sequence of path segments.
    ///
    /// Each segment is percent-encoded, so caller-supplied IDs can never
    /// change the shape of the path.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub(crate) async fn get<T: DeserializeOwned + Default>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(Method::GET, segments, query, None::<&()>).await
    }

    pub(crate) async fn post<T: DeserializeOwned + Default>(
        &self,
        segments: &[&str],
        body: &impl Serialize,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(Method::POST, segments, &[], Some(body)).await
    }

    pub(crate) async fn put<T: DeserializeOwned + Default>(
        &self,
        segments: &[&str],
        body: &impl Serialize,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(Method::PUT, segments, &[], Some(body)).await
    }

    pub(crate) async fn delete<T: DeserializeOwned + Default>(
        &self,
        segments: &[&str],
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(Method::DELETE, segments, &[], None::<&()>).await
    }

    /// Send a request, retrying transient failures per the retry policy.
    ///
    /// Only idempotent methods are retried. A POST is sent exactly once, so a
    /// failure that reached the server can never register a resource twice.
    async fn request<T: DeserializeOwned + Default, B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<ApiResponse<T>, ApiError> {
        let url = self.endpoint(segments);
        let policy = &self.config.retry_policy;
        let retryable = is_idempotent(&method);
        let mut attempt = 0;

        loop {
            match self.send_once(method.clone(), &url, query, body).await {
                Ok(value) => return Ok(serde_json::from_value(value)?),
                Err(e) if retryable && e.is_transient() && policy.should_retry(attempt) => {
                    attempt += 1;
                    let delay = e
                        .retry_after()
                        .map(|requested| requested.min(policy.max_delay))
                        .unwrap_or_else(|| policy.calculate_delay(attempt));
                    warn!(
                        method = %method,
                        path = url.path(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient API failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &Url,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<serde_json::Value, ApiError> {
        let correlation_id = correlation_id();
        debug!(method = %method, path = url.path(), correlation_id = %correlation_id, "Sending API request");

        let mut request = self
            .http_client
            .request(method, url.clone())
            .bearer_auth(self.api_key.expose())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(CORRELATION_ID_HEADER, &correlation_id);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::HttpClientError(e)
            }
        })?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let text = response.text().await?;

        let value: serde_json::Value = serde_json::from_str(&text)
            .map_err(|_| ApiError::InvalidResponse { status, body: text })?;

        if (200..300).contains(&status) {
            return Ok(value);
        }

        Err(map_error_status(status, &value, retry_after))
    }
}

impl std::fmt::Debug for PlatformClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformClient")
            .field("base_url", &self.base_url.as_str())
            .field("config", &self.config)
            .field("api_key", &self.api_key)
            .finish()
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |message: &str| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        message: message.to_string(),
    };

    let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be used as a base"));
    }
    Ok(url)
}

fn is_idempotent(method: &Method) -> bool {
    [Method::GET, Method::PUT, Method::DELETE].contains(method)
}

/// Correlation ID of the form `rust-xxxxxxxx`.
pub(crate) fn correlation_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("rust-{}", &id[..8])
}

/// Map a non-2xx JSON response to an error.
///
/// The message is taken from `error.message` in the body when present.
fn map_error_status(status: u16, body: &serde_json::Value, retry_after: Option<u64>) -> ApiError {
    let message = body
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .unwrap_or("Unknown error")
        .to_string();

    match status {
        401 => ApiError::AuthenticationFailed { message },
        403 => ApiError::AuthorizationFailed { message },
        404 => ApiError::NotFound { message },
        429 => ApiError::RateLimitExceeded {
            retry_after_seconds: retry_after,
        },
        _ => ApiError::HttpError { status, message },
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
