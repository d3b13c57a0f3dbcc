//! Webhook endpoint management operations.
//!
//! These register where the platform delivers webhooks. Verifying the
//! deliveries themselves is done by [`crate::webhook::MessageAuthenticator`].

use serde::{Deserialize, Serialize};
use url::Url;

use super::search::require_non_empty;
use super::{ApiResponse, PlatformClient};
use crate::error::{ApiError, ValidationError};

/// Delivery retry settings the platform applies to an endpoint.
///
/// The client only forwards these values; it never acts on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRetryPolicy {
    pub max_retries: u32,
    pub backoff_multiplier: u32,
    pub max_backoff_seconds: u32,
}

impl Default for WebhookRetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_multiplier: 2,
            max_backoff_seconds: 300,
        }
    }
}

/// Body of a `POST /webhooks/endpoints` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWebhookEndpointRequest {
    /// Delivery URL
    pub url: String,
    /// Event type strings to subscribe to
    pub events: Vec<String>,
    pub retry_policy: WebhookRetryPolicy,
}

impl CreateWebhookEndpointRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let parsed = Url::parse(&self.url).map_err(|e| ValidationError::InvalidFormat {
            field: "url".to_string(),
            message: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ValidationError::InvalidFormat {
                field: "url".to_string(),
                message: "scheme must be http or https".to_string(),
            });
        }
        if self.events.is_empty() {
            return Err(ValidationError::Required {
                field: "events".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TestWebhookRequest<'a> {
    event_type: &'a str,
    test_data: serde_json::Value,
}

impl PlatformClient {
    /// Register a webhook endpoint.
    ///
    /// `POST /webhooks/endpoints`. When `retry_policy` is `None` the default
    /// delivery policy (3 retries, multiplier 2, 300 s cap) is sent.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use platform_api_sdk::client::PlatformClient;
    /// # async fn example(client: &PlatformClient) -> Result<(), Box<dyn std::error::Error>> {
    /// let endpoint = client
    ///     .create_webhook_endpoint(
    ///         "https://your-app.com/webhooks",
    ///         &["purchase.completed", "content.uploaded"],
    ///         None,
    ///     )
    ///     .await?;
    /// println!("Webhook created: {}", endpoint.data["id"]);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_webhook_endpoint(
        &self,
        url: &str,
        events: &[&str],
        retry_policy: Option<WebhookRetryPolicy>,
    ) -> Result<ApiResponse, ApiError> {
        let request = CreateWebhookEndpointRequest {
            url: url.to_string(),
            events: events.iter().map(|e| e.to_string()).collect(),
            retry_policy: retry_policy.unwrap_or_default(),
        };
        request.validate()?;

        self.post(&["webhooks", "endpoints"], &request).await
    }

    /// List registered webhook endpoints.
    ///
    /// `GET /webhooks/endpoints`
    pub async fn get_webhook_endpoints(&self) -> Result<ApiResponse, ApiError> {
        self.get(&["webhooks", "endpoints"], &[]).await
    }

    /// Get one webhook endpoint.
    ///
    /// `GET /webhooks/endpoints/{id}`
    pub async fn get_webhook_endpoint(&self, endpoint_id: &str) -> Result<ApiResponse, ApiError> {
        require_non_empty("endpointId", endpoint_id)?;
        self.get(&["webhooks", "endpoints", endpoint_id], &[]).await
    }

    /// Apply a partial update to a webhook endpoint.
    ///
    /// `PUT /webhooks/endpoints/{id}`
    pub async fn update_webhook_endpoint(
        &self,
        endpoint_id: &str,
        updates: &serde_json::Value,
    ) -> Result<ApiResponse, ApiError> {
        require_non_empty("endpointId", endpoint_id)?;
        if !updates.is_object() {
            return Err(ValidationError::InvalidFormat {
                field: "updates".to_string(),
                message: "must be a JSON object".to_string(),
            }
            .into());
        }

        self.put(&["webhooks", "endpoints", endpoint_id], updates)
            .await
    }

    /// Delete a webhook endpoint.
    ///
    /// `DELETE /webhooks/endpoints/{id}`
    pub async fn delete_webhook_endpoint(
        &self,
        endpoint_id: &str,
    ) -> Result<ApiResponse, ApiError> {
        require_non_empty("endpointId", endpoint_id)?;
        self.delete(&["webhooks", "endpoints", endpoint_id]).await
    }

    /// Ask the platform to send a test delivery to an endpoint.
    ///
    /// `POST /webhooks/endpoints/{id}/test`
    pub async fn test_webhook_endpoint(
        &self,
        endpoint_id: &str,
        event_type: &str,
        test_data: Option<serde_json::Value>,
    ) -> Result<ApiResponse, ApiError> {
        require_non_empty("endpointId", endpoint_id)?;
        require_non_empty("eventType", event_type)?;

        let body = TestWebhookRequest {
            event_type,
            test_data: test_data.unwrap_or_else(|| serde_json::json!({})),
        };
        self.post(&["webhooks", "endpoints", endpoint_id, "test"], &body)
            .await
    }

    /// List the event types the platform can deliver.
    ///
    /// `GET /webhooks/events`
    pub async fn get_webhook_events(&self) -> Result<ApiResponse, ApiError> {
        self.get(&["webhooks", "events"], &[]).await
    }
}

#[cfg(test)]
#[path = "webhooks_tests.rs"]
mod tests;
