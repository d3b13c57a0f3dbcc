//! Entitlement operations.

use serde::{Deserialize, Serialize};

use super::search::require_non_empty;
use super::{ApiResponse, PlatformClient};
use crate::error::{ApiError, ValidationError};

/// Kind of access being checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    #[default]
    View,
    Stream,
    Download,
}

impl std::str::FromStr for AccessType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Self::View),
            "stream" => Ok(Self::Stream),
            "download" => Ok(Self::Download),
            other => Err(ValidationError::InvalidFormat {
                field: "accessType".to_string(),
                message: format!("unknown access type '{}'", other),
            }),
        }
    }
}

/// A single entitlement question: may `user_id` access `content_id` this way?
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementCheck {
    pub user_id: String,
    pub content_id: String,
    pub access_type: AccessType,
}

impl EntitlementCheck {
    pub fn new(
        user_id: impl Into<String>,
        content_id: impl Into<String>,
        access_type: AccessType,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            content_id: content_id.into(),
            access_type,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("userId", &self.user_id)?;
        require_non_empty("contentId", &self.content_id)
    }
}

#[derive(Serialize)]
struct BulkVerifyRequest<'a> {
    requests: &'a [EntitlementCheck],
}

impl PlatformClient {
    /// Verify whether a user may access a piece of content.
    ///
    /// `POST /entitlements/verify`
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use platform_api_sdk::client::{AccessType, PlatformClient};
    /// # async fn example(client: &PlatformClient) -> Result<(), Box<dyn std::error::Error>> {
    /// let result = client
    ///     .verify_entitlement("user-uuid", "content-uuid", AccessType::Stream)
    ///     .await?;
    /// println!("Has access: {}", result.data["hasAccess"]);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn verify_entitlement(
        &self,
        user_id: &str,
        content_id: &str,
        access_type: AccessType,
    ) -> Result<ApiResponse, ApiError> {
        let check = EntitlementCheck::new(user_id, content_id, access_type);
        check.validate()?;
        self.post(&["entitlements", "verify"], &check).await
    }

    /// Verify many entitlements in one request.
    ///
    /// `POST /entitlements/verify/bulk`
    pub async fn bulk_verify_entitlements(
        &self,
        requests: &[EntitlementCheck],
    ) -> Result<ApiResponse, ApiError> {
        if requests.is_empty() {
            return Err(ValidationError::Required {
                field: "requests".to_string(),
            }
            .into());
        }
        for check in requests {
            check.validate()?;
        }

        self.post(
            &["entitlements", "verify", "bulk"],
            &BulkVerifyRequest { requests },
        )
        .await
    }

    /// List a user's entitlements filtered by status (e.g. `active`).
    ///
    /// `GET /entitlements/user/{id}?page=&limit=&status=`
    pub async fn get_user_entitlements(
        &self,
        user_id: &str,
        page: u32,
        limit: u32,
        status: &str,
    ) -> Result<ApiResponse, ApiError> {
        require_non_empty("userId", user_id)?;
        self.get(
            &["entitlements", "user", user_id],
            &[
                ("page", page.to_string()),
                ("limit", limit.to_string()),
                ("status", status.to_string()),
            ],
        )
        .await
    }

    /// Get entitlement statistics for a piece of content.
    ///
    /// `GET /entitlements/content/{id}/stats`
    pub async fn get_content_stats(&self, content_id: &str) -> Result<ApiResponse, ApiError> {
        require_non_empty("contentId", content_id)?;
        self.get(&["entitlements", "content", content_id, "stats"], &[])
            .await
    }
}

#[cfg(test)]
#[path = "entitlements_tests.rs"]
mod tests;
