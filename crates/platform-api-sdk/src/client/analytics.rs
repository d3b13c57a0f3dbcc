//! Analytics operations.

use super::{ApiResponse, PlatformClient};
use crate::error::ApiError;

impl PlatformClient {
    /// Get the analytics overview for a reporting period such as `24h` or `7d`.
    ///
    /// `GET /analytics/overview?period=`
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use platform_api_sdk::client::PlatformClient;
    /// # async fn example(client: &PlatformClient) -> Result<(), Box<dyn std::error::Error>> {
    /// let overview = client.get_analytics_overview("7d").await?;
    /// println!("Revenue: {}", overview.data["revenue"]);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_analytics_overview(&self, period: &str) -> Result<ApiResponse, ApiError> {
        self.get(
            &["analytics", "overview"],
            &[("period", period.to_string())],
        )
        .await
    }

    /// Get revenue metrics, optionally bounded by ISO dates.
    ///
    /// `GET /analytics/revenue[?startDate=&endDate=]`
    pub async fn get_revenue_metrics(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<ApiResponse, ApiError> {
        let mut query = Vec::new();
        if let Some(start) = start_date {
            query.push(("startDate", start.to_string()));
        }
        if let Some(end) = end_date {
            query.push(("endDate", end.to_string()));
        }

        self.get(&["analytics", "revenue"], &query).await
    }

    /// Get per-content performance metrics, paginated.
    ///
    /// `GET /analytics/content/performance?page=&limit=`
    pub async fn get_content_performance(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<ApiResponse, ApiError> {
        self.get(
            &["analytics", "content", "performance"],
            &[("page", page.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    /// Get user engagement metrics for a reporting period.
    ///
    /// `GET /analytics/users/engagement?period=`
    pub async fn get_user_engagement(&self, period: &str) -> Result<ApiResponse, ApiError> {
        self.get(
            &["analytics", "users", "engagement"],
            &[("period", period.to_string())],
        )
        .await
    }

    /// Get payout metrics, paginated.
    ///
    /// `GET /analytics/payouts?page=&limit=`
    pub async fn get_payout_metrics(&self, page: u32, limit: u32) -> Result<ApiResponse, ApiError> {
        self.get(
            &["analytics", "payouts"],
            &[("page", page.to_string()), ("limit", limit.to_string())],
        )
        .await
    }
}

#[cfg(test)]
#[path = "analytics_tests.rs"]
mod tests;
