//! Content search operations.

use serde::{Deserialize, Serialize};

use super::{ApiResponse, PlatformClient};
use crate::error::{ApiError, ValidationError};

/// Search strategy used by the search service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// Combined keyword and semantic ranking
    #[default]
    Hybrid,
    /// Embedding similarity only
    Semantic,
    /// Keyword matching only
    Keyword,
}

impl std::str::FromStr for SearchType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hybrid" => Ok(Self::Hybrid),
            "semantic" => Ok(Self::Semantic),
            "keyword" => Ok(Self::Keyword),
            other => Err(ValidationError::InvalidFormat {
                field: "type".to_string(),
                message: format!("unknown search type '{}'", other),
            }),
        }
    }
}

/// Body of a `POST /search/content` request.
///
/// # Examples
///
/// ```
/// use platform_api_sdk::client::{SearchRequest, SearchType};
/// use serde_json::json;
///
/// let request = SearchRequest::new("fitness workout")
///     .with_filters(json!({"category": "fitness", "minDuration": 300}))
///     .with_limit(10);
///
/// assert_eq!(request.search_type, SearchType::Hybrid);
/// assert_eq!(request.page, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Query text
    pub q: String,
    /// Search strategy
    #[serde(rename = "type")]
    pub search_type: SearchType,
    /// Free-form filters (category, duration, ...)
    pub filters: serde_json::Value,
    pub page: u32,
    pub limit: u32,
    /// Whether to include per-item metadata in results
    pub include_metadata: bool,
}

impl SearchRequest {
    /// Create a hybrid search for `query` with default paging and no filters.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            q: query.into(),
            search_type: SearchType::Hybrid,
            filters: serde_json::Value::Object(serde_json::Map::new()),
            page: 1,
            limit: 20,
            include_metadata: false,
        }
    }

    pub fn with_type(mut self, search_type: SearchType) -> Self {
        self.search_type = search_type;
        self
    }

    pub fn with_filters(mut self, filters: serde_json::Value) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_metadata(mut self, include_metadata: bool) -> Self {
        self.include_metadata = include_metadata;
        self
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.q.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "q".to_string(),
            });
        }
        if !self.filters.is_object() {
            return Err(ValidationError::InvalidFormat {
                field: "filters".to_string(),
                message: "must be a JSON object".to_string(),
            });
        }
        Ok(())
    }
}

impl PlatformClient {
    /// Search content.
    ///
    /// `POST /search/content`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` without sending anything if the query
    /// is blank or the filters are not a JSON object.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use platform_api_sdk::client::{PlatformClient, SearchRequest};
    /// # async fn example(client: &PlatformClient) -> Result<(), Box<dyn std::error::Error>> {
    /// let results = client.search_content(&SearchRequest::new("yoga").with_limit(5)).await?;
    /// println!("{}", results.data["results"]);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn search_content(&self, request: &SearchRequest) -> Result<ApiResponse, ApiError> {
        request.validate()?;
        self.post(&["search", "content"], request).await
    }

    /// Get query completions.
    ///
    /// `GET /search/suggestions?q=`
    pub async fn get_search_suggestions(&self, query: &str) -> Result<ApiResponse, ApiError> {
        self.get(&["search", "suggestions"], &[("q", query.to_string())])
            .await
    }

    /// Find content similar to `content_id` above a similarity `threshold`.
    ///
    /// `GET /search/content/{id}/similar?limit=&threshold=`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` if `content_id` is empty or
    /// `threshold` is outside `0.0..=1.0`.
    pub async fn find_similar_content(
        &self,
        content_id: &str,
        limit: u32,
        threshold: f64,
    ) -> Result<ApiResponse, ApiError> {
        require_non_empty("contentId", content_id)?;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ValidationError::OutOfRange {
                field: "threshold".to_string(),
                message: format!("{} is not between 0 and 1", threshold),
            }
            .into());
        }

        self.get(
            &["search", "content", content_id, "similar"],
            &[
                ("limit", limit.to_string()),
                ("threshold", threshold.to_string()),
            ],
        )
        .await
    }

    /// Get trending content for a period.
    ///
    /// `GET /search/trending?period=&limit=`
    pub async fn get_trending_content(
        &self,
        period: &str,
        limit: u32,
    ) -> Result<ApiResponse, ApiError> {
        self.get(
            &["search", "trending"],
            &[("period", period.to_string()), ("limit", limit.to_string())],
        )
        .await
    }
}

/// Reject empty identifiers before they reach a URL path.
pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
