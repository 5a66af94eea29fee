//! Primary search provider: Innertube `search` endpoint

use super::SearchProvider;
use super::parse::collect_results;
use crate::types::SearchResult;
use crate::{Error, Result};
use reqwest::Client;
use serde_json::json;

const SERVICE: &str = "search";

/// Restricts results to videos
const VIDEOS_ONLY_PARAMS: &str = "EgIQAQ==";

/// Innertube search client
#[derive(Debug, Clone)]
pub struct InnertubeSearch {
    /// HTTP client
    client: Client,
    /// Base URL for Innertube API
    base_url: String,
    timeout_secs: u64,
}

impl InnertubeSearch {
    /// Create new Innertube search client
    pub fn new(client: Client, timeout_secs: u64) -> Self {
        Self::new_with_base_url(
            client,
            "https://www.youtube.com/youtubei/v1".to_string(),
            timeout_secs,
        )
    }

    /// Create new Innertube search client with custom base URL (for testing)
    pub fn new_with_base_url(client: Client, base_url: String, timeout_secs: u64) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
        }
    }
}

#[async_trait::async_trait]
impl SearchProvider for InnertubeSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let request_body = json!({
            "context": {
                "client": {
                    "clientName": "WEB",
                    "clientVersion": "2.20240822.03.00",
                    "hl": "en",
                    "gl": "US"
                }
            },
            "query": query,
            "params": VIDEOS_ONLY_PARAMS
        });

        let response = self
            .client
            .post(format!("{}/search?prettyPrint=false", self.base_url))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Failed to send request to Innertube search: {}", e);
                Error::from_transport(SERVICE, e, self.timeout_secs)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!("Innertube search returned error status: {}", status);
            return Err(Error::upstream_status(SERVICE, status.as_u16()));
        }

        let json_response: serde_json::Value = response.json().await.map_err(|e| {
            tracing::warn!("Failed to parse Innertube search response: {}", e);
            Error::upstream(SERVICE.to_string(), format!("Failed to parse JSON response: {}", e))
        })?;

        let results = collect_results(&json_response, limit);
        tracing::debug!("Innertube search for {:?} returned {} results", query, results.len());
        Ok(results)
    }

    fn name(&self) -> &'static str {
        "innertube"
    }
}
