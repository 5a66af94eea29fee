//! Secondary search provider: scrapes the public results page

use super::SearchProvider;
use super::parse::{collect_results, extract_initial_data};
use crate::types::SearchResult;
use crate::{Error, Result};
use reqwest::Client;

const SERVICE: &str = "search";

/// Results-page scraper
#[derive(Debug, Clone)]
pub struct PageSearch {
    client: Client,
    base_url: String,
    timeout_secs: u64,
}

impl PageSearch {
    pub fn new(client: Client, base_url: String, timeout_secs: u64) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
        }
    }
}

#[async_trait::async_trait]
impl SearchProvider for PageSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let response = self
            .client
            .get(format!("{}/results", self.base_url))
            .query(&[("search_query", query)])
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| Error::from_transport(SERVICE, e, self.timeout_secs))?;

        if !response.status().is_success() {
            return Err(Error::upstream_status(SERVICE, response.status().as_u16()));
        }

        let html = response.text().await.map_err(|e| {
            Error::upstream(SERVICE.to_string(), format!("unreadable results page: {}", e))
        })?;

        let data = extract_initial_data(&html)?;
        Ok(collect_results(&data, limit))
    }

    fn name(&self) -> &'static str {
        "results-page"
    }
}
