//! Search provider adapter
//!
//! Results come back in provider relevance order; callers treat index 0 as
//! "the" result for single-result flows.

pub mod innertube;
pub mod page;
pub mod parse;

pub use innertube::InnertubeSearch;
pub use page::PageSearch;

use crate::Result;
use crate::types::SearchResult;

/// Free-text search, behind a trait so the pipeline can be tested with mocks
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Up to `limit` results for `query`; an empty list is not an error here
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>>;

    /// Provider name for logs
    fn name(&self) -> &'static str {
        "search"
    }
}

/// Primary provider with an optional secondary tried once on failure or no hits
#[derive(Debug, Clone)]
pub struct FallbackSearch<P, S> {
    primary: P,
    secondary: Option<S>,
}

/// Production search stack
pub type DefaultSearch = FallbackSearch<InnertubeSearch, PageSearch>;

impl<P, S> FallbackSearch<P, S>
where
    P: SearchProvider,
    S: SearchProvider,
{
    pub fn new(primary: P, secondary: Option<S>) -> Self {
        Self { primary, secondary }
    }
}

impl DefaultSearch {
    /// Build the production stack from settings
    pub fn from_settings(client: reqwest::Client, settings: &crate::Settings) -> Self {
        let timeout = settings.network.request_timeout;
        let primary = InnertubeSearch::new_with_base_url(
            client.clone(),
            settings.search.innertube_base_url.clone(),
            timeout,
        );
        let secondary = settings
            .search
            .enable_page_fallback
            .then(|| PageSearch::new(client, settings.search.web_base_url.clone(), timeout));
        Self::new(primary, secondary)
    }
}

#[async_trait::async_trait]
impl<P, S> SearchProvider for FallbackSearch<P, S>
where
    P: SearchProvider,
    S: SearchProvider,
{
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let primary = self.primary.search(query, limit).await;

        let Some(secondary) = &self.secondary else {
            return primary;
        };

        match primary {
            Ok(results) if !results.is_empty() => Ok(results),
            Ok(_) => {
                tracing::info!(
                    "{} returned no results for {:?}, trying {}",
                    self.primary.name(),
                    query,
                    secondary.name()
                );
                match secondary.search(query, limit).await {
                    Ok(results) => Ok(results),
                    Err(secondary_err) => {
                        tracing::warn!("{} search failed: {}", secondary.name(), secondary_err);
                        Ok(Vec::new())
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    "{} search failed ({}), trying {}",
                    self.primary.name(),
                    e.category(),
                    secondary.name()
                );
                match secondary.search(query, limit).await {
                    Ok(results) => Ok(results),
                    Err(secondary_err) => {
                        tracing::warn!("{} search failed too: {}", secondary.name(), secondary_err);
                        Err(e)
                    }
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        self.primary.name()
    }
}
