//! CDN host selection
//!
//! A remote "pick a CDN for me" endpoint is consulted first when configured;
//! otherwise (or when it fails) a host is drawn at random from the local pool.

use rand::seq::IndexedRandom;
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RandomCdnResponse {
    cdn: Option<String>,
}

/// Picks the base URL for each CDN call
#[derive(Debug, Clone)]
pub struct HostSelector {
    /// Normalized base URLs, never empty
    pool: Vec<String>,
    random_endpoint: Option<String>,
}

impl HostSelector {
    /// Create a selector; an empty pool falls back to the canonical host
    pub fn new(hosts: &[String], random_endpoint: Option<String>) -> Self {
        let mut pool: Vec<String> = hosts
            .iter()
            .map(|h| h.trim())
            .filter(|h| !h.is_empty())
            .map(normalize_host)
            .collect();
        if pool.is_empty() {
            pool.push(normalize_host("cdn401.savetube.vip"));
        }

        Self {
            pool,
            random_endpoint: random_endpoint.filter(|e| !e.trim().is_empty()),
        }
    }

    /// Hosts in the local pool
    pub fn pool(&self) -> &[String] {
        &self.pool
    }

    /// Pick a base URL for the next call
    ///
    /// ```
    /// use ytdl_gateway::cdn::HostSelector;
    ///
    /// # tokio_test::block_on(async {
    /// let selector = HostSelector::new(&["cdn1.example".to_string()], None);
    /// let host = selector.pick(&reqwest::Client::new()).await;
    /// assert_eq!(host, "https://cdn1.example");
    /// # });
    /// ```
    pub async fn pick(&self, client: &Client) -> String {
        if let Some(endpoint) = &self.random_endpoint {
            match self.ask_remote(client, endpoint).await {
                Some(host) => {
                    tracing::debug!("Remote CDN picker chose {}", host);
                    return host;
                }
                None => tracing::warn!("Remote CDN picker failed, using local pool"),
            }
        }
        self.pick_local()
    }

    /// Random draw from the local pool
    pub fn pick_local(&self) -> String {
        self.pool
            .choose(&mut rand::rng())
            .cloned()
            .unwrap_or_else(|| normalize_host("cdn401.savetube.vip"))
    }

    async fn ask_remote(&self, client: &Client, endpoint: &str) -> Option<String> {
        let response = client.get(endpoint).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let body: RandomCdnResponse = response.json().await.ok()?;
        body.cdn
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .map(|h| normalize_host(&h))
    }
}

/// Turn `cdn401.example` into `https://cdn401.example`; strip trailing slashes
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("cdn401.savetube.vip"), "https://cdn401.savetube.vip");
        assert_eq!(normalize_host("http://127.0.0.1:9000/"), "http://127.0.0.1:9000");
        assert_eq!(normalize_host(" https://a.example "), "https://a.example");
    }

    #[test]
    fn test_empty_pool_uses_canonical_host() {
        let selector = HostSelector::new(&[" ".to_string()], None);
        assert_eq!(selector.pool(), ["https://cdn401.savetube.vip"]);
    }

    #[test]
    fn test_pick_local_stays_in_pool() {
        let hosts = vec!["a.example".to_string(), "b.example".to_string()];
        let selector = HostSelector::new(&hosts, None);

        for _ in 0..20 {
            let picked = selector.pick_local();
            assert!(selector.pool().contains(&picked));
        }
    }

    #[tokio::test]
    async fn test_remote_picker_preferred() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/random-cdn"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cdn": "cdn9.example"})))
            .mount(&mock_server)
            .await;

        let selector = HostSelector::new(
            &["a.example".to_string()],
            Some(format!("{}/api/random-cdn", mock_server.uri())),
        );

        let picked = selector.pick(&Client::new()).await;
        assert_eq!(picked, "https://cdn9.example");
    }

    #[tokio::test]
    async fn test_remote_picker_failure_falls_back() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let selector = HostSelector::new(
            &["a.example".to_string()],
            Some(format!("{}/api/random-cdn", mock_server.uri())),
        );

        let picked = selector.pick(&Client::new()).await;
        assert_eq!(picked, "https://a.example");
    }
}
