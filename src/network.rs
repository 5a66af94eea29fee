//! Outbound HTTP client configuration
//!
//! One `reqwest::Client` is built per process and shared by the CDN, search
//! and direct collaborators. Proxy, timeouts and user agent come from
//! [`NetworkSettings`](crate::config::NetworkSettings).

use crate::{Result, Settings};
use reqwest::{Client, Proxy};
use std::time::Duration;

/// Network manager holding the shared HTTP client
#[derive(Debug, Clone)]
pub struct NetworkManager {
    /// Base HTTP client
    client: Client,
    /// Per-call timeout, reported in timeout errors
    request_timeout_secs: u64,
}

impl NetworkManager {
    /// Create a network manager from settings
    pub fn new(settings: &Settings) -> Result<Self> {
        let network = &settings.network;
        let mut client_builder = Client::builder()
            .user_agent(network.user_agent.as_str())
            .timeout(Duration::from_secs(network.request_timeout))
            .connect_timeout(Duration::from_secs(network.connect_timeout));

        if let Some(proxy_url) = settings.get_proxy_url() {
            let proxy = Proxy::all(&proxy_url).map_err(|e| {
                crate::Error::config("network.proxy", &format!("Invalid proxy URL: {}", e))
            })?;
            tracing::debug!("Routing outbound requests through proxy {}", proxy_url);
            client_builder = client_builder.proxy(proxy);
        }

        let client = client_builder.build().map_err(|e| {
            crate::Error::internal(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            request_timeout_secs: network.request_timeout,
        })
    }

    /// Get the configured HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Per-call timeout in seconds
    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
    }
}
