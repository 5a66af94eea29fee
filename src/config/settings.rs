//! Gateway configuration
//!
//! Provides configuration loading from environment variables,
//! configuration files, and command-line overrides.

use serde::{Deserialize, Serialize};

// Helper functions for serde defaults
fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    15
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36".to_string()
}

fn default_cdn_hosts() -> Vec<String> {
    vec!["cdn401.savetube.vip".to_string()]
}

fn default_cdn_origin() -> String {
    "https://ytsave.savetube.me".to_string()
}

fn default_cdn_referer() -> String {
    "https://ytsave.savetube.me/".to_string()
}

fn default_innertube_base_url() -> String {
    "https://www.youtube.com/youtubei/v1".to_string()
}

fn default_web_base_url() -> String {
    "https://www.youtube.com".to_string()
}

fn default_search_limit() -> usize {
    10
}

fn default_max_search_limit() -> usize {
    50
}

fn default_mirror_template() -> Option<String> {
    Some("https://yewtu.be/latest_version?id={id}&itag={itag}".to_string())
}

fn default_max_video_qualities() -> usize {
    4
}

fn default_max_audio_qualities() -> usize {
    3
}

fn default_video_ladder() -> Vec<u32> {
    vec![144, 240, 360, 480, 720, 1080, 1440, 2160]
}

fn default_audio_ladder() -> Vec<u32> {
    vec![48, 64, 128, 192, 256, 320]
}

fn default_video_quality() -> u32 {
    360
}

fn default_audio_quality() -> u32 {
    128
}

fn default_attribution() -> String {
    "ytdl-gateway".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Main configuration settings for the gateway
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Server configuration
    #[serde(default)]
    pub server: ServerSettings,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Outbound network configuration
    #[serde(default)]
    pub network: NetworkSettings,
    /// CDN configuration
    #[serde(default)]
    pub cdn: CdnSettings,
    /// Search provider configuration
    #[serde(default)]
    pub search: SearchSettings,
    /// Direct-source fallback configuration
    #[serde(default)]
    pub direct: DirectSettings,
    /// Resolution pipeline configuration
    #[serde(default)]
    pub pipeline: PipelineSettings,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable verbose logging
    #[serde(default)]
    pub verbose: bool,
}

/// Network and proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// HTTPS proxy URL
    #[serde(default)]
    pub https_proxy: Option<String>,
    /// HTTP proxy URL
    #[serde(default)]
    pub http_proxy: Option<String>,
    /// All protocols proxy URL
    #[serde(default)]
    pub all_proxy: Option<String>,
    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    /// Per-call timeout in seconds for every upstream request
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// CDN configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdnSettings {
    /// Host pool; bare hostnames get an `https://` prefix
    #[serde(default = "default_cdn_hosts")]
    pub hosts: Vec<String>,
    /// Optional "pick a CDN for me" endpoint consulted before the local pool
    #[serde(default)]
    pub random_cdn_endpoint: Option<String>,
    /// AES-128 key for the info envelope, hex encoded
    #[serde(default)]
    pub decryption_key: Option<String>,
    /// Origin header sent to the CDN
    #[serde(default = "default_cdn_origin")]
    pub origin: String,
    /// Referer header sent to the CDN
    #[serde(default = "default_cdn_referer")]
    pub referer: String,
}

/// Search provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Innertube API base used by the primary provider
    #[serde(default = "default_innertube_base_url")]
    pub innertube_base_url: String,
    /// Site root scraped by the secondary provider
    #[serde(default = "default_web_base_url")]
    pub web_base_url: String,
    /// Whether the results-page scraper backs up the primary provider
    #[serde(default = "default_true")]
    pub enable_page_fallback: bool,
    /// Default result count for `/api/search`
    #[serde(default = "default_search_limit")]
    pub default_limit: usize,
    /// Upper bound for the `limit` parameter
    #[serde(default = "default_max_search_limit")]
    pub max_limit: usize,
}

/// Direct-source fallback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectSettings {
    /// Enable the direct extraction path
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Innertube API base used for player lookups
    #[serde(default = "default_innertube_base_url")]
    pub innertube_base_url: String,
    /// Last-resort mirror URL; `{id}` and `{itag}` are substituted
    #[serde(default = "default_mirror_template")]
    pub mirror_template: Option<String>,
}

/// Resolution pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Maximum number of video qualities resolved per request
    #[serde(default = "default_max_video_qualities")]
    pub max_video_qualities: usize,
    /// Maximum number of audio qualities resolved per request
    #[serde(default = "default_max_audio_qualities")]
    pub max_audio_qualities: usize,
    /// Candidate video heights used when CDN metadata is unavailable
    #[serde(default = "default_video_ladder")]
    pub synthetic_video_ladder: Vec<u32>,
    /// Candidate audio bitrates (kbps) used when CDN metadata is unavailable
    #[serde(default = "default_audio_ladder")]
    pub synthetic_audio_ladder: Vec<u32>,
    /// Default video quality for download/quick routes
    #[serde(default = "default_video_quality")]
    pub default_video_quality: u32,
    /// Default audio quality for download/quick routes
    #[serde(default = "default_audio_quality")]
    pub default_audio_quality: u32,
    /// Resolve qualities concurrently
    #[serde(default = "default_true")]
    pub concurrent: bool,
    /// Attribution text attached to every response
    #[serde(default = "default_attribution")]
    pub attribution: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enable_cors: default_true(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            verbose: false,
        }
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            https_proxy: None,
            http_proxy: None,
            all_proxy: None,
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for CdnSettings {
    fn default() -> Self {
        Self {
            hosts: default_cdn_hosts(),
            random_cdn_endpoint: None,
            decryption_key: None,
            origin: default_cdn_origin(),
            referer: default_cdn_referer(),
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            innertube_base_url: default_innertube_base_url(),
            web_base_url: default_web_base_url(),
            enable_page_fallback: default_true(),
            default_limit: default_search_limit(),
            max_limit: default_max_search_limit(),
        }
    }
}

impl Default for DirectSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            innertube_base_url: default_innertube_base_url(),
            mirror_template: default_mirror_template(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_video_qualities: default_max_video_qualities(),
            max_audio_qualities: default_max_audio_qualities(),
            synthetic_video_ladder: default_video_ladder(),
            synthetic_audio_ladder: default_audio_ladder(),
            default_video_quality: default_video_quality(),
            default_audio_quality: default_audio_quality(),
            concurrent: default_true(),
            attribution: default_attribution(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> crate::Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| crate::Error::config(name.to_string(), format!("Invalid value '{}': {}", value, e)))
}

impl Settings {
    /// Create new settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from environment variables on top of the defaults
    pub fn from_env() -> crate::Result<Self> {
        Self::default().merge_with_env()
    }

    /// Load settings from configuration file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config("file", &format!("Failed to read config file: {}", e))
        })?;

        let settings: Settings = toml::from_str(&content).map_err(|e| {
            crate::Error::config("file", &format!("Failed to parse config file: {}", e))
        })?;

        Ok(settings)
    }

    /// Override fields for every environment variable that is set
    pub fn merge_with_env(mut self) -> crate::Result<Self> {
        if let Ok(host) = std::env::var("HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("PORT") {
            self.server.port = parse_env("PORT", &port)?;
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(verbose) = std::env::var("VERBOSE") {
            self.logging.verbose = verbose.parse().unwrap_or(false);
        }

        if let Ok(proxy) = std::env::var("HTTPS_PROXY") {
            self.network.https_proxy = Some(proxy);
        }
        if let Ok(proxy) = std::env::var("HTTP_PROXY") {
            self.network.http_proxy = Some(proxy);
        }
        if let Ok(proxy) = std::env::var("ALL_PROXY") {
            self.network.all_proxy = Some(proxy);
        }
        if let Ok(timeout) = std::env::var("REQUEST_TIMEOUT") {
            self.network.request_timeout = parse_env("REQUEST_TIMEOUT", &timeout)?;
        }

        if let Ok(hosts) = std::env::var("CDN_HOSTS") {
            self.cdn.hosts = hosts
                .split(',')
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(String::from)
                .collect();
        }
        if let Ok(endpoint) = std::env::var("CDN_RANDOM_ENDPOINT") {
            self.cdn.random_cdn_endpoint = Some(endpoint).filter(|e| !e.is_empty());
        }
        if let Ok(key) = std::env::var("CDN_DECRYPTION_KEY") {
            self.cdn.decryption_key = Some(key.trim().to_string());
        }

        if let Ok(enabled) = std::env::var("DIRECT_FALLBACK") {
            self.direct.enabled = parse_env("DIRECT_FALLBACK", &enabled)?;
        }
        if let Ok(template) = std::env::var("MIRROR_TEMPLATE") {
            // An empty value switches mirror synthesis off
            self.direct.mirror_template = Some(template).filter(|t| !t.is_empty());
        }

        if let Ok(attribution) = std::env::var("ATTRIBUTION") {
            self.pipeline.attribution = attribution;
        }

        Ok(self)
    }

    /// Get effective proxy URL based on priority
    pub fn get_proxy_url(&self) -> Option<String> {
        self.network
            .https_proxy
            .as_ref()
            .or(self.network.http_proxy.as_ref())
            .or(self.network.all_proxy.as_ref())
            .cloned()
    }

    /// Decode the configured CDN key
    pub fn decryption_key(&self) -> crate::Result<[u8; 16]> {
        let hex_key = self.cdn.decryption_key.as_deref().ok_or_else(|| {
            crate::Error::config(
                "cdn.decryption_key",
                "no key configured (set CDN_DECRYPTION_KEY)",
            )
        })?;

        let bytes = hex::decode(hex_key).map_err(|e| {
            crate::Error::config("cdn.decryption_key".to_string(), format!("not valid hex: {}", e))
        })?;

        bytes.try_into().map_err(|b: Vec<u8>| {
            crate::Error::config(
                "cdn.decryption_key".to_string(),
                format!("expected 16 bytes, got {}", b.len()),
            )
        })
    }

    /// Validate configuration settings
    pub fn validate(&self) -> crate::Result<()> {
        if self.server.port == 0 {
            return Err(crate::Error::config(
                "port",
                "Invalid server port: cannot be 0",
            ));
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(crate::Error::config(
                    "log_level",
                    &format!("Invalid log level: {}", self.logging.level),
                ));
            }
        }

        for (name, proxy_url) in [
            ("https_proxy", &self.network.https_proxy),
            ("http_proxy", &self.network.http_proxy),
            ("all_proxy", &self.network.all_proxy),
        ]
        .iter()
        {
            if let Some(url_str) = proxy_url
                && let Err(e) = url::Url::parse(url_str)
            {
                return Err(crate::Error::config(
                    *name,
                    &format!("Invalid proxy URL '{}': {}", url_str, e),
                ));
            }
        }

        if self.network.request_timeout == 0 {
            return Err(crate::Error::config(
                "request_timeout",
                "Invalid request timeout: cannot be 0",
            ));
        }

        if self.cdn.hosts.is_empty() {
            return Err(crate::Error::config("cdn.hosts", "CDN host pool is empty"));
        }

        if self.cdn.decryption_key.is_some() {
            self.decryption_key()?;
        }

        if self.pipeline.max_video_qualities == 0 || self.pipeline.max_audio_qualities == 0 {
            return Err(crate::Error::config(
                "pipeline",
                "quality caps must be at least 1",
            ));
        }

        if self.pipeline.synthetic_video_ladder.is_empty()
            || self.pipeline.synthetic_audio_ladder.is_empty()
        {
            return Err(crate::Error::config(
                "pipeline",
                "synthetic quality ladders cannot be empty",
            ));
        }

        Ok(())
    }
}
