//! SaveTube CDN client
//!
//! Two POST calls: `/v2/info` returns an encrypted metadata envelope for a
//! source URL, `/download` exchanges an (id, key, type, quality) tuple for a
//! download URL.

use super::{CdnProvider, HostSelector};
use crate::config::Settings;
use crate::types::{LinkSource, MediaType, ResolvedMetadata};
use crate::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

const SERVICE: &str = "cdn";

/// Quality or duration fields arrive as either numbers or strings
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    Text(String),
}

impl Loose {
    /// Leading digits as an integer: `"720p"` → 720, `128.0` → 128
    fn as_u32(&self) -> Option<u32> {
        match self {
            Loose::Number(n) if *n >= 0.0 => Some(*n as u32),
            Loose::Number(_) => None,
            Loose::Text(s) => {
                let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
                digits.parse().ok()
            }
        }
    }

    fn as_seconds(&self) -> Option<u64> {
        match self {
            Loose::Number(n) if *n >= 0.0 => Some(*n as u64),
            Loose::Number(_) => None,
            Loose::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FormatEntry {
    quality: Option<Loose>,
    height: Option<Loose>,
}

impl FormatEntry {
    fn numeric_quality(&self) -> Option<u32> {
        self.quality
            .as_ref()
            .and_then(Loose::as_u32)
            .or_else(|| self.height.as_ref().and_then(Loose::as_u32))
            .filter(|q| *q > 0)
    }
}

/// Plaintext of the info envelope
#[derive(Debug, Deserialize)]
struct InfoPayload {
    id: Option<String>,
    key: Option<String>,
    title: Option<String>,
    duration: Option<Loose>,
    thumbnail: Option<String>,
    #[serde(default)]
    video_formats: Vec<FormatEntry>,
    #[serde(default)]
    audio_formats: Vec<FormatEntry>,
}

fn qualities(entries: &[FormatEntry]) -> Vec<u32> {
    let mut out: Vec<u32> = entries.iter().filter_map(FormatEntry::numeric_quality).collect();
    out.sort_unstable_by(|a, b| b.cmp(a));
    out.dedup();
    out
}

impl InfoPayload {
    fn into_metadata(self) -> Result<ResolvedMetadata> {
        let internal_id = self
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::decryption("decrypted metadata has no id"))?;
        let decryption_key = self
            .key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::decryption("decrypted metadata has no key"))?;

        Ok(ResolvedMetadata {
            title: self.title.unwrap_or_else(|| "Unknown".to_string()),
            duration_seconds: self.duration.as_ref().and_then(Loose::as_seconds),
            thumbnail: self.thumbnail.filter(|t| !t.is_empty()),
            video_qualities: qualities(&self.video_formats),
            audio_qualities: qualities(&self.audio_formats),
            internal_id,
            decryption_key,
            source: LinkSource::Cdn,
        })
    }
}

/// `true`, `1` and `"true"` all count as success
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true") || s == "1",
        _ => false,
    }
}

/// CDN client speaking the SaveTube protocol
#[derive(Debug, Clone)]
pub struct SaveTubeClient {
    client: Client,
    hosts: HostSelector,
    key: Option<[u8; 16]>,
    origin: String,
    referer: String,
    timeout_secs: u64,
}

impl SaveTubeClient {
    /// Create a client from settings
    ///
    /// A missing key is not an error here; metadata calls report it instead.
    pub fn new(client: Client, settings: &Settings) -> Result<Self> {
        let key = match settings.cdn.decryption_key {
            Some(_) => Some(settings.decryption_key()?),
            None => None,
        };

        Ok(Self {
            client,
            hosts: HostSelector::new(
                &settings.cdn.hosts,
                settings.cdn.random_cdn_endpoint.clone(),
            ),
            key,
            origin: settings.cdn.origin.clone(),
            referer: settings.cdn.referer.clone(),
            timeout_secs: settings.network.request_timeout,
        })
    }

    /// Create a client pinned to one base URL (for testing)
    pub fn new_with_base_url(client: Client, base_url: String, key: Option<[u8; 16]>) -> Self {
        let defaults = Settings::default();
        Self {
            client,
            hosts: HostSelector::new(&[base_url], None),
            key,
            origin: defaults.cdn.origin,
            referer: defaults.cdn.referer,
            timeout_secs: defaults.network.request_timeout,
        }
    }

    async fn post(&self, host: &str, path: &str, body: &Value) -> Result<Value> {
        let url = format!("{}{}", host.trim_end_matches('/'), path);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .header("Origin", &self.origin)
            .header("Referer", &self.referer)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::from_transport(SERVICE, e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::upstream_status(SERVICE, status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Error::upstream(SERVICE.to_string(), format!("unreadable body: {}", e)))
    }
}

#[async_trait::async_trait]
impl CdnProvider for SaveTubeClient {
    async fn pick_host(&self) -> String {
        self.hosts.pick(&self.client).await
    }

    async fn fetch_metadata(&self, host: &str, source_url: &str) -> Result<ResolvedMetadata> {
        let key = self.key.ok_or_else(|| {
            Error::config(
                "cdn.decryption_key",
                "no key configured (set CDN_DECRYPTION_KEY)",
            )
        })?;

        let body = self.post(host, "/v2/info", &json!({ "url": source_url })).await?;

        if !is_truthy(body.get("status")) {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("info request rejected");
            return Err(Error::upstream(SERVICE, message));
        }

        let envelope = body
            .get("data")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::upstream(SERVICE, "info response has no data envelope"))?;

        let payload: InfoPayload = crate::crypto::unpack_envelope(envelope, &key)?;
        let metadata = payload.into_metadata()?;

        tracing::debug!(
            "CDN metadata for {}: {} video / {} audio qualities",
            source_url,
            metadata.video_qualities.len(),
            metadata.audio_qualities.len()
        );
        Ok(metadata)
    }

    async fn fetch_download_link(
        &self,
        host: &str,
        internal_id: &str,
        key: &str,
        media_type: MediaType,
        quality: u32,
    ) -> Result<String> {
        let request = json!({
            "id": internal_id,
            "key": key,
            "downloadType": media_type.as_str(),
            "quality": quality.to_string(),
        });

        let body = self.post(host, "/download", &request).await?;

        body.get("data")
            .and_then(|d| d.get("downloadUrl"))
            .and_then(Value::as_str)
            .filter(|u| !u.is_empty())
            .map(String::from)
            .ok_or_else(|| {
                Error::not_found_for(
                    format!("{} link", media_type.quality_label(quality)),
                    internal_id.to_string(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::tests::{TEST_KEY, seal};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_payload() -> Value {
        json!({
            "id": "cdn-internal-1",
            "key": "per-video-key",
            "title": "Barota",
            "duration": 212,
            "durationLabel": "03:32",
            "thumbnail": "https://i.ytimg.com/vi/abc/hq.jpg",
            "video_formats": [
                {"height": 360, "quality": 360, "label": "MP4 - 360p"},
                {"height": 720, "quality": "720", "label": "MP4 - 720p"},
                {"height": 144, "quality": 144, "label": "MP4 - 144p"}
            ],
            "audio_formats": [
                {"quality": 128, "label": "128K"},
                {"quality": "320", "label": "320K"}
            ]
        })
    }

    fn client_for(server: &MockServer) -> SaveTubeClient {
        SaveTubeClient::new_with_base_url(Client::new(), server.uri(), Some(TEST_KEY))
    }

    #[tokio::test]
    async fn test_fetch_metadata_decrypts_envelope() {
        let mock_server = MockServer::start().await;
        let envelope = seal(sample_payload().to_string().as_bytes(), &TEST_KEY, &[9u8; 16]);

        Mock::given(method("POST"))
            .and(path("/v2/info"))
            .and(header("origin", "https://ytsave.savetube.me"))
            .and(body_json(json!({"url": "https://www.youtube.com/watch?v=abcdefghijk"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": true, "data": envelope})),
            )
            .mount(&mock_server)
            .await;

        let metadata = client_for(&mock_server)
            .fetch_metadata(&mock_server.uri(), "https://www.youtube.com/watch?v=abcdefghijk")
            .await
            .unwrap();

        assert_eq!(metadata.internal_id, "cdn-internal-1");
        assert_eq!(metadata.decryption_key, "per-video-key");
        assert_eq!(metadata.title, "Barota");
        assert_eq!(metadata.duration_seconds, Some(212));
        assert_eq!(metadata.video_qualities, vec![720, 360, 144]);
        assert_eq!(metadata.audio_qualities, vec![320, 128]);
        assert_eq!(metadata.source, LinkSource::Cdn);
    }

    #[tokio::test]
    async fn test_fetch_metadata_status_false() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/info"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": false, "message": "Invalid URL"})),
            )
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server).fetch_metadata(&mock_server.uri(), "x").await.unwrap_err();
        assert_eq!(err.category(), "upstream_unavailable");
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[tokio::test]
    async fn test_fetch_metadata_corrupt_envelope() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/info"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": true, "data": "bm90IHJlYWxseQ=="})),
            )
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server).fetch_metadata(&mock_server.uri(), "x").await.unwrap_err();
        assert_eq!(err.category(), "decryption");
    }

    #[tokio::test]
    async fn test_fetch_metadata_server_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server).fetch_metadata(&mock_server.uri(), "x").await.unwrap_err();
        assert!(matches!(
            err,
            Error::UpstreamUnavailable {
                status: Some(503),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_fetch_metadata_without_key() {
        let mock_server = MockServer::start().await;
        let client = SaveTubeClient::new_with_base_url(Client::new(), mock_server.uri(), None);

        let err = client.fetch_metadata(&mock_server.uri(), "x").await.unwrap_err();
        assert_eq!(err.category(), "config");
        // Nothing was sent upstream
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_download_link() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/download"))
            .and(body_json(json!({
                "id": "cdn-internal-1",
                "key": "per-video-key",
                "downloadType": "video",
                "quality": "720"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": true,
                "data": {"downloadUrl": "https://dl.example/720.mp4"}
            })))
            .mount(&mock_server)
            .await;

        let url = client_for(&mock_server)
            .fetch_download_link(
                &mock_server.uri(),
                "cdn-internal-1",
                "per-video-key",
                MediaType::Video,
                720,
            )
            .await
            .unwrap();
        assert_eq!(url, "https://dl.example/720.mp4");
    }

    #[tokio::test]
    async fn test_fetch_download_link_missing_url() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/download"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": false, "data": {}})),
            )
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .fetch_download_link(&mock_server.uri(), "id", "key", MediaType::Audio, 320)
            .await
            .unwrap_err();
        assert_eq!(err.category(), "not_found");
    }

    #[tokio::test]
    async fn test_pick_host_is_the_only_picker_call() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/random-cdn"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"cdn": mock_server.uri()})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/download"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": true,
                "data": {"downloadUrl": "https://dl.example/any"}
            })))
            .expect(2)
            .mount(&mock_server)
            .await;

        let mut settings = Settings::default();
        settings.cdn.random_cdn_endpoint = Some(format!("{}/random-cdn", mock_server.uri()));
        let client = SaveTubeClient::new(Client::new(), &settings).unwrap();

        let host = client.pick_host().await;
        assert_eq!(host, mock_server.uri());
        for quality in [720, 360] {
            client
                .fetch_download_link(&host, "id", "key", MediaType::Video, quality)
                .await
                .unwrap();
        }
    }

    #[test]
    fn test_loose_quality_parsing() {
        assert_eq!(Loose::Text("720p".to_string()).as_u32(), Some(720));
        assert_eq!(Loose::Number(128.0).as_u32(), Some(128));
        assert_eq!(Loose::Text("auto".to_string()).as_u32(), None);
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy(Some(&json!(true))));
        assert!(is_truthy(Some(&json!(1))));
        assert!(is_truthy(Some(&json!("true"))));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(!is_truthy(None));
    }
}
