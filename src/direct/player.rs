//! Innertube `player` client
//!
//! Client identities are tried in order until one reports the video playable.
//! ANDROID_VR returns direct URLs without signature ciphers; WEB_EMBEDDED_PLAYER
//! covers some content ANDROID_VR refuses. Formats that only carry a
//! `signatureCipher` are skipped.

use super::{DirectProvider, StreamFormat, StreamManifest};
use crate::{Error, Result};
use reqwest::Client;
use serde_json::{Value, json};

const SERVICE: &str = "direct";

/// Standard audio bitrates reported for adaptive audio streams
const NOMINAL_AUDIO_KBPS: [u32; 8] = [48, 64, 96, 128, 160, 192, 256, 320];

struct ClientIdentity {
    name: &'static str,
    context: Value,
    user_agent: &'static str,
}

fn identities() -> [ClientIdentity; 2] {
    [
        ClientIdentity {
            name: "ANDROID_VR",
            context: json!({
                "client": {
                    "clientName": "ANDROID_VR",
                    "clientVersion": "1.71.26",
                    "androidSdkVersion": 32,
                    "deviceMake": "Oculus",
                    "deviceModel": "Quest 3",
                    "hl": "en",
                    "gl": "US"
                }
            }),
            user_agent: "com.google.android.apps.youtube.vr.oculus/1.71.26 \
                (Linux; U; Android 12L; eureka-user Build/SQ3A.220605.009.A1) gzip",
        },
        ClientIdentity {
            name: "WEB_EMBEDDED",
            context: json!({
                "client": {
                    "clientName": "WEB_EMBEDDED_PLAYER",
                    "clientVersion": "1.20260115.01.00",
                    "hl": "en",
                    "gl": "US"
                },
                "thirdParty": {
                    "embedUrl": "https://www.youtube.com/"
                }
            }),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
        },
    ]
}

/// Innertube player client
#[derive(Debug, Clone)]
pub struct InnertubePlayerClient {
    /// HTTP client
    client: Client,
    /// Base URL for Innertube API
    base_url: String,
    timeout_secs: u64,
}

impl InnertubePlayerClient {
    /// Create new player client
    pub fn new(client: Client, timeout_secs: u64) -> Self {
        Self::new_with_base_url(
            client,
            "https://www.youtube.com/youtubei/v1".to_string(),
            timeout_secs,
        )
    }

    /// Create new player client with custom base URL (for testing)
    pub fn new_with_base_url(client: Client, base_url: String, timeout_secs: u64) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
        }
    }

    async fn try_identity(&self, video_id: &str, identity: &ClientIdentity) -> Result<StreamManifest> {
        let payload = json!({
            "context": identity.context,
            "videoId": video_id,
            "contentCheckOk": true,
            "racyCheckOk": true
        });

        let response = self
            .client
            .post(format!("{}/player?prettyPrint=false", self.base_url))
            .header("User-Agent", identity.user_agent)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::from_transport(SERVICE, e, self.timeout_secs))?;

        if !response.status().is_success() {
            return Err(Error::upstream_status(SERVICE, response.status().as_u16()));
        }

        let data: Value = response.json().await.map_err(|e| {
            Error::upstream(SERVICE.to_string(), format!("Failed to parse JSON response: {}", e))
        })?;

        parse_player_response(video_id, &data)
    }
}

#[async_trait::async_trait]
impl DirectProvider for InnertubePlayerClient {
    async fn stream_manifest(&self, video_id: &str) -> Result<StreamManifest> {
        let mut last_error = None;

        for identity in &identities() {
            match self.try_identity(video_id, identity).await {
                Ok(manifest) if manifest.has_streams() => {
                    tracing::debug!(
                        "{} manifest for {}: {} muxed / {} audio",
                        identity.name,
                        video_id,
                        manifest.muxed.len(),
                        manifest.audio.len()
                    );
                    return Ok(manifest);
                }
                Ok(_) => {
                    tracing::warn!("{} returned no direct URLs for {}", identity.name, video_id);
                    last_error = Some(Error::not_found_for(
                        "direct stream URLs".to_string(),
                        video_id.to_string(),
                    ));
                }
                Err(e) => {
                    tracing::warn!("{} player lookup for {} failed: {}", identity.name, video_id, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::internal("no player identities configured")))
    }
}

/// Turn a `player` response into a manifest
pub fn parse_player_response(video_id: &str, data: &Value) -> Result<StreamManifest> {
    let status = data
        .pointer("/playabilityStatus/status")
        .and_then(Value::as_str)
        .unwrap_or("");
    if status != "OK" {
        let reason = data
            .pointer("/playabilityStatus/reason")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        return Err(match status {
            "ERROR" => Error::not_found_for(format!("video ({})", reason), video_id.to_string()),
            _ => Error::upstream(SERVICE.to_string(), format!("{}: {}", status, reason)),
        });
    }

    let details = data.get("videoDetails");
    let detail_str = |key: &str| {
        details
            .and_then(|d| d.get(key))
            .and_then(Value::as_str)
            .map(String::from)
    };

    let muxed = data
        .pointer("/streamingData/formats")
        .and_then(Value::as_array)
        .map(|formats| formats.iter().filter_map(parse_muxed).collect())
        .unwrap_or_default();

    let audio = data
        .pointer("/streamingData/adaptiveFormats")
        .and_then(Value::as_array)
        .map(|formats| formats.iter().filter_map(parse_audio).collect())
        .unwrap_or_default();

    Ok(StreamManifest {
        video_id: video_id.to_string(),
        title: detail_str("title").unwrap_or_else(|| video_id.to_string()),
        duration_seconds: detail_str("lengthSeconds").and_then(|s| s.parse().ok()),
        thumbnail: details
            .and_then(|d| d.pointer("/thumbnail/thumbnails"))
            .and_then(Value::as_array)
            .and_then(|t| t.last())
            .and_then(|t| t.get("url"))
            .and_then(Value::as_str)
            .map(String::from),
        channel: detail_str("author"),
        views: detail_str("viewCount").and_then(|s| s.parse().ok()),
        muxed,
        audio,
    })
}

fn direct_url(format: &Value) -> Option<String> {
    format
        .get("url")
        .and_then(Value::as_str)
        .filter(|u| !u.is_empty())
        .map(String::from)
}

fn content_length(format: &Value) -> Option<u64> {
    format
        .get("contentLength")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
}

fn parse_muxed(format: &Value) -> Option<StreamFormat> {
    let url = direct_url(format)?;
    let height = format
        .get("height")
        .and_then(Value::as_u64)
        .map(|h| h as u32)
        .or_else(|| {
            let label = format.get("qualityLabel")?.as_str()?;
            let digits: String = label.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().ok()
        })?;

    Some(StreamFormat {
        itag: format.get("itag").and_then(Value::as_u64).unwrap_or(0) as u32,
        quality: height,
        url,
        mime_type: format
            .get("mimeType")
            .and_then(Value::as_str)
            .unwrap_or("video/mp4")
            .to_string(),
        content_length: content_length(format),
    })
}

fn parse_audio(format: &Value) -> Option<StreamFormat> {
    let mime_type = format.get("mimeType")?.as_str()?;
    if !mime_type.starts_with("audio/") {
        return None;
    }
    let url = direct_url(format)?;
    let bps = format
        .get("averageBitrate")
        .or_else(|| format.get("bitrate"))
        .and_then(Value::as_u64)?;

    Some(StreamFormat {
        itag: format.get("itag").and_then(Value::as_u64).unwrap_or(0) as u32,
        quality: nominal_kbps(bps),
        url,
        mime_type: mime_type.to_string(),
        content_length: content_length(format),
    })
}

/// Snap a measured bitrate to the nearest standard kbps value
pub fn nominal_kbps(bps: u64) -> u32 {
    let kbps = (bps / 1000) as u32;
    NOMINAL_AUDIO_KBPS
        .iter()
        .copied()
        .min_by_key(|nominal| nominal.abs_diff(kbps))
        .unwrap_or(kbps)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub(crate) fn player_response(video_id: &str) -> Value {
        json!({
            "playabilityStatus": {"status": "OK"},
            "videoDetails": {
                "videoId": video_id,
                "title": "Direct Title",
                "lengthSeconds": "4000",
                "author": "Direct Channel",
                "viewCount": "42",
                "thumbnail": {"thumbnails": [{"url": "https://i.ytimg.com/hq.jpg"}]}
            },
            "streamingData": {
                "formats": [
                    {
                        "itag": 18,
                        "url": "https://rr.googlevideo.com/360.mp4",
                        "mimeType": "video/mp4; codecs=\"avc1.42001E, mp4a.40.2\"",
                        "height": 360,
                        "qualityLabel": "360p",
                        "contentLength": "10485760"
                    },
                    {
                        "itag": 22,
                        "signatureCipher": "s=abc&url=https%3A%2F%2Fx",
                        "mimeType": "video/mp4",
                        "height": 720
                    }
                ],
                "adaptiveFormats": [
                    {
                        "itag": 137,
                        "url": "https://rr.googlevideo.com/1080-video-only",
                        "mimeType": "video/mp4; codecs=\"avc1.640028\"",
                        "height": 1080
                    },
                    {
                        "itag": 140,
                        "url": "https://rr.googlevideo.com/140.m4a",
                        "mimeType": "audio/mp4; codecs=\"mp4a.40.2\"",
                        "bitrate": 130000,
                        "averageBitrate": 129500,
                        "contentLength": "3500000"
                    },
                    {
                        "itag": 139,
                        "url": "https://rr.googlevideo.com/139.m4a",
                        "mimeType": "audio/mp4; codecs=\"mp4a.40.5\"",
                        "averageBitrate": 48800
                    }
                ]
            }
        })
    }

    #[test]
    fn test_parse_player_response() {
        let manifest = parse_player_response("abcdefghijk", &player_response("abcdefghijk")).unwrap();

        assert_eq!(manifest.title, "Direct Title");
        assert_eq!(manifest.duration_seconds, Some(4000));
        assert_eq!(manifest.channel.as_deref(), Some("Direct Channel"));
        assert_eq!(manifest.views, Some(42));
        // Cipher-only and video-only entries are skipped
        assert_eq!(manifest.muxed.len(), 1);
        assert_eq!(manifest.muxed[0].quality, 360);
        assert_eq!(manifest.muxed[0].content_length, Some(10_485_760));
        let audio: Vec<u32> = manifest.audio.iter().map(|f| f.quality).collect();
        assert_eq!(audio, vec![128, 48]);
    }

    #[test]
    fn test_unplayable_video() {
        let data = json!({"playabilityStatus": {"status": "ERROR", "reason": "Video unavailable"}});
        let err = parse_player_response("abcdefghijk", &data).unwrap_err();
        assert_eq!(err.category(), "not_found");

        let data = json!({"playabilityStatus": {"status": "LOGIN_REQUIRED", "reason": "Sign in"}});
        let err = parse_player_response("abcdefghijk", &data).unwrap_err();
        assert_eq!(err.category(), "upstream_unavailable");
    }

    #[test]
    fn test_nominal_kbps() {
        assert_eq!(nominal_kbps(129_500), 128);
        assert_eq!(nominal_kbps(48_800), 48);
        assert_eq!(nominal_kbps(160_000), 160);
        assert_eq!(nominal_kbps(500_000), 320);
    }

    #[tokio::test]
    async fn test_stream_manifest_from_server() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/player"))
            .and(body_partial_json(json!({"videoId": "abcdefghijk"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(player_response("abcdefghijk")))
            .mount(&mock_server)
            .await;

        let client = InnertubePlayerClient::new_with_base_url(Client::new(), mock_server.uri(), 15);
        let manifest = client.stream_manifest("abcdefghijk").await.unwrap();
        assert!(manifest.has_streams());
    }

    #[tokio::test]
    async fn test_second_identity_used_when_first_refuses() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/player"))
            .and(body_partial_json(
                json!({"context": {"client": {"clientName": "ANDROID_VR"}}}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"playabilityStatus": {"status": "UNPLAYABLE", "reason": "kids"}}),
            ))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/player"))
            .and(body_partial_json(
                json!({"context": {"client": {"clientName": "WEB_EMBEDDED_PLAYER"}}}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(player_response("abcdefghijk")))
            .mount(&mock_server)
            .await;

        let client = InnertubePlayerClient::new_with_base_url(Client::new(), mock_server.uri(), 15);
        let manifest = client.stream_manifest("abcdefghijk").await.unwrap();
        assert_eq!(manifest.title, "Direct Title");
    }

    #[tokio::test]
    async fn test_all_identities_fail() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let client = InnertubePlayerClient::new_with_base_url(Client::new(), mock_server.uri(), 15);
        let err = client.stream_manifest("abcdefghijk").await.unwrap_err();
        assert!(matches!(
            err,
            Error::UpstreamUnavailable {
                status: Some(403),
                ..
            }
        ));
    }
}
