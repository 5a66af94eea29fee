//! Common test utilities and helpers
//!
//! One wiremock server stands in for every upstream: the CDN (`/v2/info`,
//! `/download`), the search API (`/search`), the results page (`/results`)
//! and the player API (`/player`).

#![allow(dead_code)]

use aes::cipher::{BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use ytdl_gateway::config::Settings;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;

/// Key shared by the mock CDN and the test settings
pub const TEST_KEY_HEX: &str = "000102030405060708090a0b0c0d0e0f";

pub const VIDEO_ID: &str = "abcdefghijk";
pub const SECOND_ID: &str = "bbbbbbbbbbb";

/// Test configuration factory
pub struct TestConfig;

impl TestConfig {
    /// Every upstream pointed at `server`, decryption key set, no mirror
    pub fn against(server: &MockServer) -> Settings {
        let mut settings = Settings::default();
        settings.logging.level = "debug".to_string();
        settings.network.connect_timeout = 2;
        settings.network.request_timeout = 5;
        settings.cdn.hosts = vec![server.uri()];
        settings.cdn.random_cdn_endpoint = None;
        settings.cdn.decryption_key = Some(TEST_KEY_HEX.to_string());
        settings.search.innertube_base_url = server.uri();
        settings.search.web_base_url = server.uri();
        settings.direct.innertube_base_url = server.uri();
        settings.direct.mirror_template = None;
        settings.pipeline.attribution = "test-dev".to_string();
        settings
    }

    /// Same as [`TestConfig::against`] with the direct path switched off
    pub fn cdn_only(server: &MockServer) -> Settings {
        let mut settings = Self::against(server);
        settings.direct.enabled = false;
        settings
    }
}

/// Test data factory
pub struct MockData;

impl MockData {
    /// AES-128-CBC + PKCS#7, IV prepended, base64 encoded
    pub fn seal(plaintext: &[u8]) -> String {
        let key: [u8; 16] = hex::decode(TEST_KEY_HEX).unwrap().try_into().unwrap();
        let iv = [7u8; 16];

        let mut buffer = vec![0u8; plaintext.len() + 16];
        buffer[..plaintext.len()].copy_from_slice(plaintext);
        let ciphertext = Aes128CbcEnc::new(&key.into(), &iv.into())
            .encrypt_padded_mut::<Pkcs7>(&mut buffer, plaintext.len())
            .unwrap()
            .to_vec();

        let mut sealed = iv.to_vec();
        sealed.extend_from_slice(&ciphertext);
        STANDARD.encode(sealed)
    }

    /// Decrypted `/v2/info` payload advertising 720/360 video and 128 audio
    pub fn info_payload() -> Value {
        json!({
            "id": "cdn-internal-1",
            "key": "per-video-key",
            "title": "Barota (Official Video)",
            "duration": 212,
            "thumbnail": "https://i.ytimg.com/vi/abcdefghijk/hq.jpg",
            "video_formats": [
                {"height": 720, "quality": 720},
                {"height": 360, "quality": "360"}
            ],
            "audio_formats": [
                {"quality": 128}
            ]
        })
    }

    pub fn video_renderer(id: &str, title: &str) -> Value {
        json!({
            "videoRenderer": {
                "videoId": id,
                "title": {"runs": [{"text": title}]},
                "lengthText": {"simpleText": "3:32"},
                "thumbnail": {"thumbnails": [{"url": "https://i.ytimg.com/hq.jpg"}]},
                "ownerText": {"runs": [{"text": "Some Channel"}]},
                "viewCountText": {"simpleText": "1,234 views"}
            }
        })
    }

    pub fn search_response(items: Vec<Value>) -> Value {
        json!({
            "contents": {
                "twoColumnSearchResultsRenderer": {
                    "primaryContents": {
                        "sectionListRenderer": {
                            "contents": [
                                {"itemSectionRenderer": {"contents": items}}
                            ]
                        }
                    }
                }
            }
        })
    }

    /// Player response with a muxed 360p stream and a 128 kbps audio stream
    pub fn player_response(video_id: &str) -> Value {
        json!({
            "playabilityStatus": {"status": "OK"},
            "videoDetails": {
                "videoId": video_id,
                "title": "Direct Title",
                "lengthSeconds": "212",
                "author": "Direct Channel",
                "viewCount": "42"
            },
            "streamingData": {
                "formats": [{
                    "itag": 18,
                    "url": "https://rr.googlevideo.com/360.mp4",
                    "mimeType": "video/mp4; codecs=\"avc1.42001E, mp4a.40.2\"",
                    "height": 360,
                    "contentLength": "10485760"
                }],
                "adaptiveFormats": [{
                    "itag": 140,
                    "url": "https://rr.googlevideo.com/140.m4a",
                    "mimeType": "audio/mp4; codecs=\"mp4a.40.2\"",
                    "averageBitrate": 129500
                }]
            }
        })
    }
}

/// Mock server factory
pub struct MockServerFactory;

impl MockServerFactory {
    pub async fn new() -> MockServer {
        MockServer::start().await
    }

    /// Search returning `results` (id, title) in order
    pub async fn setup_search(server: &MockServer, results: &[(&str, &str)]) {
        let items = results
            .iter()
            .map(|(id, title)| MockData::video_renderer(id, title))
            .collect();
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(MockData::search_response(items)),
            )
            .mount(server)
            .await;
    }

    /// Search with no hits on both providers
    pub async fn setup_empty_search(server: &MockServer) {
        Self::setup_search(server, &[]).await;
        Mock::given(method("GET"))
            .and(path("/results"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><script>var ytInitialData = {\"contents\": {}};</script></html>",
            ))
            .mount(server)
            .await;
    }

    /// CDN metadata envelope for [`MockData::info_payload`]
    pub async fn setup_cdn_info(server: &MockServer) {
        let envelope = MockData::seal(MockData::info_payload().to_string().as_bytes());
        Mock::given(method("POST"))
            .and(path("/v2/info"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": true, "data": envelope})),
            )
            .mount(server)
            .await;
    }

    /// CDN metadata endpoint failing with `status`
    pub async fn setup_cdn_info_failure(server: &MockServer, status: u16) {
        Mock::given(method("POST"))
            .and(path("/v2/info"))
            .respond_with(ResponseTemplate::new(status).set_body_string("upstream broke"))
            .mount(server)
            .await;
    }

    /// CDN link for one (type, quality)
    pub async fn setup_cdn_link(server: &MockServer, media_type: &str, quality: u32) {
        Mock::given(method("POST"))
            .and(path("/download"))
            .and(body_partial_json(json!({
                "downloadType": media_type,
                "quality": quality.to_string(),
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": true,
                "data": {
                    "downloadUrl": format!("https://dl.cdn.test/{}/{}", media_type, quality)
                }
            })))
            .mount(server)
            .await;
    }

    /// Fallback for `/download` calls no specific mock matched
    pub async fn setup_cdn_link_failures(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/download"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": false, "data": {}})),
            )
            .with_priority(10)
            .mount(server)
            .await;
    }

    /// Player API answering with [`MockData::player_response`]
    pub async fn setup_player(server: &MockServer, video_id: &str) {
        Mock::given(method("POST"))
            .and(path("/player"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(MockData::player_response(video_id)),
            )
            .mount(server)
            .await;
    }

    /// Player API reporting the video as unavailable
    pub async fn setup_player_unavailable(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/player"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "playabilityStatus": {"status": "ERROR", "reason": "Video unavailable"}
            })))
            .mount(server)
            .await;
    }

    /// Happy path: search hit, CDN metadata, links for 720/360 video and 128 audio
    pub async fn setup_happy_path(server: &MockServer) {
        Self::setup_search(
            server,
            &[(VIDEO_ID, "Barota (Official Video)"), (SECOND_ID, "Barota Live")],
        )
        .await;
        Self::setup_cdn_info(server).await;
        Self::setup_cdn_link(server, "video", 720).await;
        Self::setup_cdn_link(server, "video", 360).await;
        Self::setup_cdn_link(server, "audio", 128).await;
        Self::setup_cdn_link_failures(server).await;
    }
}

/// Test utilities
pub struct TestUtils;

impl TestUtils {
    /// Initialize test logging
    pub fn init_logger() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("debug")
            .try_init();
    }
}
