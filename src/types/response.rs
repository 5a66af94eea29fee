//! Response type definitions
//!
//! Every body carries a boolean `success`; failures add an `error` string.

use crate::types::{DownloadLink, LinkSet, LinkSource, SearchResult, VideoSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `GET /` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub service: String,
    pub version: String,
    pub developer: String,
    pub endpoints: Vec<EndpointDoc>,
    pub example: String,
}

/// One documented route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointDoc {
    pub path: String,
    pub description: String,
}

impl EndpointDoc {
    pub fn new(path: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            description: description.into(),
        }
    }
}

/// `GET /health` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub time: DateTime<Utc>,
    pub version: String,
    pub uptime_seconds: u64,
}

impl HealthResponse {
    pub fn new(uptime_seconds: u64, version: impl Into<String>) -> Self {
        Self {
            status: "active".to_string(),
            time: Utc::now(),
            version: version.into(),
            uptime_seconds,
        }
    }
}

/// Failure body shared by every route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested: Option<u32>,
    /// Qualities that did resolve, when the requested one did not
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            category: None,
            query: None,
            url: None,
            example: None,
            media_type: None,
            requested: None,
            available: None,
            developer: None,
        }
    }

    /// Build from a pipeline error
    pub fn from_error(error: &crate::Error) -> Self {
        let mut response = Self::new(crate::error::format_error(error));
        response.category = Some(error.category().to_string());
        response
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_alternatives(
        mut self,
        media_type: impl Into<String>,
        requested: u32,
        available: Vec<u32>,
    ) -> Self {
        self.media_type = Some(media_type.into());
        self.requested = Some(requested);
        self.available = Some(available);
        self
    }

    pub fn with_developer(mut self, developer: impl Into<String>) -> Self {
        self.developer = Some(developer.into());
        self
    }
}

/// Full pipeline result (`/api`, `/search`, `/api/info`, CLI)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub video_id: String,
    pub video: VideoSummary,
    pub metadata_source: LinkSource,
    pub formats: LinkSet,
    pub highest_video: Option<DownloadLink>,
    pub best_audio: Option<DownloadLink>,
    pub developer: String,
}

/// `/api/formats` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatsResponse {
    pub success: bool,
    pub video_id: String,
    pub title: String,
    pub total: usize,
    pub formats: LinkSet,
    pub developer: String,
}

/// Abbreviated `/dl` body for bots; only used when a video link resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DlResponse {
    pub success: bool,
    pub title: String,
    pub download: String,
    pub audio: Option<String>,
    pub developer: String,
}

/// `/api/direct` body: only the top link of each type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectResponse {
    pub success: bool,
    pub video_id: String,
    pub title: String,
    pub video: Option<DownloadLink>,
    pub audio: Option<DownloadLink>,
    pub developer: String,
}

/// `/api/download` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    pub success: bool,
    pub video_id: String,
    pub title: String,
    pub download: DownloadLink,
    pub developer: String,
}

/// `/api/quick` and `/api/smart` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickResponse {
    pub success: bool,
    pub query: String,
    pub video_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_quality: Option<u32>,
    pub download: DownloadLink,
    /// True when the returned quality differs from the requested one
    pub fallback: bool,
    pub developer: String,
}

/// Derived links attached to each `/api/search` hit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEndpoints {
    pub info: String,
    pub formats: String,
    pub download: String,
    pub direct: String,
}

impl ResultEndpoints {
    pub fn for_video(id: &str) -> Self {
        Self {
            info: format!("/api/info?id={}", id),
            formats: format!("/api/formats?id={}", id),
            download: format!("/api/download?id={}&type=video&quality=360", id),
            direct: format!("/api/direct?id={}", id),
        }
    }
}

/// A search hit decorated with its endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoratedResult {
    #[serde(flatten)]
    pub result: SearchResult,
    pub endpoints: ResultEndpoints,
}

/// `/api/search` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    pub query: String,
    pub page: usize,
    pub limit: usize,
    pub count: usize,
    pub results: Vec<DecoratedResult>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_response_minimal_shape() {
        let json = serde_json::to_value(ErrorResponse::new("boom")).unwrap();
        assert_eq!(json, json!({"success": false, "error": "boom"}));
    }

    #[test]
    fn test_error_response_with_alternatives() {
        let response = ErrorResponse::new("Requested quality not available")
            .with_alternatives("video", 999, vec![360, 720]);
        let json = serde_json::to_value(response).unwrap();

        assert_eq!(json["type"], "video");
        assert_eq!(json["requested"], 999);
        assert_eq!(json["available"], json!([360, 720]));
    }

    #[test]
    fn test_error_response_from_error() {
        let error = crate::Error::not_found_for("videos", "barota");
        let response = ErrorResponse::from_error(&error).with_query("barota");

        assert_eq!(response.category.as_deref(), Some("not_found"));
        assert_eq!(response.query.as_deref(), Some("barota"));
        assert!(response.error.contains("barota"));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "No videos found for 'barota'");
        assert_eq!(json["category"], "not_found");
        assert!(json.get("available").is_none());
    }

    #[test]
    fn test_health_response() {
        let health = HealthResponse::new(5, "1.0.0");
        let json = serde_json::to_value(&health).unwrap();

        assert_eq!(json["status"], "active");
        assert_eq!(json["uptimeSeconds"], 5);
        assert!(json["time"].is_string());
    }

    #[test]
    fn test_decorated_result_flattens() {
        let decorated = DecoratedResult {
            result: SearchResult {
                id: "abcdefghijk".to_string(),
                title: "Title".to_string(),
                url: "https://www.youtube.com/watch?v=abcdefghijk".to_string(),
                duration: Some("3:00".to_string()),
                thumbnail: None,
                channel: Some("Channel".to_string()),
                views: Some(10),
            },
            endpoints: ResultEndpoints::for_video("abcdefghijk"),
        };

        let json = serde_json::to_value(decorated).unwrap();
        assert_eq!(json["id"], "abcdefghijk");
        assert_eq!(json["endpoints"]["info"], "/api/info?id=abcdefghijk");
    }
}
