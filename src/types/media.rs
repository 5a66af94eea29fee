//! Media data model
//!
//! Search hits, decrypted CDN metadata and resolved download links. None of
//! these outlive the request that produced them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of stream a link points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Audio,
}

impl MediaType {
    /// Wire name used by the CDN's `downloadType` field
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Video => "video",
            MediaType::Audio => "audio",
        }
    }

    /// Human label for a numeric quality, e.g. `720p` or `128kbps`
    pub fn quality_label(&self, quality: u32) -> String {
        match self {
            MediaType::Video => format!("{}p", quality),
            MediaType::Audio => format!("{}kbps", quality),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video" | "mp4" => Ok(MediaType::Video),
            "audio" | "mp3" => Ok(MediaType::Audio),
            other => Err(crate::Error::validation_with_value(
                "type",
                "expected 'video' or 'audio'",
                other,
            )),
        }
    }
}

/// Where a link or metadata record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkSource {
    Cdn,
    Direct,
}

/// One search hit, in provider relevance order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub url: String,
    /// Duration label as shown by the provider, e.g. `3:32`
    pub duration: Option<String>,
    pub thumbnail: Option<String>,
    pub channel: Option<String>,
    pub views: Option<u64>,
}

/// Metadata decrypted from the CDN envelope, or rebuilt from the direct path
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMetadata {
    /// CDN-internal id used for download requests
    pub internal_id: String,
    /// Per-video key the CDN expects back on download requests
    pub decryption_key: String,
    pub title: String,
    pub duration_seconds: Option<u64>,
    pub thumbnail: Option<String>,
    pub video_qualities: Vec<u32>,
    pub audio_qualities: Vec<u32>,
    /// Whether the qualities are the source's own list or the synthetic ladder
    pub source: LinkSource,
}

impl ResolvedMetadata {
    /// Advertised qualities for one media type
    pub fn qualities(&self, media_type: MediaType) -> &[u32] {
        match media_type {
            MediaType::Video => &self.video_qualities,
            MediaType::Audio => &self.audio_qualities,
        }
    }
}

/// A resolved download link for one (type, quality) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadLink {
    pub quality: u32,
    pub label: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub url: String,
    pub source: LinkSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_estimate: Option<String>,
    pub note: String,
}

impl DownloadLink {
    /// Link obtained from the CDN download endpoint
    pub fn from_cdn(media_type: MediaType, quality: u32, url: impl Into<String>) -> Self {
        Self {
            quality,
            label: media_type.quality_label(quality),
            media_type,
            url: url.into(),
            source: LinkSource::Cdn,
            size_estimate: None,
            note: "Resolved through CDN".to_string(),
        }
    }
}

/// Resolved links split by media type, each sorted by descending quality
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkSet {
    pub video: Vec<DownloadLink>,
    pub audio: Vec<DownloadLink>,
}

impl LinkSet {
    /// Build a set from links in any order
    ///
    /// Keeps the first link seen for each (type, quality) pair, then sorts
    /// each list by descending quality.
    pub fn from_links(links: impl IntoIterator<Item = DownloadLink>) -> Self {
        let mut set = Self::default();
        for link in links {
            let bucket = set.bucket_mut(link.media_type);
            if link.url.is_empty() || bucket.iter().any(|l| l.quality == link.quality) {
                continue;
            }
            bucket.push(link);
        }
        set.video.sort_by(|a, b| b.quality.cmp(&a.quality));
        set.audio.sort_by(|a, b| b.quality.cmp(&a.quality));
        set
    }

    fn bucket_mut(&mut self, media_type: MediaType) -> &mut Vec<DownloadLink> {
        match media_type {
            MediaType::Video => &mut self.video,
            MediaType::Audio => &mut self.audio,
        }
    }

    /// Links of one media type
    pub fn of(&self, media_type: MediaType) -> &[DownloadLink] {
        match media_type {
            MediaType::Video => &self.video,
            MediaType::Audio => &self.audio,
        }
    }

    /// Highest-quality video link
    pub fn highest_video(&self) -> Option<&DownloadLink> {
        self.video.first()
    }

    /// Highest-bitrate audio link
    pub fn best_audio(&self) -> Option<&DownloadLink> {
        self.audio.first()
    }

    /// Exact (type, quality) lookup
    pub fn find(&self, media_type: MediaType, quality: u32) -> Option<&DownloadLink> {
        self.of(media_type).iter().find(|l| l.quality == quality)
    }

    /// Resolved qualities of one type, ascending
    pub fn available(&self, media_type: MediaType) -> Vec<u32> {
        let mut qualities: Vec<u32> = self.of(media_type).iter().map(|l| l.quality).collect();
        qualities.sort_unstable();
        qualities
    }

    pub fn len(&self) -> usize {
        self.video.len() + self.audio.len()
    }

    pub fn is_empty(&self) -> bool {
        self.video.is_empty() && self.audio.is_empty()
    }
}

/// Video description attached to every successful response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    pub id: String,
    pub title: String,
    pub url: String,
    pub duration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
}

/// Render seconds as `m:ss` or `h:mm:ss`
pub fn format_duration(seconds: u64) -> String {
    let (h, m, s) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}
