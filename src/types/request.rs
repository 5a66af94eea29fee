//! Query-string parameter types
//!
//! Every field is optional on the wire; handlers decide which ones are required
//! so that missing parameters produce a JSON error body instead of an extractor
//! rejection.

use crate::types::MediaType;
use serde::{Deserialize, Serialize};

/// `?query=` (also accepts `?q=`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryParams {
    pub query: Option<String>,
    pub q: Option<String>,
}

impl QueryParams {
    /// The first non-blank of `query` and `q`
    pub fn text(&self) -> Option<&str> {
        non_blank(self.query.as_deref()).or_else(|| non_blank(self.q.as_deref()))
    }
}

/// `?url=` or `?id=`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceParams {
    pub url: Option<String>,
    pub id: Option<String>,
}

impl SourceParams {
    /// The source reference, preferring `url`
    pub fn source(&self) -> Option<&str> {
        non_blank(self.url.as_deref()).or_else(|| non_blank(self.id.as_deref()))
    }
}

/// `/api/search` parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub q: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
}

impl SearchParams {
    pub fn text(&self) -> Option<&str> {
        non_blank(self.query.as_deref()).or_else(|| non_blank(self.q.as_deref()))
    }

    /// Requested page size clamped to `1..=max`; unparsable values use the default
    pub fn limit(&self, default: usize, max: usize) -> usize {
        non_blank(self.limit.as_deref())
            .and_then(|raw| raw.parse::<usize>().ok())
            .unwrap_or(default)
            .clamp(1, max.max(1))
    }

    /// 1-based page number
    pub fn page(&self) -> usize {
        non_blank(self.page.as_deref())
            .and_then(|raw| raw.parse::<usize>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }
}

/// `/api/download` parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadParams {
    pub url: Option<String>,
    pub id: Option<String>,
    pub quality: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
}

impl DownloadParams {
    pub fn source(&self) -> Option<&str> {
        non_blank(self.url.as_deref()).or_else(|| non_blank(self.id.as_deref()))
    }
}

/// `/api/quick` and `/api/smart` parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuickParams {
    pub query: Option<String>,
    pub q: Option<String>,
    pub quality: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
}

impl QuickParams {
    pub fn text(&self) -> Option<&str> {
        non_blank(self.query.as_deref()).or_else(|| non_blank(self.q.as_deref()))
    }
}

/// Parse `type` and `quality` with per-type defaults
///
/// Accepts labels such as `720p` or `128kbps` as well as bare numbers.
pub fn parse_selection(
    media_type: Option<&str>,
    quality: Option<&str>,
    default_video: u32,
    default_audio: u32,
) -> crate::Result<(MediaType, u32)> {
    let media_type = match non_blank(media_type) {
        Some(raw) => raw.parse::<MediaType>()?,
        None => MediaType::Video,
    };

    let quality = match non_blank(quality) {
        Some(raw) => parse_quality(raw)?,
        None => match media_type {
            MediaType::Video => default_video,
            MediaType::Audio => default_audio,
        },
    };

    Ok((media_type, quality))
}

/// Parse a numeric quality, tolerating `p`/`k`/`kbps` suffixes
pub fn parse_quality(raw: &str) -> crate::Result<u32> {
    let trimmed = raw.trim().to_ascii_lowercase();
    let digits = trimmed
        .trim_end_matches("kbps")
        .trim_end_matches('k')
        .trim_end_matches('p');

    digits
        .parse::<u32>()
        .ok()
        .filter(|q| *q > 0)
        .ok_or_else(|| {
            crate::Error::validation_with_value("quality", "expected a positive number", raw)
        })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
