//! Direct-source fallback
//!
//! Reads the origin platform's stream manifest when the CDN path fails and
//! picks combined audio+video formats (video) or audio-only formats (audio)
//! that carry a direct URL.

pub mod player;
pub mod select;

pub use player::InnertubePlayerClient;
pub use select::{format_size, link_from_manifest, mirror_link, select_closest};

use crate::Result;
use crate::types::{LinkSource, MediaType, ResolvedMetadata};

/// One stream with a direct URL
#[derive(Debug, Clone, PartialEq)]
pub struct StreamFormat {
    pub itag: u32,
    /// Height for video, nominal kbps for audio
    pub quality: u32,
    pub url: String,
    pub mime_type: String,
    pub content_length: Option<u64>,
}

/// Playable streams and basic details for one video
#[derive(Debug, Clone, PartialEq)]
pub struct StreamManifest {
    pub video_id: String,
    pub title: String,
    pub duration_seconds: Option<u64>,
    pub thumbnail: Option<String>,
    pub channel: Option<String>,
    pub views: Option<u64>,
    /// Combined audio+video formats
    pub muxed: Vec<StreamFormat>,
    /// Audio-only adaptive formats
    pub audio: Vec<StreamFormat>,
}

impl StreamManifest {
    pub fn formats(&self, media_type: MediaType) -> &[StreamFormat] {
        match media_type {
            MediaType::Video => &self.muxed,
            MediaType::Audio => &self.audio,
        }
    }

    pub fn has_streams(&self) -> bool {
        !self.muxed.is_empty() || !self.audio.is_empty()
    }

    /// Minimal metadata record offering the synthetic quality ladders
    pub fn to_metadata(&self, video_ladder: &[u32], audio_ladder: &[u32]) -> ResolvedMetadata {
        let descending = |ladder: &[u32]| {
            let mut out = ladder.to_vec();
            out.sort_unstable_by(|a, b| b.cmp(a));
            out.dedup();
            out
        };

        ResolvedMetadata {
            internal_id: self.video_id.clone(),
            decryption_key: String::new(),
            title: self.title.clone(),
            duration_seconds: self.duration_seconds,
            thumbnail: self.thumbnail.clone(),
            video_qualities: descending(video_ladder),
            audio_qualities: descending(audio_ladder),
            source: LinkSource::Direct,
        }
    }
}

/// Origin manifest lookup, behind a trait so the pipeline can be tested with mocks
#[async_trait::async_trait]
pub trait DirectProvider: Send + Sync {
    async fn stream_manifest(&self, video_id: &str) -> Result<StreamManifest>;
}
