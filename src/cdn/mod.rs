//! CDN client
//!
//! Resolves metadata and per-quality download links through the third-party
//! CDN. Every failure is an `Err` with its kind so the pipeline can fall back.

pub mod client;
pub mod host;

pub use client::SaveTubeClient;
pub use host::{HostSelector, normalize_host};

use crate::Result;
use crate::types::{MediaType, ResolvedMetadata};

/// CDN operations, behind a trait so the pipeline can be tested with mocks
///
/// A host is picked once per pipeline run and handed to every call, so the
/// id and key returned by `/v2/info` go back to the host that issued them.
#[async_trait::async_trait]
pub trait CdnProvider: Send + Sync {
    /// Base URL for one pipeline run
    async fn pick_host(&self) -> String;

    /// Decrypted metadata for a source URL
    async fn fetch_metadata(&self, host: &str, source_url: &str) -> Result<ResolvedMetadata>;

    /// Download URL for one (id, key, type, quality) tuple
    async fn fetch_download_link(
        &self,
        host: &str,
        internal_id: &str,
        key: &str,
        media_type: MediaType,
        quality: u32,
    ) -> Result<String>;
}
