//! Resolution pipeline
//!
//! search → CDN metadata (or a rebuilt record from the direct manifest) →
//! per-quality links (CDN first, then direct, then mirror) → assembly.
//! Nothing here outlives one invocation.

use super::ladder;
use crate::cdn::{CdnProvider, SaveTubeClient};
use crate::config::{PipelineSettings, Settings};
use crate::direct::{
    DirectProvider, InnertubePlayerClient, StreamManifest, link_from_manifest, mirror_link,
};
use crate::network::NetworkManager;
use crate::search::{DefaultSearch, SearchProvider};
use crate::types::{
    DownloadLink, LinkSet, LinkSource, MediaType, ResolvedMetadata, SearchResult, VideoSummary,
    format_duration,
};
use crate::utils::video_id::{extract_video_id, looks_like_video_reference, watch_url};
use crate::{Error, Result};
use futures::future::join_all;
use tokio::sync::OnceCell;

/// Per-request tweaks to the quality plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// A specific (type, quality) the caller is after
    pub requested: Option<(MediaType, u32)>,
}

impl ResolveOptions {
    pub fn requesting(media_type: MediaType, quality: u32) -> Self {
        Self {
            requested: Some((media_type, quality)),
        }
    }

    fn requested_for(&self, media_type: MediaType) -> Option<u32> {
        self.requested
            .filter(|(t, _)| *t == media_type)
            .map(|(_, q)| q)
    }
}

/// Outcome of one successful pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Search text, when the run started from one
    pub query: Option<String>,
    pub video: VideoSummary,
    /// Whether metadata came from the CDN or was rebuilt from the direct path
    pub metadata_source: LinkSource,
    pub links: LinkSet,
}

impl Resolution {
    pub fn video_id(&self) -> &str {
        &self.video.id
    }

    pub fn title(&self) -> &str {
        &self.video.title
    }

    pub fn highest_video(&self) -> Option<&DownloadLink> {
        self.links.highest_video()
    }

    pub fn best_audio(&self) -> Option<&DownloadLink> {
        self.links.best_audio()
    }
}

/// State scoped to a single invocation
struct Invocation<'a> {
    video_id: &'a str,
    /// CDN base URL shared by the metadata call and every link call
    cdn_host: String,
    /// Fetched at most once, on first need
    manifest: OnceCell<Result<StreamManifest>>,
}

impl<'a> Invocation<'a> {
    fn new(video_id: &'a str, cdn_host: String) -> Self {
        Self {
            video_id,
            cdn_host,
            manifest: OnceCell::new(),
        }
    }
}

/// Generic resolver over its three collaborators
pub struct ResolverGeneric<C, S, D> {
    cdn: C,
    search: S,
    direct: Option<D>,
    pipeline: PipelineSettings,
    mirror_template: Option<String>,
}

/// Production resolver
pub type Resolver = ResolverGeneric<SaveTubeClient, DefaultSearch, InnertubePlayerClient>;

impl Resolver {
    /// Wire the production collaborators from settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let network = NetworkManager::new(settings)?;
        let client = network.client().clone();

        let cdn = SaveTubeClient::new(client.clone(), settings)?;
        let search = DefaultSearch::from_settings(client.clone(), settings);
        let direct = settings.direct.enabled.then(|| {
            InnertubePlayerClient::new_with_base_url(
                client,
                settings.direct.innertube_base_url.clone(),
                network.request_timeout_secs(),
            )
        });

        Ok(Self::new(
            cdn,
            search,
            direct,
            settings.pipeline.clone(),
            settings.direct.mirror_template.clone(),
        ))
    }
}

impl<C, S, D> ResolverGeneric<C, S, D>
where
    C: CdnProvider,
    S: SearchProvider,
    D: DirectProvider,
{
    pub fn new(
        cdn: C,
        search: S,
        direct: Option<D>,
        pipeline: PipelineSettings,
        mirror_template: Option<String>,
    ) -> Self {
        Self {
            cdn,
            search,
            direct,
            pipeline,
            mirror_template,
        }
    }

    pub fn pipeline_settings(&self) -> &PipelineSettings {
        &self.pipeline
    }

    /// Search only
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::validation("query", "query cannot be empty"));
        }
        self.search.search(query, limit).await
    }

    /// Resolve free text; pasted video URLs skip the search step
    pub async fn resolve_query(&self, query: &str, options: ResolveOptions) -> Result<Resolution> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::validation("query", "query cannot be empty"));
        }

        let (video_id, hit) = match extract_video_id(query).filter(|_| looks_like_video_reference(query)) {
            Some(id) => (id, None),
            None => {
                let hit = self
                    .search
                    .search(query, 1)
                    .await?
                    .into_iter()
                    .next()
                    .ok_or_else(|| {
                        Error::not_found_for("videos matching the query".to_string(), query.to_string())
                    })?;
                tracing::info!("Search {:?} matched {} ({})", query, hit.id, hit.title);
                (hit.id.clone(), Some(hit))
            }
        };

        let mut resolution = self.resolve_video(&video_id, hit, options).await?;
        resolution.query = Some(query.to_string());
        Ok(resolution)
    }

    /// Resolve a video URL or bare id
    pub async fn resolve_source(&self, source: &str, options: ResolveOptions) -> Result<Resolution> {
        let video_id = extract_video_id(source).ok_or_else(|| {
            Error::validation_with_value("url", "not a recognizable video URL or id", source.trim())
        })?;
        self.resolve_video(&video_id, None, options).await
    }

    async fn resolve_video(
        &self,
        video_id: &str,
        hit: Option<SearchResult>,
        options: ResolveOptions,
    ) -> Result<Resolution> {
        let cdn_host = self.cdn.pick_host().await;
        tracing::debug!("Resolving {} via CDN host {}", video_id, cdn_host);
        let invocation = Invocation::new(video_id, cdn_host);
        let metadata = self.metadata(&invocation).await?;

        let mut attempts = Vec::new();
        for (media_type, cap) in [
            (MediaType::Video, self.pipeline.max_video_qualities),
            (MediaType::Audio, self.pipeline.max_audio_qualities),
        ] {
            let requested = options.requested_for(media_type);
            for quality in ladder::plan(&metadata, media_type, cap, requested) {
                attempts.push((media_type, quality));
            }
        }

        let (invocation_ref, metadata_ref) = (&invocation, &metadata);
        let futures = attempts.iter().map(move |&(media_type, quality)| {
            self.resolve_link(invocation_ref, metadata_ref, media_type, quality)
        });
        let resolved: Vec<Option<DownloadLink>> = if self.pipeline.concurrent {
            join_all(futures).await
        } else {
            let mut out = Vec::with_capacity(attempts.len());
            for future in futures {
                out.push(future.await);
            }
            out
        };

        // Exact hits claim their (type, quality) slot before closest-match substitutes
        let (exact, substitutes): (Vec<_>, Vec<_>) = attempts
            .iter()
            .zip(resolved)
            .filter_map(|((_, requested), link)| link.map(|l| (*requested, l)))
            .partition(|(requested, link)| link.quality == *requested);
        let links = LinkSet::from_links(exact.into_iter().chain(substitutes).map(|(_, l)| l));

        if links.is_empty() {
            tracing::warn!("No links resolved for {} ({} attempts)", video_id, attempts.len());
            return Err(Error::no_links(video_id));
        }

        tracing::info!(
            "Resolved {}: {} video / {} audio links ({:?} metadata)",
            video_id,
            links.video.len(),
            links.audio.len(),
            metadata.source
        );

        let manifest = invocation.manifest.get().and_then(|m| m.as_ref().ok());
        Ok(Resolution {
            query: None,
            video: summarize(video_id, hit, &metadata, manifest),
            metadata_source: metadata.source,
            links,
        })
    }

    async fn metadata(&self, invocation: &Invocation<'_>) -> Result<ResolvedMetadata> {
        let source_url = watch_url(invocation.video_id);
        let cdn_error = match self.cdn.fetch_metadata(&invocation.cdn_host, &source_url).await {
            Ok(metadata) => return Ok(metadata),
            Err(e) => e,
        };
        tracing::warn!(
            "CDN metadata for {} failed ({}): {}",
            invocation.video_id,
            cdn_error.category(),
            cdn_error
        );

        match self.manifest(invocation).await {
            Some(Ok(manifest)) => {
                tracing::info!("Rebuilt metadata for {} from direct manifest", invocation.video_id);
                Ok(manifest.to_metadata(
                    &self.pipeline.synthetic_video_ladder,
                    &self.pipeline.synthetic_audio_ladder,
                ))
            }
            Some(Err(Error::NotFound { .. })) => Err(Error::not_found_for(
                "video".to_string(),
                invocation.video_id.to_string(),
            )),
            _ => Err(cdn_error),
        }
    }

    /// The invocation's manifest; `None` when the direct path is disabled
    async fn manifest<'i>(
        &self,
        invocation: &'i Invocation<'_>,
    ) -> Option<&'i Result<StreamManifest>> {
        let direct = self.direct.as_ref()?;
        let manifest = invocation
            .manifest
            .get_or_init(|| async {
                let result = direct.stream_manifest(invocation.video_id).await;
                if let Err(e) = &result {
                    tracing::warn!("Direct manifest for {} failed: {}", invocation.video_id, e);
                }
                result
            })
            .await;
        Some(manifest)
    }

    async fn resolve_link(
        &self,
        invocation: &Invocation<'_>,
        metadata: &ResolvedMetadata,
        media_type: MediaType,
        quality: u32,
    ) -> Option<DownloadLink> {
        let label = media_type.quality_label(quality);

        if metadata.source == LinkSource::Cdn {
            match self
                .cdn
                .fetch_download_link(
                    &invocation.cdn_host,
                    &metadata.internal_id,
                    &metadata.decryption_key,
                    media_type,
                    quality,
                )
                .await
            {
                Ok(url) => {
                    tracing::debug!("CDN link for {} {}", invocation.video_id, label);
                    return Some(DownloadLink::from_cdn(media_type, quality, url));
                }
                Err(e) => tracing::warn!(
                    "CDN link for {} {} failed ({}): {}",
                    invocation.video_id,
                    label,
                    e.category(),
                    e
                ),
            }
        }

        let manifest = self.manifest(invocation).await?;
        if let Ok(manifest) = manifest
            && let Some(link) = link_from_manifest(manifest, media_type, quality)
        {
            tracing::debug!("Direct link for {} {} -> {}", invocation.video_id, label, link.label);
            return Some(link);
        }

        let link = mirror_link(self.mirror_template.as_deref()?, invocation.video_id, media_type, quality)?;
        tracing::info!(
            "Synthesized mirror link for {} {} ({} requested)",
            invocation.video_id,
            link.label,
            label
        );
        Some(link)
    }
}

fn summarize(
    video_id: &str,
    hit: Option<SearchResult>,
    metadata: &ResolvedMetadata,
    manifest: Option<&StreamManifest>,
) -> VideoSummary {
    let duration_seconds = metadata
        .duration_seconds
        .or_else(|| manifest.and_then(|m| m.duration_seconds));

    match hit {
        Some(hit) => VideoSummary {
            id: video_id.to_string(),
            title: hit.title,
            url: hit.url,
            duration: hit
                .duration
                .or_else(|| duration_seconds.map(format_duration))
                .unwrap_or_else(|| "N/A".to_string()),
            duration_seconds,
            thumbnail: hit.thumbnail.or_else(|| metadata.thumbnail.clone()),
            channel: hit
                .channel
                .or_else(|| manifest.and_then(|m| m.channel.clone()))
                .unwrap_or_else(|| "Unknown".to_string()),
            views: hit.views.or_else(|| manifest.and_then(|m| m.views)),
        },
        None => VideoSummary {
            id: video_id.to_string(),
            title: metadata.title.clone(),
            url: watch_url(video_id),
            duration: duration_seconds
                .map(format_duration)
                .unwrap_or_else(|| "N/A".to_string()),
            duration_seconds,
            thumbnail: metadata.thumbnail.clone(),
            channel: manifest
                .and_then(|m| m.channel.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            views: manifest.and_then(|m| m.views),
        },
    }
}
