//! Quality planning and best-effort selection

use crate::types::{DownloadLink, LinkSet, MediaType, ResolvedMetadata};

/// Fixed degrade order used when a requested quality is missing
pub const VIDEO_DEGRADE_LADDER: [u32; 8] = [2160, 1440, 1080, 720, 480, 360, 240, 144];
pub const AUDIO_DEGRADE_LADDER: [u32; 6] = [320, 256, 192, 128, 64, 48];

/// Qualities to resolve for one media type, in attempt order
///
/// Takes the top `cap` advertised qualities (descending). A requested quality
/// the metadata advertises is appended when the cap left it out.
pub fn plan(
    metadata: &ResolvedMetadata,
    media_type: MediaType,
    cap: usize,
    requested: Option<u32>,
) -> Vec<u32> {
    let mut advertised = metadata.qualities(media_type).to_vec();
    advertised.sort_unstable_by(|a, b| b.cmp(a));
    advertised.dedup();

    let mut planned: Vec<u32> = advertised.iter().copied().take(cap).collect();
    if let Some(quality) = requested
        && advertised.contains(&quality)
        && !planned.contains(&quality)
    {
        planned.push(quality);
    }
    planned
}

/// Entries of the degrade ladder strictly below `requested`, highest first
pub fn degrade_candidates(media_type: MediaType, requested: u32) -> Vec<u32> {
    let ladder: &[u32] = match media_type {
        MediaType::Video => &VIDEO_DEGRADE_LADDER,
        MediaType::Audio => &AUDIO_DEGRADE_LADDER,
    };
    ladder.iter().copied().filter(|q| *q < requested).collect()
}

/// Best-effort pick: exact, then degraded, then best available
///
/// Returns the link and whether it differs from the request.
pub fn pick_best_effort(
    links: &LinkSet,
    media_type: MediaType,
    requested: u32,
) -> Option<(&DownloadLink, bool)> {
    if let Some(exact) = links.find(media_type, requested) {
        return Some((exact, false));
    }

    degrade_candidates(media_type, requested)
        .into_iter()
        .find_map(|q| links.find(media_type, q))
        .or_else(|| links.of(media_type).first())
        .map(|link| (link, true))
}
