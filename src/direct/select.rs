//! Format selection and mirror synthesis

use super::{StreamFormat, StreamManifest};
use crate::types::{DownloadLink, LinkSource, MediaType};

/// Exact match, else the closest quality; ties go to the higher one
pub fn select_closest(formats: &[StreamFormat], quality: u32) -> Option<&StreamFormat> {
    formats
        .iter()
        .find(|f| f.quality == quality)
        .or_else(|| {
            formats
                .iter()
                .min_by(|a, b| {
                    a.quality
                        .abs_diff(quality)
                        .cmp(&b.quality.abs_diff(quality))
                        .then(b.quality.cmp(&a.quality))
                })
        })
}

/// Pick a stream from the manifest and turn it into a link
///
/// The link reports the quality actually selected, not the one requested.
pub fn link_from_manifest(
    manifest: &StreamManifest,
    media_type: MediaType,
    quality: u32,
) -> Option<DownloadLink> {
    let format = select_closest(manifest.formats(media_type), quality)?;
    let note = if format.quality == quality {
        "Direct stream from origin".to_string()
    } else {
        format!(
            "Direct stream from origin ({} requested)",
            media_type.quality_label(quality)
        )
    };

    Some(DownloadLink {
        quality: format.quality,
        label: media_type.quality_label(format.quality),
        media_type,
        url: format.url.clone(),
        source: LinkSource::Direct,
        size_estimate: format.content_length.map(format_size),
        note,
    })
}

/// Unverified last-resort link through a public mirror
///
/// `{id}` and `{itag}` in the template are substituted. Only the two classic
/// muxed itags and the AAC audio itag are used, so the link carries that
/// itag's nominal quality.
pub fn mirror_link(
    template: &str,
    video_id: &str,
    media_type: MediaType,
    quality: u32,
) -> Option<DownloadLink> {
    if template.trim().is_empty() {
        return None;
    }

    let (itag, nominal) = match media_type {
        MediaType::Video if quality >= 720 => (22, 720),
        MediaType::Video => (18, 360),
        MediaType::Audio => (140, 128),
    };

    let url = template
        .replace("{id}", video_id)
        .replace("{itag}", &itag.to_string());

    Some(DownloadLink {
        quality: nominal,
        label: media_type.quality_label(nominal),
        media_type,
        url,
        source: LinkSource::Direct,
        size_estimate: None,
        note: "Mirror fallback (unverified)".to_string(),
    })
}

/// Human-readable byte count, e.g. `12.3 MB`
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
