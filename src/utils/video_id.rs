//! Video id extraction
//!
//! Accepts the URL shapes users actually paste: `youtu.be/<id>`,
//! `watch?v=<id>`, `embed/<id>`, `shorts/<id>` and a bare 11-character id.

use regex::Regex;
use std::sync::LazyLock;

static URL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"youtu\.be/([A-Za-z0-9_-]{11})",
        r"[?&]v=([A-Za-z0-9_-]{11})",
        r"/embed/([A-Za-z0-9_-]{11})",
        r"/shorts/([A-Za-z0-9_-]{11})",
        r"/live/([A-Za-z0-9_-]{11})",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

static BARE_ID: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").ok());

/// Extract an 11-character video id from a URL or bare id
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Some(bare) = BARE_ID.as_ref()
        && bare.is_match(input)
    {
        return Some(input.to_string());
    }

    URL_PATTERNS
        .iter()
        .find_map(|re| re.captures(input))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Canonical watch URL for an id
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Whether the input names a video directly rather than being search text
pub fn looks_like_video_reference(input: &str) -> bool {
    let input = input.trim();
    let is_url = input.contains("youtube.com/") || input.contains("youtu.be/");
    is_url && extract_video_id(input).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://youtu.be/dQw4w9WgXcQ", "dQw4w9WgXcQ")]
    #[case("https://youtu.be/dQw4w9WgXcQ?si=abc", "dQw4w9WgXcQ")]
    #[case("https://www.youtube.com/watch?v=dQw4w9WgXcQ", "dQw4w9WgXcQ")]
    #[case("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=10", "dQw4w9WgXcQ")]
    #[case("https://m.youtube.com/watch?v=dQw4w9WgXcQ", "dQw4w9WgXcQ")]
    #[case("https://www.youtube.com/embed/dQw4w9WgXcQ", "dQw4w9WgXcQ")]
    #[case("https://www.youtube.com/shorts/abcDEF12_-x", "abcDEF12_-x")]
    #[case("https://www.youtube.com/live/abcDEF12_-x?feature=share", "abcDEF12_-x")]
    #[case("dQw4w9WgXcQ", "dQw4w9WgXcQ")]
    #[case("  dQw4w9WgXcQ  ", "dQw4w9WgXcQ")]
    fn test_extracts_id(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(extract_video_id(input).as_deref(), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("barota")]
    #[case("https://example.com/page")]
    #[case("https://www.youtube.com/watch?v=short")]
    #[case("twelve chars")]
    fn test_rejects(#[case] input: &str) {
        assert_eq!(extract_video_id(input), None);
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            watch_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_looks_like_video_reference() {
        assert!(looks_like_video_reference("https://youtu.be/dQw4w9WgXcQ"));
        assert!(!looks_like_video_reference("dQw4w9WgXcQ"));
        assert!(!looks_like_video_reference("lofi beats"));
    }
}
