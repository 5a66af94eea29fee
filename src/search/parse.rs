//! Search result extraction
//!
//! Both providers end up with the same JSON tree (Innertube's search response
//! and the results page's embedded `ytInitialData`), so one walker serves both.

use crate::types::SearchResult;
use crate::utils::video_id::watch_url;
use crate::{Error, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static INITIAL_DATA: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?s)(?:var\s+ytInitialData|window\[.ytInitialData.\])\s*=\s*(\{.+?\})\s*;\s*</script>")
        .ok()
});

/// Collect up to `limit` `videoRenderer` entries in document order
pub fn collect_results(root: &Value, limit: usize) -> Vec<SearchResult> {
    let mut out = Vec::new();
    walk(root, limit, &mut out);
    out
}

fn walk(value: &Value, limit: usize, out: &mut Vec<SearchResult>) {
    if out.len() >= limit {
        return;
    }
    match value {
        Value::Object(map) => {
            if let Some(renderer) = map.get("videoRenderer") {
                if let Some(result) = parse_video_renderer(renderer) {
                    out.push(result);
                }
                return;
            }
            for child in map.values() {
                walk(child, limit, out);
            }
        }
        Value::Array(items) => {
            for child in items {
                walk(child, limit, out);
            }
        }
        _ => {}
    }
}

/// Build a result from one `videoRenderer` object
pub fn parse_video_renderer(renderer: &Value) -> Option<SearchResult> {
    let id = renderer.get("videoId")?.as_str()?.to_string();
    if id.len() != 11 {
        return None;
    }

    let title = renderer
        .get("title")
        .and_then(text_of)
        .unwrap_or_else(|| "Unknown".to_string());

    let duration = renderer.get("lengthText").and_then(text_of);

    // Thumbnails are ordered smallest first
    let thumbnail = renderer
        .pointer("/thumbnail/thumbnails")
        .and_then(Value::as_array)
        .and_then(|thumbs| thumbs.last())
        .and_then(|t| t.get("url"))
        .and_then(Value::as_str)
        .map(String::from);

    let channel = renderer
        .get("ownerText")
        .or_else(|| renderer.get("longBylineText"))
        .and_then(text_of);

    let views = renderer
        .get("viewCountText")
        .and_then(text_of)
        .and_then(|text| parse_count(&text));

    Some(SearchResult {
        url: watch_url(&id),
        id,
        title,
        duration,
        thumbnail,
        channel,
        views,
    })
}

/// Innertube text node: `simpleText` or concatenated `runs[].text`
fn text_of(node: &Value) -> Option<String> {
    if let Some(simple) = node.get("simpleText").and_then(Value::as_str) {
        return Some(simple.to_string());
    }
    let runs = node.get("runs")?.as_array()?;
    let joined: String = runs
        .iter()
        .filter_map(|r| r.get("text").and_then(Value::as_str))
        .collect();
    (!joined.is_empty()).then_some(joined)
}

/// `"1,234,567 views"` → 1234567
fn parse_count(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Pull the `ytInitialData` JSON out of a results page
pub fn extract_initial_data(html: &str) -> Result<Value> {
    let re = INITIAL_DATA
        .as_ref()
        .ok_or_else(|| Error::internal("initial data pattern failed to compile"))?;

    let raw = re
        .captures(html)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| Error::upstream("search", "results page has no ytInitialData"))?;

    serde_json::from_str(raw.as_str()).map_err(|e| {
        Error::upstream("search".to_string(), format!("ytInitialData is not JSON: {}", e))
    })
}
