//! Video identifier extraction.

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use regex::Regex;

/// Value following `watch?v=`, `youtu.be/` or `embed/`, up to the next delimiter.
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:watch\?v=|youtu\.be/|embed/)([^&\n?#]+)").expect("Invalid regex")
});

/// A bare 11-character video ID.
static BARE_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("Invalid regex"));

/// A YouTube video identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Watch page URL under the given base (e.g. `https://www.youtube.com`).
    pub fn watch_url(&self, base_url: &str) -> String {
        format!("{}/watch?v={}", base_url.trim_end_matches('/'), self.0)
    }

    /// Canonical public watch URL.
    pub fn canonical_url(&self) -> String {
        self.watch_url("https://www.youtube.com")
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract a video ID from a YouTube URL or a bare ID.
///
/// URL forms are tried before the bare-ID form; the first match wins.
pub fn extract_video_id(input: &str) -> Option<VideoId> {
    let input = input.trim();

    if let Some(caps) = URL_PATTERN.captures(input) {
        let id = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        if !id.is_empty() {
            return Some(VideoId(id.to_string()));
        }
    }

    if BARE_ID_PATTERN.is_match(input) {
        return Some(VideoId(input.to_string()));
    }

    None
}
