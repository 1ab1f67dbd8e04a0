//! Watch-page scraping transcript source.
//!
//! The watch page embeds the player response as a JavaScript assignment. Its
//! caption track list tells us where caption payloads live; when the player
//! response can't be read, a raw `"captionTracks":[...]` literal in the page
//! is used instead.

use super::captions::{
    first_successful, normalize_segments, parse_json_events, parse_tracks, select_track,
    CaptionTrack, XML_PARSERS,
};
use super::http::PageFetcher;
use super::{Transcript, TranscriptSource, VideoId};
use crate::config::YoutubeSettings;
use crate::error::{IngestError, Result};
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, info, instrument, warn};

const PLAYER_RESPONSE_MARKER: &str = "ytInitialPlayerResponse";

static CAPTION_TRACKS_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""captionTracks"\s*:\s*\["#).expect("Invalid regex"));

/// Transcript source that scrapes the public watch page.
pub struct ScrapingTranscriptSource {
    fetcher: PageFetcher,
    base_url: String,
    preferred_language: String,
}

impl ScrapingTranscriptSource {
    pub fn new(fetcher: PageFetcher, settings: &YoutubeSettings) -> Self {
        Self {
            fetcher,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            preferred_language: settings.preferred_language.clone(),
        }
    }

    /// Resolve relative caption URLs against the configured base.
    fn absolute_url(&self, url: &str) -> String {
        if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            url.to_string()
        }
    }

    /// Fetch one track, preferring the `json3` format and falling back to XML.
    ///
    /// `Ok(None)` means a payload arrived but held no caption text. An error is
    /// returned only when both requests failed.
    async fn fetch_track_text(&self, track: &CaptionTrack) -> Result<Option<String>> {
        let base_url = self.absolute_url(&track.base_url);
        let json_url = with_format(&base_url, "json3");

        let json_failed = match self.fetcher.get_text(&json_url).await {
            Ok(body) => {
                if let Some(fragments) = parse_json_events(&body) {
                    let text = normalize_segments(fragments);
                    if !text.is_empty() {
                        debug!(lang = %track.language_code, "Parsed json3 captions");
                        return Ok(Some(text));
                    }
                }
                debug!("json3 payload had no events, trying XML");
                false
            }
            Err(e) => {
                debug!("json3 caption fetch failed, trying XML: {}", e);
                true
            }
        };

        let body = match self.fetcher.get_text(&base_url).await {
            Ok(body) => body,
            Err(e) if json_failed => return Err(e),
            Err(e) => {
                warn!(lang = %track.language_code, "XML caption fetch failed: {}", e);
                return Ok(None);
            }
        };

        let Some((parser, fragments)) = first_successful(&body, XML_PARSERS) else {
            return Ok(None);
        };
        let text = normalize_segments(fragments);
        if text.is_empty() {
            return Ok(None);
        }
        debug!(lang = %track.language_code, parser, "Parsed XML captions");
        Ok(Some(text))
    }

    /// Turn one track into a transcript, remembering a transport failure for later.
    async fn transcript_from(
        &self,
        video_id: &VideoId,
        track: &CaptionTrack,
        fetch_error: &mut Option<IngestError>,
    ) -> Option<Transcript> {
        match self.fetch_track_text(track).await {
            Ok(Some(text)) => Some(Transcript::new(video_id.clone(), Some(track.language_code.clone()), text)),
            Ok(None) => None,
            Err(e) => {
                warn!(lang = %track.language_code, "Caption fetch failed: {}", e);
                *fetch_error = Some(e);
                None
            }
        }
    }
}

#[async_trait]
impl TranscriptSource for ScrapingTranscriptSource {
    fn name(&self) -> &'static str {
        "scrape"
    }

    #[instrument(skip(self), fields(video_id = %video_id))]
    async fn fetch_transcript(&self, video_id: &VideoId) -> Result<Transcript> {
        let html = self
            .fetcher
            .get_text(&video_id.watch_url(&self.base_url))
            .await
            .map_err(|e| IngestError::TranscriptFetch(format!("watch page for {}: {}", video_id, e)))?;

        let player = extract_player_response(&html);
        let tracks = player
            .as_ref()
            .map(|p| parse_tracks(&p["captions"]["playerCaptionsTracklistRenderer"]["captionTracks"]))
            .unwrap_or_default();

        let mut fetch_error = None;
        if let Some(track) = select_track(&tracks, &self.preferred_language) {
            info!(lang = %track.language_code, kind = ?track.kind, "Selected caption track {}", track.display_name);
            if let Some(transcript) = self.transcript_from(video_id, track, &mut fetch_error).await {
                return Ok(transcript);
            }
        }

        if tracks.is_empty() {
            let literal_tracks = find_caption_tracks_literal(&html);
            if let Some(track) = literal_tracks.first() {
                info!(lang = %track.language_code, "Using captionTracks literal from page");
                if let Some(transcript) = self.transcript_from(video_id, track, &mut fetch_error).await {
                    return Ok(transcript);
                }
            }
        }

        if let Some(e) = fetch_error {
            return Err(IngestError::TranscriptFetch(format!("captions for {}: {}", video_id, e)));
        }

        Err(unavailable_reason(video_id, player.as_ref(), !tracks.is_empty()))
    }
}

/// Classify why no transcript could be produced.
fn unavailable_reason(video_id: &VideoId, player: Option<&Value>, had_tracks: bool) -> IngestError {
    if let Some(player) = player {
        let status = player["playabilityStatus"]["status"].as_str().unwrap_or("OK");
        if status != "OK" {
            let reason = player["playabilityStatus"]["reason"].as_str().unwrap_or(status);
            return IngestError::TranscriptNotFound(format!("{} ({})", video_id, reason));
        }
        if !had_tracks && player.get("captions").is_none() {
            return IngestError::TranscriptDisabled(video_id.to_string());
        }
    }
    IngestError::TranscriptNotFound(video_id.to_string())
}

/// Parse the `ytInitialPlayerResponse = {...};` assignment from a watch page.
pub fn extract_player_response(html: &str) -> Option<Value> {
    let mut search_from = 0;
    while let Some(pos) = html[search_from..].find(PLAYER_RESPONSE_MARKER) {
        let after = search_from + pos + PLAYER_RESPONSE_MARKER.len();
        let rest = html[after..].trim_start();
        if let Some(rest) = rest.strip_prefix('=') {
            let rest = rest.trim_start();
            if rest.starts_with('{') {
                if let Some(Ok(value)) = serde_json::Deserializer::from_str(rest)
                    .into_iter::<Value>()
                    .next()
                {
                    return Some(value);
                }
            }
        }
        search_from = after;
    }
    None
}

/// Find a raw `"captionTracks":[...]` array anywhere in the page.
pub fn find_caption_tracks_literal(html: &str) -> Vec<CaptionTrack> {
    let Some(m) = CAPTION_TRACKS_LITERAL.find(html) else {
        return Vec::new();
    };
    // The match ends just past '['; parse from the bracket itself.
    let array_start = m.end() - 1;
    serde_json::Deserializer::from_str(&html[array_start..])
        .into_iter::<Value>()
        .next()
        .and_then(|r| r.ok())
        .map(|value| parse_tracks(&value))
        .unwrap_or_default()
}

/// Append a `fmt` query parameter to a caption URL.
fn with_format(url: &str, format: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}fmt={}", url, separator, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::youtube::captions::CaptionKind;
    use crate::youtube::extract_video_id;
    use axum::{extract::Query, http::StatusCode, routing::get, Router};
    use std::collections::HashMap;

    fn watch_page(player: &str) -> String {
        format!(
            "<html><script>var ytInitialPlayerResponse = {};var meta = {{}};</script></html>",
            player
        )
    }

    #[test]
    fn test_extract_player_response() {
        let html = watch_page(r#"{"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://x/t?a=1&b=2","languageCode":"en"}]}},"note":"a};b"}"#);
        let player = extract_player_response(&html).unwrap();
        let tracks = parse_tracks(&player["captions"]["playerCaptionsTracklistRenderer"]["captionTracks"]);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].base_url, "https://x/t?a=1&b=2");
        assert_eq!(player["note"], "a};b");
    }

    #[test]
    fn test_extract_player_response_skips_non_assignments() {
        let html = r#"<script>if (window.ytInitialPlayerResponse) {} var ytInitialPlayerResponse = {"ok":true};</script>"#;
        let player = extract_player_response(html).unwrap();
        assert_eq!(player["ok"], true);
        assert!(extract_player_response("<html></html>").is_none());
    }

    #[test]
    fn test_caption_tracks_literal() {
        let html = r#"junk "captionTracks": [{"baseUrl":"https://x/t","languageCode":"fr","kind":"asr"}], "audioTracks":[]"#;
        let tracks = find_caption_tracks_literal(html);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].language_code, "fr");
        assert_eq!(tracks[0].kind, CaptionKind::AutoGenerated);
        assert!(find_caption_tracks_literal("nothing here").is_empty());
    }

    #[test]
    fn test_with_format() {
        assert_eq!(with_format("https://x/t?v=1", "json3"), "https://x/t?v=1&fmt=json3");
        assert_eq!(with_format("https://x/t", "json3"), "https://x/t?fmt=json3");
    }

    #[test]
    fn test_unavailable_reason() {
        let id = extract_video_id("dQw4w9WgXcQ").unwrap();

        let disabled = serde_json::json!({"playabilityStatus": {"status": "OK"}});
        assert!(matches!(unavailable_reason(&id, Some(&disabled), false), IngestError::TranscriptDisabled(_)));

        let private = serde_json::json!({"playabilityStatus": {"status": "LOGIN_REQUIRED", "reason": "Private video"}});
        let err = unavailable_reason(&id, Some(&private), false);
        assert!(matches!(err, IngestError::TranscriptNotFound(ref m) if m.contains("Private video")));

        assert!(matches!(unavailable_reason(&id, None, false), IngestError::TranscriptNotFound(_)));
    }

    type Reply = (StatusCode, &'static str);

    /// Serve a watch page and caption endpoint on a local port. `page` receives the base URL.
    async fn spawn_site(page: impl FnOnce(&str) -> String, json3: Reply, xml: Reply) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let page = page(&base);

        let app = Router::new()
            .route("/watch", get(move || async move { page }))
            .route(
                "/api/timedtext",
                get(move |Query(params): Query<HashMap<String, String>>| async move {
                    assert_eq!(params.get("lang").map(String::as_str), Some("en"));
                    match params.get("fmt").map(String::as_str) {
                        Some("json3") => json3,
                        _ => xml,
                    }
                }),
            );

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        base
    }

    fn player_page(base: &str) -> String {
        watch_page(&format!(
            r#"{{"playabilityStatus":{{"status":"OK"}},"captions":{{"playerCaptionsTracklistRenderer":{{"captionTracks":[{{"baseUrl":"{base}/api/timedtext?v=dQw4w9WgXcQ&lang=de","languageCode":"de"}},{{"baseUrl":"/api/timedtext?v=dQw4w9WgXcQ&lang=en","languageCode":"en"}}]}}}}}}"#
        ))
    }

    async fn spawn_fake_youtube(json3_body: &'static str, xml_body: &'static str) -> String {
        spawn_site(player_page, (StatusCode::OK, json3_body), (StatusCode::OK, xml_body)).await
    }

    fn source_for(base: String) -> ScrapingTranscriptSource {
        let settings = YoutubeSettings {
            base_url: base,
            ..YoutubeSettings::default()
        };
        ScrapingTranscriptSource::new(PageFetcher::new(reqwest::Client::new(), &settings), &settings)
    }

    #[tokio::test]
    async fn test_scrape_json3_captions() {
        let base = spawn_fake_youtube(
            r#"{"events":[{"segs":[{"utf8":"Never gonna "},{"utf8":"give you up"}]}]}"#,
            "<text>unused</text>",
        )
        .await;

        let id = extract_video_id("dQw4w9WgXcQ").unwrap();
        let transcript = source_for(base).fetch_transcript(&id).await.unwrap();
        assert_eq!(transcript.text, "Never gonna give you up");
        assert_eq!(transcript.language.as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_scrape_falls_back_to_xml() {
        let base = spawn_fake_youtube(
            "",
            r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0">Hello &amp;amp; welcome</text><text start="1">back</text></transcript>"#,
        )
        .await;

        let id = extract_video_id("dQw4w9WgXcQ").unwrap();
        let transcript = source_for(base).fetch_transcript(&id).await.unwrap();
        assert_eq!(transcript.text, "Hello & welcome back");
    }

    #[tokio::test]
    async fn test_scrape_reports_not_found_when_payloads_are_empty() {
        let base = spawn_fake_youtube("", "<transcript></transcript>").await;

        let id = extract_video_id("dQw4w9WgXcQ").unwrap();
        let err = source_for(base).fetch_transcript(&id).await.unwrap_err();
        assert!(matches!(err, IngestError::TranscriptNotFound(_)));
    }

    #[tokio::test]
    async fn test_scrape_uses_caption_tracks_literal() {
        let page = |_: &str| {
            r#"<html><script>var cfg = {"captionTracks":[{"baseUrl":"/api/timedtext?v=dQw4w9WgXcQ&lang=en","languageCode":"en"}]};</script></html>"#
                .to_string()
        };
        let base = spawn_site(
            page,
            (StatusCode::OK, ""),
            (StatusCode::OK, "<transcript><text start=\"0\"><![CDATA[from literal]]></text></transcript>"),
        )
        .await;

        let id = extract_video_id("dQw4w9WgXcQ").unwrap();
        let transcript = source_for(base).fetch_transcript(&id).await.unwrap();
        assert_eq!(transcript.text, "from literal");
        assert_eq!(transcript.language.as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_scrape_reports_disabled_captions() {
        let page = |_: &str| watch_page(r#"{"playabilityStatus":{"status":"OK"},"videoDetails":{}}"#);
        let base = spawn_site(page, (StatusCode::OK, ""), (StatusCode::OK, "")).await;

        let id = extract_video_id("dQw4w9WgXcQ").unwrap();
        let err = source_for(base).fetch_transcript(&id).await.unwrap_err();
        assert!(matches!(err, IngestError::TranscriptDisabled(_)));
    }

    #[tokio::test]
    async fn test_scrape_reports_fetch_failure_on_server_errors() {
        let unavailable = (StatusCode::SERVICE_UNAVAILABLE, "busy");
        let base = spawn_site(player_page, unavailable, unavailable).await;

        let id = extract_video_id("dQw4w9WgXcQ").unwrap();
        let err = source_for(base).fetch_transcript(&id).await.unwrap_err();
        assert!(matches!(err, IngestError::TranscriptFetch(_)));
        assert_eq!(err.suggestion(), Some("YouTube could not be reached. Try again later."));
    }

    #[tokio::test]
    async fn test_scrape_empty_json3_then_xml_error_is_not_found() {
        let base = spawn_site(
            player_page,
            (StatusCode::OK, ""),
            (StatusCode::SERVICE_UNAVAILABLE, "busy"),
        )
        .await;

        let id = extract_video_id("dQw4w9WgXcQ").unwrap();
        let err = source_for(base).fetch_transcript(&id).await.unwrap_err();
        assert!(matches!(err, IngestError::TranscriptNotFound(_)));
    }
}
