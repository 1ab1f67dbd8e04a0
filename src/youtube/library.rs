//! Transcript source backed by the `yt-transcript-rs` crate.

use super::captions::normalize_segments;
use super::{Transcript, TranscriptSource, VideoId};
use crate::error::{IngestError, Result};
use async_trait::async_trait;
use tracing::{debug, instrument};
use yt_transcript_rs::api::YouTubeTranscriptApi;

/// Delegates transcript retrieval to `yt-transcript-rs`.
pub struct LibraryTranscriptSource {
    api: YouTubeTranscriptApi,
    languages: Vec<String>,
}

impl LibraryTranscriptSource {
    pub fn new(preferred_language: &str) -> Result<Self> {
        let api = YouTubeTranscriptApi::new(None, None, None).map_err(|e| {
            IngestError::TranscriptFetch(format!("Failed to create transcript client: {}", e))
        })?;

        let mut languages = vec![preferred_language.to_string()];
        if preferred_language != "en" {
            languages.push("en".to_string());
        }

        Ok(Self { api, languages })
    }
}

#[async_trait]
impl TranscriptSource for LibraryTranscriptSource {
    fn name(&self) -> &'static str {
        "library"
    }

    #[instrument(skip(self), fields(video_id = %video_id))]
    async fn fetch_transcript(&self, video_id: &VideoId) -> Result<Transcript> {
        let languages: Vec<&str> = self.languages.iter().map(String::as_str).collect();

        let fetched = self
            .api
            .fetch_transcript(video_id.as_str(), &languages, false)
            .await
            .map_err(|e| translate_error(video_id, &e.to_string()))?;

        debug!("Fetched {} snippets", fetched.snippets.len());

        let text = normalize_segments(fetched.snippets.iter().map(|s| s.text.as_str()));
        if text.is_empty() {
            return Err(IngestError::TranscriptNotFound(video_id.to_string()));
        }

        Ok(Transcript::new(video_id.clone(), Some(fetched.language_code.clone()), text))
    }
}

/// Map a library error message onto the transcript error taxonomy.
fn translate_error(video_id: &VideoId, message: &str) -> IngestError {
    let lower = message.to_lowercase();
    if lower.contains("disabled") {
        IngestError::TranscriptDisabled(video_id.to_string())
    } else if lower.contains("no transcript")
        || lower.contains("not found")
        || lower.contains("unavailable")
    {
        IngestError::TranscriptNotFound(format!("{}: {}", video_id, message))
    } else {
        IngestError::TranscriptFetch(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::youtube::extract_video_id;

    #[test]
    fn test_translate_error() {
        let id = extract_video_id("dQw4w9WgXcQ").unwrap();

        assert!(matches!(
            translate_error(&id, "Subtitles are disabled for this video"),
            IngestError::TranscriptDisabled(_)
        ));
        assert!(matches!(
            translate_error(&id, "No transcripts were found for any of the requested language codes"),
            IngestError::TranscriptNotFound(_)
        ));
        assert!(matches!(
            translate_error(&id, "The video is no longer available (Video unavailable)"),
            IngestError::TranscriptNotFound(_)
        ));
        assert!(matches!(
            translate_error(&id, "error sending request"),
            IngestError::TranscriptFetch(_)
        ));
    }
}
