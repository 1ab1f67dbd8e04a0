//! YouTube access: video IDs, transcripts, and titles.
//!
//! Transcripts come from a [`TranscriptSource`]; titles from a
//! [`TitleResolver`]. Both are traits so the pipeline can be driven by
//! fakes in tests.

pub mod captions;
mod http;
mod library;
mod oembed;
mod scraper;
mod video_id;

pub use http::{build_client, PageFetcher};
pub use library::LibraryTranscriptSource;
pub use oembed::OEmbedTitleResolver;
pub use scraper::{extract_player_response, find_caption_tracks_literal, ScrapingTranscriptSource};
pub use video_id::{extract_video_id, VideoId};

use crate::config::{TranscriptStrategy, YoutubeSettings};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Spoken-word text of a video, segments joined by single spaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: VideoId,
    /// Language code of the caption track used, if known.
    pub language: Option<String>,
    pub text: String,
}

impl Transcript {
    pub fn new(video_id: VideoId, language: Option<String>, text: String) -> Self {
        Self {
            video_id,
            language,
            text,
        }
    }
}

/// Trait for transcript providers.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch the full transcript, or fail with a transcript error. Never returns empty text.
    async fn fetch_transcript(&self, video_id: &VideoId) -> Result<Transcript>;
}

/// Trait for title lookup. Infallible: implementations fall back to a placeholder.
#[async_trait]
pub trait TitleResolver: Send + Sync {
    async fn resolve_title(&self, video_id: &VideoId) -> String;
}

/// Create the transcript source selected in settings.
pub fn create_transcript_source(
    settings: &YoutubeSettings,
    fetcher: PageFetcher,
) -> Result<Arc<dyn TranscriptSource>> {
    let source: Arc<dyn TranscriptSource> = match settings.transcript_source {
        TranscriptStrategy::Scrape => Arc::new(ScrapingTranscriptSource::new(fetcher, settings)),
        TranscriptStrategy::Library => {
            Arc::new(LibraryTranscriptSource::new(&settings.preferred_language)?)
        }
    };
    Ok(source)
}
