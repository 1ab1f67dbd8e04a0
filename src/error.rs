//! Error types for ytingest.

use thiserror::Error;

/// Library-level error type for ingestion operations.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Transcripts are disabled for video {0}")]
    TranscriptDisabled(String),

    #[error("No transcript found for video {0}")]
    TranscriptNotFound(String),

    #[error("Failed to fetch transcript: {0}")]
    TranscriptFetch(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl IngestError {
    /// Whether this error means the video has no usable transcript.
    pub fn is_transcript_unavailable(&self) -> bool {
        matches!(
            self,
            IngestError::TranscriptDisabled(_)
                | IngestError::TranscriptNotFound(_)
                | IngestError::TranscriptFetch(_)
        )
    }

    /// A user-facing hint for recovering from this error, if one applies.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            IngestError::InvalidInput(_) => Some(
                "Provide a full YouTube watch URL, a youtu.be link, or an 11-character video ID.",
            ),
            IngestError::Config(_) => {
                Some("Check the configuration file and required environment variables.")
            }
            IngestError::TranscriptDisabled(_) => {
                Some("This video has captions disabled. Try a video with subtitles enabled.")
            }
            IngestError::TranscriptNotFound(_) => Some(
                "No captions were found. Try a video with subtitles or auto-generated captions.",
            ),
            IngestError::TranscriptFetch(_) => Some("YouTube could not be reached. Try again later."),
            _ => None,
        }
    }
}

/// Result type alias for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_errors_carry_suggestions() {
        let disabled = IngestError::TranscriptDisabled("abc".to_string());
        assert!(disabled.is_transcript_unavailable());
        assert!(disabled.suggestion().unwrap().contains("disabled"));

        let missing = IngestError::TranscriptNotFound("abc".to_string());
        assert!(missing.is_transcript_unavailable());
        assert_ne!(missing.suggestion(), disabled.suggestion());
    }

    #[test]
    fn test_downstream_errors_have_no_suggestion() {
        let err = IngestError::VectorStore("insert failed".to_string());
        assert!(!err.is_transcript_unavailable());
        assert!(err.suggestion().is_none());
    }
}
