//! Text chunking for breaking transcripts into searchable segments.
//!
//! The title-prefixed transcript is split into fixed-size overlapping
//! windows, and each window is then annotated with positional metadata.

mod metadata;
mod window;

pub use metadata::{annotate, ChunkContext};
pub use window::SlidingWindowChunker;

use serde::{Deserialize, Serialize};

/// Metadata stored alongside every chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    pub video_id: String,
    pub video_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    /// Zero-based position of this chunk.
    pub chunk_index: usize,
    /// Number of chunks produced for the document.
    pub total_chunks: usize,
    /// URL the content was ingested from.
    pub source: String,
}

/// A chunk of text with its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    pub metadata: ChunkMetadata,
}

/// Build the text that gets chunked: the title followed by the transcript.
pub fn compose_document_text(title: &str, transcript: &str) -> String {
    format!("Video title: {} | Video context: {}", title, transcript)
}
