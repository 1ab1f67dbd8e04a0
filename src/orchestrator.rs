//! Pipeline orchestrator for ytingest.
//!
//! Coordinates the whole process from video URL to stored embeddings:
//! validate, resolve the video ID, fetch the transcript, look up the title,
//! chunk, annotate, embed, and store.

use crate::chunking::{annotate, compose_document_text, ChunkContext, SlidingWindowChunker};
use crate::config::{RuntimeConfig, Settings};
use crate::embedding::{create_embedder, Embedder};
use crate::error::{IngestError, Result};
use crate::vector_store::{create_vector_store, Document, SearchResult, VectorStore};
use crate::youtube::{
    build_client, create_transcript_source, extract_video_id, OEmbedTitleResolver, PageFetcher,
    TitleResolver, TranscriptSource, VideoId,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// A request to ingest one video.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
}

impl IngestRequest {
    pub fn new(url: impl Into<String>, document_id: Option<String>) -> Self {
        Self {
            url: url.into(),
            document_id,
        }
    }
}

/// Result of a successful ingestion.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub video_id: VideoId,
    pub video_title: String,
    pub chunks_created: usize,
}

/// Wire shape for both outcomes of an ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks_created: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl IngestResponse {
    pub fn success(outcome: &IngestOutcome) -> Self {
        Self {
            ok: true,
            message: Some(format!(
                "Ingested {} chunks from \"{}\"",
                outcome.chunks_created, outcome.video_title
            )),
            chunks_created: Some(outcome.chunks_created),
            video_title: Some(outcome.video_title.clone()),
            error: None,
            suggestion: None,
        }
    }

    pub fn failure(err: &IngestError) -> Self {
        Self {
            ok: false,
            message: None,
            chunks_created: None,
            video_title: None,
            error: Some(err.to_string()),
            suggestion: err.suggestion().map(str::to_string),
        }
    }
}

/// The main orchestrator for the ingestion pipeline.
pub struct Orchestrator {
    settings: Settings,
    chunker: SlidingWindowChunker,
    transcripts: Arc<dyn TranscriptSource>,
    titles: Arc<dyn TitleResolver>,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
}

impl Orchestrator {
    /// Build every component from validated runtime configuration.
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        let client = build_client(&config.settings.http)?;
        let fetcher = PageFetcher::new(client.clone(), &config.settings.youtube);

        let transcripts = create_transcript_source(&config.settings.youtube, fetcher.clone())?;
        let titles: Arc<dyn TitleResolver> =
            Arc::new(OEmbedTitleResolver::new(fetcher, &config.settings.youtube));
        let embedder = create_embedder(&config, client.clone())?;
        let vector_store = create_vector_store(&config, client)?;

        info!(
            "Using transcript source '{}', embedding model '{}'",
            transcripts.name(),
            embedder.model()
        );

        Self::with_components(config.settings, transcripts, titles, embedder, vector_store)
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        transcripts: Arc<dyn TranscriptSource>,
        titles: Arc<dyn TitleResolver>,
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Result<Self> {
        let chunker = SlidingWindowChunker::from_settings(&settings.chunking)?;
        Ok(Self {
            settings,
            chunker,
            transcripts,
            titles,
            embedder,
            vector_store,
        })
    }

    /// Get a reference to the vector store.
    pub fn vector_store(&self) -> Arc<dyn VectorStore> {
        self.vector_store.clone()
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run the pipeline for one request.
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub async fn ingest(&self, request: &IngestRequest) -> Result<IngestOutcome> {
        let url = request.url.trim();
        if url.is_empty() {
            return Err(IngestError::InvalidInput("A YouTube URL is required".to_string()));
        }

        let video_id = extract_video_id(url)
            .ok_or_else(|| IngestError::InvalidInput("Invalid YouTube URL".to_string()))?;
        info!(video_id = %video_id, "Fetching transcript via {}", self.transcripts.name());

        let transcript = self.transcripts.fetch_transcript(&video_id).await?;
        info!(
            video_id = %video_id,
            "Transcript has {} characters",
            transcript.text.chars().count()
        );

        let video_title = self.titles.resolve_title(&video_id).await;

        let text = compose_document_text(&video_title, &transcript.text);
        let pieces = self.chunker.split(&text);
        let context = ChunkContext {
            video_id: video_id.to_string(),
            video_title: video_title.clone(),
            document_id: request.document_id.clone(),
            source: url.to_string(),
        };
        let chunks = annotate(pieces, &context);
        info!(video_id = %video_id, "Created {} chunks", chunks.len());

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(IngestError::Embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let documents: Vec<Document> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| Document::from_chunk(chunk, embedding))
            .collect();
        let chunks_created = self.vector_store.add_documents(&documents).await?;

        info!(video_id = %video_id, "Stored {} chunks", chunks_created);

        Ok(IngestOutcome {
            video_id,
            video_title,
            chunks_created,
        })
    }

    /// Run the pipeline, logging a failure once at `error`.
    pub async fn ingest_logged(&self, request: &IngestRequest) -> Result<IngestOutcome> {
        self.ingest(request).await.inspect_err(|err| {
            error!(
                url = %request.url,
                document_id = request.document_id.as_deref().unwrap_or(""),
                "Ingestion failed: {}",
                err
            );
        })
    }

    /// Run the pipeline and convert any failure into the failure response.
    pub async fn handle(&self, request: &IngestRequest) -> IngestResponse {
        match self.ingest_logged(request).await {
            Ok(outcome) => IngestResponse::success(&outcome),
            Err(err) => IngestResponse::failure(&err),
        }
    }

    /// Embed a query and return the most similar stored chunks.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, limit: usize, min_score: f32) -> Result<Vec<SearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(IngestError::InvalidInput("A search query is required".to_string()));
        }

        let embedding = self.embedder.embed(query).await?;
        self.vector_store
            .similarity_search(&embedding, limit, min_score)
            .await
    }
}
