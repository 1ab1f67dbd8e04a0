//! Embedding generation for semantic search and retrieval.

mod gemini;
mod openai;

pub use gemini::GeminiEmbedder;
pub use openai::OpenAIEmbedder;

use crate::config::{EmbeddingProvider, RuntimeConfig};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a search query.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for documents, one per input, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;

    /// Model identifier.
    fn model(&self) -> &str;
}

/// Create the embedder selected in settings.
pub fn create_embedder(config: &RuntimeConfig, client: reqwest::Client) -> Result<Arc<dyn Embedder>> {
    let settings = &config.settings.embedding;
    let embedder: Arc<dyn Embedder> = match settings.provider {
        EmbeddingProvider::Gemini => Arc::new(GeminiEmbedder::new(
            client,
            &settings.endpoint,
            settings.model_name(),
            &config.embedding_api_key,
            settings.dimensions as usize,
        )),
        EmbeddingProvider::OpenAI => Arc::new(OpenAIEmbedder::with_config(
            &config.embedding_api_key,
            settings.model_name(),
            settings.dimensions as usize,
            config.settings.http.timeout_seconds,
        )?),
    };
    Ok(embedder)
}
