//! OpenAI embeddings implementation.

use super::Embedder;
use crate::error::{IngestError, Result};
use crate::openai::create_client;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// OpenAI-based embedder.
pub struct OpenAIEmbedder {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedder {
    /// Create an embedder with the given key, model and dimensions.
    pub fn with_config(
        api_key: &str,
        model: &str,
        dimensions: usize,
        timeout_secs: Option<u64>,
    ) -> Result<Self> {
        Ok(Self {
            client: create_client(api_key, timeout_secs)?,
            model: model.to_string(),
            dimensions,
        })
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| IngestError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        // OpenAI has a limit on batch size, process in chunks
        const BATCH_SIZE: usize = 100;
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE) {
            let request = CreateEmbeddingRequestArgs::default()
                .model(&self.model)
                .input(EmbeddingInput::StringArray(chunk.to_vec()))
                .dimensions(self.dimensions as u32)
                .build()
                .map_err(|e| IngestError::Embedding(format!("Failed to build request: {}", e)))?;

            let response = self.client.embeddings().create(request).await.map_err(|e| {
                IngestError::OpenAI(format!("Embedding API error: {}", e))
            })?;

            if response.data.len() != chunk.len() {
                return Err(IngestError::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    chunk.len(),
                    response.data.len()
                )));
            }

            // Sort by index to ensure correct order
            let mut embeddings: Vec<_> = response.data.into_iter().collect();
            embeddings.sort_by_key(|e| e.index);
            all_embeddings.extend(embeddings.into_iter().map(|e| e.embedding));
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedder_creation() {
        let embedder = OpenAIEmbedder::with_config("sk-test", "text-embedding-3-small", 1536, None).unwrap();
        assert_eq!(embedder.dimensions(), 1536);
        assert_eq!(embedder.model(), "text-embedding-3-small");

        let embedder = OpenAIEmbedder::with_config("sk-test", "text-embedding-3-large", 3072, Some(30)).unwrap();
        assert_eq!(embedder.dimensions(), 3072);
    }
}
