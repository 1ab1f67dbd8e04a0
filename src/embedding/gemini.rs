//! Google Generative Language embeddings (`embedding-001`).

use super::Embedder;
use crate::error::{IngestError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// The API accepts at most this many requests per batch call.
const BATCH_SIZE: usize = 100;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest<'a> {
    model: &'a str,
    content: Content<'a>,
    task_type: &'static str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedRequest<'a>>,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

/// Gemini REST embedder.
pub struct GeminiEmbedder {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    model_path: String,
    api_key: String,
    dimensions: usize,
}

impl GeminiEmbedder {
    pub fn new(
        client: reqwest::Client,
        endpoint: &str,
        model: &str,
        api_key: &str,
        dimensions: usize,
    ) -> Self {
        let model = model.trim_start_matches("models/").to_string();
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model_path: format!("models/{}", model),
            model,
            api_key: api_key.to_string(),
            dimensions,
        }
    }

    async fn embed_with_task(&self, texts: &[String], task_type: &'static str) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/{}:batchEmbedContents", self.endpoint, self.model_path);
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(BATCH_SIZE) {
            let request = BatchEmbedRequest {
                requests: batch
                    .iter()
                    .map(|text| EmbedRequest {
                        model: self.model_path.as_str(),
                        content: Content {
                            parts: [Part { text: text.as_str() }],
                        },
                        task_type,
                    })
                    .collect(),
            };

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&request)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<body unavailable>".to_string());
                return Err(IngestError::Embedding(format!(
                    "Embedding request failed ({}): {}",
                    status, body
                )));
            }

            let payload: BatchEmbedResponse = response.json().await?;
            if payload.embeddings.len() != batch.len() {
                return Err(IngestError::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    batch.len(),
                    payload.embeddings.len()
                )));
            }

            all_embeddings.extend(payload.embeddings.into_iter().map(|e| e.values));
        }

        Ok(all_embeddings)
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self
            .embed_with_task(&[text.to_string()], "RETRIEVAL_QUERY")
            .await?;
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
        let embeddings = self.embed_with_task(texts, "RETRIEVAL_DOCUMENT").await?;
        debug!("Generated {} embeddings", embeddings.len());
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        &self.model
    }
}
