//! Vector store abstraction for ytingest.
//!
//! Provides a trait-based interface for different vector database backends.

mod memory;
mod sqlite;
mod supabase;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;
pub use supabase::SupabaseVectorStore;

use crate::chunking::{Chunk, ChunkMetadata};
use crate::config::{RuntimeConfig, VectorStoreProvider};
use crate::error::{IngestError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// A chunk stored in the vector database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID.
    pub id: Uuid,
    /// Text content of this chunk.
    pub content: String,
    /// Chunk metadata.
    pub metadata: ChunkMetadata,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this document was created.
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// Create a document from an annotated chunk and its embedding.
    pub fn from_chunk(chunk: Chunk, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: chunk.content,
            metadata: chunk.metadata,
            embedding,
            created_at: Utc::now(),
        }
    }
}

/// A search match with score.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub content: String,
    pub metadata: ChunkMetadata,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Write documents. Succeeds only if every document was written.
    async fn add_documents(&self, docs: &[Document]) -> Result<usize>;

    /// Most similar documents first, at most `limit`, each scoring at least `min_score`.
    async fn similarity_search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>>;

    /// Delete every document whose metadata names `video_id`.
    async fn delete_by_video_id(&self, video_id: &str) -> Result<usize>;

    /// Get total document count.
    async fn document_count(&self) -> Result<usize>;
}

/// Create the vector store selected in settings.
pub fn create_vector_store(config: &RuntimeConfig, client: reqwest::Client) -> Result<Arc<dyn VectorStore>> {
    let settings = &config.settings.vector_store;
    let store: Arc<dyn VectorStore> = match settings.provider {
        VectorStoreProvider::Supabase => {
            let credentials = config.supabase.as_ref().ok_or_else(|| {
                IngestError::Config("Supabase credentials are not configured".to_string())
            })?;
            Arc::new(SupabaseVectorStore::new(
                client,
                credentials,
                &settings.table_name,
                &settings.query_name,
            ))
        }
        VectorStoreProvider::Sqlite => Arc::new(SqliteVectorStore::new(&config.settings.sqlite_path())?),
        VectorStoreProvider::Memory => Arc::new(MemoryVectorStore::new()),
    };
    Ok(store)
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Score, filter, sort and truncate documents for a local similarity search.
pub(crate) fn rank<'a, I>(docs: I, query_embedding: &[f32], limit: usize, min_score: f32) -> Vec<SearchResult>
where
    I: IntoIterator<Item = &'a Document>,
{
    let mut results: Vec<SearchResult> = docs
        .into_iter()
        .map(|doc| SearchResult {
            content: doc.content.clone(),
            metadata: doc.metadata.clone(),
            score: cosine_similarity(query_embedding, &doc.embedding),
        })
        .filter(|r| r.score >= min_score)
        .collect();

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(limit);
    results
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn document(video_id: &str, index: usize, content: &str, embedding: Vec<f32>) -> Document {
        Document::from_chunk(
            Chunk {
                content: content.to_string(),
                metadata: ChunkMetadata {
                    video_id: video_id.to_string(),
                    video_title: "Test Video".to_string(),
                    document_id: None,
                    chunk_index: index,
                    total_chunks: 2,
                    source: format!("https://youtu.be/{}", video_id),
                },
            },
            embedding,
        )
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);

        assert_eq!(cosine_similarity(&a, &[1.0]), 0.0);
    }

    #[test]
    fn test_rank_filters_and_orders() {
        let docs = vec![
            document("v", 0, "far", vec![0.0, 1.0]),
            document("v", 1, "near", vec![1.0, 0.1]),
            document("v", 2, "exact", vec![1.0, 0.0]),
        ];
        let results = rank(&docs, &[1.0, 0.0], 2, 0.5);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "exact");
        assert_eq!(results[1].content, "near");
    }
}
