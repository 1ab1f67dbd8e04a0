//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets.

use super::{rank, Document, SearchResult, VectorStore};
use crate::error::{IngestError, Result};
use async_trait::async_trait;
use std::sync::RwLock;

/// In-memory vector store.
pub struct MemoryVectorStore {
    documents: RwLock<Vec<Document>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
        }
    }

    /// Snapshot of every stored document, in insertion order.
    pub fn documents(&self) -> Result<Vec<Document>> {
        let docs = self.documents.read().map_err(lock_error)?;
        Ok(docs.clone())
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_error<T>(e: std::sync::PoisonError<T>) -> IngestError {
    IngestError::VectorStore(format!("Failed to acquire lock: {}", e))
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn add_documents(&self, docs: &[Document]) -> Result<usize> {
        let mut store = self.documents.write().map_err(lock_error)?;
        store.extend_from_slice(docs);
        Ok(docs.len())
    }

    async fn similarity_search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let docs = self.documents.read().map_err(lock_error)?;
        Ok(rank(docs.iter(), query_embedding, limit, min_score))
    }

    async fn delete_by_video_id(&self, video_id: &str) -> Result<usize> {
        let mut docs = self.documents.write().map_err(lock_error)?;
        let before = docs.len();
        docs.retain(|d| d.metadata.video_id != video_id);
        Ok(before - docs.len())
    }

    async fn document_count(&self) -> Result<usize> {
        let docs = self.documents.read().map_err(lock_error)?;
        Ok(docs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::tests::document;

    #[tokio::test]
    async fn test_memory_vector_store() {
        let store = MemoryVectorStore::new();

        let doc1 = document("video1", 0, "Hello world", vec![1.0, 0.0, 0.0]);
        let doc2 = document("video1", 1, "Goodbye world", vec![0.0, 1.0, 0.0]);

        assert_eq!(store.add_documents(&[doc1, doc2]).await.unwrap(), 2);
        assert_eq!(store.document_count().await.unwrap(), 2);

        let results = store.similarity_search(&[1.0, 0.0, 0.0], 10, 0.0).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].score > results[1].score);
        assert_eq!(results[0].metadata.chunk_index, 0);

        let stored = store.documents().unwrap();
        assert_eq!(stored[1].content, "Goodbye world");

        store
            .add_documents(&[document("video2", 0, "Other", vec![0.0, 0.0, 1.0])])
            .await
            .unwrap();
        assert_eq!(store.delete_by_video_id("video1").await.unwrap(), 2);
        assert_eq!(store.document_count().await.unwrap(), 1);
    }
}
