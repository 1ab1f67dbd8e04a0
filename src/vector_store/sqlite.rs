//! SQLite-based vector store implementation.
//!
//! Cosine similarity is computed in Rust over every stored row. Suitable for
//! local development and single-user datasets.

use super::{rank, Document, SearchResult, VectorStore};
use crate::error::{IngestError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        id TEXT PRIMARY KEY,
        video_id TEXT NOT NULL,
        content TEXT NOT NULL,
        metadata TEXT NOT NULL,
        embedding BLOB NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_documents_video_id ON documents(video_id);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Open (or create) a store at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| IngestError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn load_documents(conn: &Connection) -> Result<Vec<Document>> {
        let mut stmt = conn.prepare(
            "SELECT id, content, metadata, embedding, created_at FROM documents ORDER BY rowid",
        )?;

        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let content: String = row.get(1)?;
            let metadata: String = row.get(2)?;
            let embedding: Vec<u8> = row.get(3)?;
            let created_at: String = row.get(4)?;
            Ok((id, content, metadata, embedding, created_at))
        })?;

        let mut docs = Vec::new();
        for row in rows {
            let (id, content, metadata, embedding, created_at) = row?;
            docs.push(Document {
                id: uuid::Uuid::parse_str(&id).unwrap_or_default(),
                content,
                metadata: serde_json::from_str(&metadata)?,
                embedding: Self::bytes_to_embedding(&embedding),
                created_at: DateTime::parse_from_rfc3339(&created_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            });
        }
        Ok(docs)
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, docs), fields(count = docs.len()))]
    async fn add_documents(&self, docs: &[Document]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        for doc in docs {
            tx.execute(
                r#"
                INSERT OR REPLACE INTO documents (id, video_id, content, metadata, embedding, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    doc.id.to_string(),
                    doc.metadata.video_id,
                    doc.content,
                    serde_json::to_string(&doc.metadata)?,
                    Self::embedding_to_bytes(&doc.embedding),
                    doc.created_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        info!("Stored {} documents", docs.len());
        Ok(docs.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn similarity_search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let conn = self.lock()?;
        let docs = Self::load_documents(&conn)?;
        let results = rank(&docs, query_embedding, limit, min_score);
        debug!("Found {} matching documents", results.len());
        Ok(results)
    }

    #[instrument(skip(self))]
    async fn delete_by_video_id(&self, video_id: &str) -> Result<usize> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM documents WHERE video_id = ?1", params![video_id])?;
        info!("Deleted {} documents for video {}", deleted, video_id);
        Ok(deleted)
    }

    async fn document_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
