//! Supabase (PostgREST + pgvector) vector store.
//!
//! Rows are written to `{url}/rest/v1/{table}` and searched through the
//! `{url}/rest/v1/rpc/{query_name}` function. The table needs `content`,
//! `metadata` (jsonb) and `embedding` (vector) columns; the function takes
//! `query_embedding`, `match_count` and `filter` and returns rows with a
//! `similarity` column.

use super::{Document, SearchResult, VectorStore};
use crate::chunking::ChunkMetadata;
use crate::config::SupabaseCredentials;
use crate::error::{IngestError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Rows per insert request.
const INSERT_BATCH_SIZE: usize = 500;

#[derive(Serialize)]
struct InsertRow<'a> {
    content: &'a str,
    metadata: &'a ChunkMetadata,
    embedding: &'a [f32],
}

#[derive(Serialize)]
struct MatchRequest<'a> {
    query_embedding: &'a [f32],
    match_count: usize,
    filter: serde_json::Value,
}

#[derive(Deserialize)]
struct MatchRow {
    content: String,
    metadata: ChunkMetadata,
    #[serde(default)]
    similarity: f32,
}

/// Vector store backed by a Supabase project.
pub struct SupabaseVectorStore {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
    table_name: String,
    query_name: String,
}

impl SupabaseVectorStore {
    pub fn new(
        client: reqwest::Client,
        credentials: &SupabaseCredentials,
        table_name: &str,
        query_name: &str,
    ) -> Self {
        Self {
            client,
            base_url: credentials.url.trim_end_matches('/').to_string(),
            service_key: credentials.service_key.clone(),
            table_name: table_name.to_string(),
            query_name: query_name.to_string(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table_name)
    }

    fn rpc_url(&self) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, self.query_name)
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.service_key)
            .map_err(|e| IngestError::Config(format!("Invalid Supabase service key: {}", e)))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.service_key))
            .map_err(|e| IngestError::Config(format!("Invalid Supabase service key: {}", e)))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }

    async fn check(response: reqwest::Response, operation: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_string());
        Err(IngestError::VectorStore(format!(
            "Supabase {} failed ({}): {}",
            operation, status, body
        )))
    }
}

/// Total from a PostgREST `Content-Range` header such as `0-0/42` or `*/0`.
fn parse_content_range_total(value: &str) -> Option<usize> {
    value.rsplit('/').next()?.trim().parse().ok()
}

#[async_trait]
impl VectorStore for SupabaseVectorStore {
    #[instrument(skip(self, docs), fields(count = docs.len(), table = %self.table_name))]
    async fn add_documents(&self, docs: &[Document]) -> Result<usize> {
        let headers = self.auth_headers()?;
        let url = self.table_url();

        for batch in docs.chunks(INSERT_BATCH_SIZE) {
            let rows: Vec<InsertRow<'_>> = batch
                .iter()
                .map(|doc| InsertRow {
                    content: &doc.content,
                    metadata: &doc.metadata,
                    embedding: &doc.embedding,
                })
                .collect();

            let response = self
                .client
                .post(&url)
                .headers(headers.clone())
                .header("Prefer", "return=minimal")
                .json(&rows)
                .send()
                .await?;
            Self::check(response, "insert").await?;
            debug!("Inserted batch of {} rows", batch.len());
        }

        info!("Stored {} documents in Supabase", docs.len());
        Ok(docs.len())
    }

    #[instrument(skip(self, query_embedding), fields(query = %self.query_name))]
    async fn similarity_search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let request = MatchRequest {
            query_embedding,
            match_count: limit,
            filter: serde_json::json!({}),
        };

        let response = self
            .client
            .post(self.rpc_url())
            .headers(self.auth_headers()?)
            .json(&request)
            .send()
            .await?;
        let rows: Vec<MatchRow> = Self::check(response, "match").await?.json().await?;

        let mut results: Vec<SearchResult> = rows
            .into_iter()
            .filter(|row| row.similarity >= min_score)
            .map(|row| SearchResult {
                content: row.content,
                metadata: row.metadata,
                score: row.similarity,
            })
            .collect();
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);
        Ok(results)
    }

    #[instrument(skip(self), fields(table = %self.table_name))]
    async fn delete_by_video_id(&self, video_id: &str) -> Result<usize> {
        let filter = format!("eq.{}", video_id);
        let response = self
            .client
            .delete(self.table_url())
            .query(&[("metadata->>videoId", filter.as_str())])
            .headers(self.auth_headers()?)
            .header("Prefer", "return=minimal,count=exact")
            .send()
            .await?;
        let response = Self::check(response, "delete").await?;

        let deleted = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total)
            .unwrap_or(0);
        info!("Deleted {} documents for video {}", deleted, video_id);
        Ok(deleted)
    }

    async fn document_count(&self) -> Result<usize> {
        let response = self
            .client
            .get(self.table_url())
            .query(&[("select", "content")])
            .headers(self.auth_headers()?)
            .header("Prefer", "count=exact")
            .header("Range", "0-0")
            .send()
            .await?;
        let response = Self::check(response, "count").await?;

        response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or_else(|| IngestError::VectorStore("Supabase count response had no total".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::tests::document;
    use axum::{
        extract::{Query, State},
        http::{HeaderMap as AxumHeaders, StatusCode},
        response::IntoResponse,
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Vec<Value>>>;

    fn authorized(headers: &AxumHeaders) -> bool {
        headers.get("apikey").and_then(|v| v.to_str().ok()) == Some("service-key")
            && headers.get("authorization").and_then(|v| v.to_str().ok()) == Some("Bearer service-key")
    }

    async fn spawn_supabase() -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));

        async fn insert(
            State(captured): State<Captured>,
            headers: AxumHeaders,
            Json(body): Json<Value>,
        ) -> impl IntoResponse {
            if !authorized(&headers) {
                return StatusCode::UNAUTHORIZED.into_response();
            }
            if let Some(rows) = body.as_array() {
                captured.lock().unwrap().extend(rows.iter().cloned());
            }
            StatusCode::CREATED.into_response()
        }

        async fn count(State(captured): State<Captured>) -> impl IntoResponse {
            let total = captured.lock().unwrap().len();
            (
                StatusCode::PARTIAL_CONTENT,
                [("content-range", format!("0-0/{}", total))],
                Json(json!([])),
            )
        }

        async fn remove(
            State(captured): State<Captured>,
            Query(params): Query<HashMap<String, String>>,
        ) -> impl IntoResponse {
            let video_id = params
                .get("metadata->>videoId")
                .and_then(|f| f.strip_prefix("eq."))
                .unwrap_or_default()
                .to_string();
            let mut rows = captured.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| r["metadata"]["videoId"] != video_id.as_str());
            let deleted = before - rows.len();
            (StatusCode::NO_CONTENT, [("content-range", format!("*/{}", deleted))])
        }

        async fn matches(headers: AxumHeaders, Json(body): Json<Value>) -> impl IntoResponse {
            if !authorized(&headers) {
                return StatusCode::UNAUTHORIZED.into_response();
            }
            assert_eq!(body["match_count"], 2);
            assert!(body["query_embedding"].is_array());
            let metadata = |i: usize| {
                json!({
                    "videoId": "dQw4w9WgXcQ",
                    "videoTitle": "Title",
                    "chunkIndex": i,
                    "totalChunks": 3,
                    "source": "https://youtu.be/dQw4w9WgXcQ"
                })
            };
            Json(json!([
                {"id": 1, "content": "first", "metadata": metadata(0), "similarity": 0.9},
                {"id": 2, "content": "second", "metadata": metadata(1), "similarity": 0.2}
            ]))
            .into_response()
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let app = Router::new()
            .route("/rest/v1/documents", post(insert).get(count).delete(remove))
            .route("/rest/v1/rpc/match_documents", post(matches))
            .with_state(captured.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (url, captured)
    }

    fn store(url: &str, key: &str) -> SupabaseVectorStore {
        let credentials = SupabaseCredentials {
            url: url.to_string(),
            service_key: key.to_string(),
        };
        SupabaseVectorStore::new(reqwest::Client::new(), &credentials, "documents", "match_documents")
    }

    #[tokio::test]
    async fn test_insert_sends_content_metadata_embedding() {
        let (url, captured) = spawn_supabase().await;
        let store = store(&url, "service-key");

        let docs = vec![
            document("dQw4w9WgXcQ", 0, "one", vec![0.1, 0.2]),
            document("dQw4w9WgXcQ", 1, "two", vec![0.3, 0.4]),
        ];
        assert_eq!(store.add_documents(&docs).await.unwrap(), 2);

        let rows = captured.lock().unwrap().clone();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["content"], "one");
        assert_eq!(rows[0]["metadata"]["videoId"], "dQw4w9WgXcQ");
        assert_eq!(rows[1]["metadata"]["chunkIndex"], 1);
        assert_eq!(rows[1]["embedding"].as_array().unwrap().len(), 2);
        assert!(rows[0].get("id").is_none());

        assert_eq!(store.document_count().await.unwrap(), 2);

        assert_eq!(store.delete_by_video_id("dQw4w9WgXcQ").await.unwrap(), 2);
        assert_eq!(store.document_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_match_filters_by_score() {
        let (url, _) = spawn_supabase().await;
        let store = store(&url, "service-key");

        let results = store.similarity_search(&[0.1, 0.2], 2, 0.5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "first");
        assert_eq!(results[0].metadata.video_title, "Title");
    }

    #[tokio::test]
    async fn test_rejected_key_is_store_error() {
        let (url, captured) = spawn_supabase().await;
        let store = store(&url, "wrong");

        let err = store
            .add_documents(&[document("v", 0, "x", vec![1.0])])
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::VectorStore(ref m) if m.contains("401")));
        assert!(captured.lock().unwrap().is_empty());
    }

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("0-0/42"), Some(42));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-0/*"), None);
    }
}
