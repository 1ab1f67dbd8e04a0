//! HTTP API for ingestion and retrieval.

use crate::error::IngestError;
use crate::orchestrator::{IngestRequest, IngestResponse, Orchestrator};
use crate::vector_store::SearchResult;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, warn};

/// Build the router over a shared orchestrator.
pub fn router(orchestrator: Arc<Orchestrator>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/ingest", post(ingest))
        .route("/search", post(search))
        .layer(cors)
        .with_state(orchestrator)
}

/// HTTP status for a failed request.
pub fn status_for(err: &IngestError) -> StatusCode {
    match err {
        IngestError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        e if e.is_transcript_unavailable() => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest {
    query: String,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default = "default_min_score")]
    min_score: f32,
}

fn default_limit() -> usize {
    5
}

fn default_min_score() -> f32 {
    0.3
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<&'static str>,
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Body rejections become `InvalidInput` so clients always see the JSON error shape.
fn rejected(rejection: JsonRejection) -> IngestError {
    warn!("Rejected request body: {}", rejection.body_text());
    IngestError::InvalidInput(rejection.body_text())
}

async fn ingest(
    State(orchestrator): State<Arc<Orchestrator>>,
    body: Result<Json<IngestRequest>, JsonRejection>,
) -> impl IntoResponse {
    let result = match body {
        Ok(Json(req)) => orchestrator.ingest_logged(&req).await,
        Err(rejection) => Err(rejected(rejection)),
    };
    match result {
        Ok(outcome) => (StatusCode::OK, Json(IngestResponse::success(&outcome))),
        Err(e) => (status_for(&e), Json(IngestResponse::failure(&e))),
    }
}

async fn search(
    State(orchestrator): State<Arc<Orchestrator>>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> impl IntoResponse {
    let result = match body {
        Ok(Json(req)) => orchestrator.search(&req.query, req.limit, req.min_score).await,
        Err(rejection) => Err(rejected(rejection)),
    };
    match result {
        Ok(results) => Json(SearchResponse { results }).into_response(),
        Err(e) => {
            error!("Search failed: {}", e);
            (
                status_for(&e),
                Json(ErrorResponse {
                    error: e.to_string(),
                    suggestion: e.suggestion(),
                }),
            )
                .into_response()
        }
    }
}
