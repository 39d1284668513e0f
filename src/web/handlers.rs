//! HTTP request handlers

use super::state::AppState;
use crate::results::SearchResult;
use crate::search::SearchQuery;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{error, warn};

fn default_true() -> bool {
    true
}

/// Request body for /search
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Search query (required, non-empty)
    pub query: String,
    /// Results requested per source
    pub num_results: Option<usize>,
    /// Whether to re-score web results against the knowledge base
    #[serde(default = "default_true")]
    pub use_rag: bool,
    /// Whether to mix knowledge-base documents into the results
    #[serde(default = "default_true")]
    pub mix_with_documents: bool,
    /// Explicit provider selection
    #[serde(default)]
    pub providers: Option<Vec<String>>,
}

/// Response body for /search
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub total_results: usize,
    pub web_results_count: usize,
    pub document_results_count: usize,
    pub providers_used: Vec<String>,
    pub rag_enabled: bool,
    pub mixed_with_documents: bool,
    /// Elapsed seconds as a 2-decimal string
    pub search_time: String,
    /// ISO-8601 completion time
    pub timestamp: String,
}

/// Mixed web + knowledge-base search
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Response {
    if request.query.trim().is_empty() {
        return bad_request("query must not be empty");
    }

    let start = Instant::now();

    let num_results = request
        .num_results
        .unwrap_or(state.settings.search.default_num_results);

    let mut query = SearchQuery::simple(request.query.clone())
        .with_max_results(num_results)
        .with_rag(request.use_rag)
        .with_document_mixing(request.mix_with_documents);
    query.providers = request.providers;

    let web = state.fan_out.search(&query).await;

    // Knowledge-base retrieval is independent of the fan-out; a failure here
    // degrades the mix to web-only rather than failing the call.
    let kb_results = if query.use_rag && query.mix_with_documents {
        match state
            .knowledge
            .semantic_search(&query.text, query.max_results, None, None)
            .await
        {
            Ok(results) => results,
            Err(e) => {
                warn!("Knowledge-base retrieval failed, mixing web-only: {}", e);
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    let mixed = state.mixer.mix(&query, web, kb_results).await;

    let response = SearchResponse {
        query: request.query,
        total_results: mixed.results.len(),
        web_results_count: mixed.web_count,
        document_results_count: mixed.knowledge_count,
        providers_used: mixed.providers_used.clone(),
        rag_enabled: mixed.rag_enabled,
        mixed_with_documents: mixed.mixed_with_documents,
        results: mixed.results,
        search_time: format!("{:.2}", start.elapsed().as_secs_f64()),
        timestamp: Utc::now().to_rfc3339(),
    };

    Json(response).into_response()
}

/// Request body for /knowledge/search
#[derive(Debug, Deserialize)]
pub struct KnowledgeSearchRequest {
    pub query: String,
    pub limit: Option<usize>,
}

/// Cached text search over the knowledge base
pub async fn knowledge_search(
    State(state): State<AppState>,
    Json(request): Json<KnowledgeSearchRequest>,
) -> Response {
    if request.query.trim().is_empty() {
        return bad_request("query must not be empty");
    }

    let limit = request
        .limit
        .unwrap_or(state.settings.search.default_num_results);

    match state.knowledge.text_search(&request.query, limit).await {
        Ok((results, cached)) => {
            let count = results.len();
            Json(serde_json::json!({
                "results": results,
                "count": count,
                "cached": cached,
            }))
            .into_response()
        }
        Err(e) => internal_error("knowledge search failed", e),
    }
}

/// Request body for /knowledge/semantic
#[derive(Debug, Deserialize)]
pub struct SemanticSearchRequest {
    pub query: String,
    pub limit: Option<usize>,
    pub score_threshold: Option<f32>,
}

/// Semantic search over the knowledge base
pub async fn semantic_search(
    State(state): State<AppState>,
    Json(request): Json<SemanticSearchRequest>,
) -> Response {
    if request.query.trim().is_empty() {
        return bad_request("query must not be empty");
    }

    let limit = request
        .limit
        .unwrap_or(state.settings.search.default_num_results);

    match state
        .knowledge
        .semantic_search(&request.query, limit, request.score_threshold, None)
        .await
    {
        Ok(results) => {
            let count = results.len();
            Json(serde_json::json!({
                "results": results,
                "count": count,
            }))
            .into_response()
        }
        Err(e) => internal_error("semantic search failed", e),
    }
}

/// Request body for /documents
#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub title: String,
    pub content: String,
    pub doc_id: Option<i64>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Ingest a text document into the knowledge base
pub async fn create_document(
    State(state): State<AppState>,
    Json(request): Json<CreateDocumentRequest>,
) -> Response {
    if request.title.trim().is_empty() || request.content.trim().is_empty() {
        return bad_request("title and content must not be empty");
    }

    match state
        .knowledge
        .index_document(
            &request.title,
            &request.content,
            request.metadata,
            request.doc_id,
        )
        .await
    {
        Ok(indexed) => Json(indexed).into_response(),
        Err(e) => internal_error("document ingestion failed", e),
    }
}

/// Knowledge-base statistics
pub async fn knowledge_stats(State(state): State<AppState>) -> Response {
    match state.knowledge.stats().await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => internal_error("stats unavailable", e),
    }
}

/// Configured providers
pub async fn providers(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "providers": state.registry.names(),
        "available": crate::providers::ProviderLoader::available_providers(),
    }))
}

/// Provider usage statistics
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "total_searches": state.metrics.get_total_searches(),
        "providers": state.metrics.get_provider_stats(),
    }))
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "instance": state.instance_name(),
        "version": crate::VERSION,
    }))
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

fn internal_error(message: &str, e: impl std::fmt::Display) -> Response {
    error!("{}: {}", message, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "internal error" })),
    )
        .into_response()
}
