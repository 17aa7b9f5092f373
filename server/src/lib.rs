use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use parking_lot::{Mutex, RwLock};
use search_core::{
    process_queries, process_queries_joined, remove_duplicates, DocId, Document, DocumentStatus,
    RequestQueue, SearchEngine, SearchError, StopWords,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

type ApiError = (StatusCode, String);

pub struct ServerConfig {
    /// Space separated stop words
    pub stop_words: String,
    pub english_stop_words: bool,
    /// JSON array of documents indexed at startup
    pub seed: Option<PathBuf>,
    pub admin_token: Option<String>,
    pub history_window: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            stop_words: String::new(),
            english_stop_words: false,
            seed: None,
            admin_token: None,
            history_window: search_core::REQUEST_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDocument {
    pub id: DocId,
    pub text: String,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub ratings: Vec<i32>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default)]
    pub status: DocumentStatus,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<Document>,
}

#[derive(Deserialize)]
pub struct MatchParams {
    pub q: String,
    pub id: DocId,
}

#[derive(Serialize)]
pub struct MatchResponse {
    pub document_id: DocId,
    pub terms: Vec<String>,
    pub status: DocumentStatus,
}

#[derive(Deserialize)]
pub struct BatchRequest {
    pub queries: Vec<String>,
    #[serde(default)]
    pub joined: bool,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum BatchResponse {
    PerQuery { results: Vec<Vec<Document>> },
    Joined { results: Vec<Document> },
}

#[derive(Serialize)]
pub struct DocResponse {
    pub doc_id: DocId,
    pub status: DocumentStatus,
    pub rating: i32,
    pub term_frequencies: BTreeMap<String, f64>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub documents: usize,
    pub terms: usize,
    pub requests: usize,
    pub no_result_requests: usize,
    pub window: usize,
}

/// Shared state. Mutating endpoints take the engine's write lock, so queries never
/// observe a half-applied change.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RwLock<SearchEngine>>,
    pub history: Arc<Mutex<RequestQueue>>,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(engine: SearchEngine, history: RequestQueue, admin_token: Option<String>) -> Self {
        Self {
            engine: Arc::new(RwLock::new(engine)),
            history: Arc::new(Mutex::new(history)),
            admin_token,
        }
    }
}

pub fn build_app(config: ServerConfig) -> Result<Router> {
    let stop_words = if config.english_stop_words {
        StopWords::english()
    } else {
        StopWords::parse(&config.stop_words)?
    };
    let mut engine = SearchEngine::with_stop_words(stop_words);
    if let Some(seed) = &config.seed {
        let text = std::fs::read_to_string(seed).with_context(|| format!("reading {}", seed.display()))?;
        let docs: Vec<NewDocument> =
            serde_json::from_str(&text).with_context(|| format!("parsing {}", seed.display()))?;
        for doc in docs {
            engine
                .add_document(doc.id, &doc.text, doc.status, &doc.ratings)
                .with_context(|| format!("indexing document {}", doc.id))?;
        }
        tracing::info!(documents = engine.document_count(), terms = engine.term_count(), "seed index loaded");
    }
    let state = AppState::new(
        engine,
        RequestQueue::with_capacity(config.history_window),
        config.admin_token,
    );

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Ok(router(state).layer(cors).layer(TraceLayer::new_for_http()))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/match", get(match_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/batch", post(batch_handler))
        .route("/stats", get(stats_handler))
        .route("/documents", post(add_document))
        .route("/documents/:doc_id", delete(remove_document))
        .route("/dedup", post(dedup_handler))
        .with_state(state)
}

fn bad_request(err: SearchError) -> ApiError {
    (StatusCode::BAD_REQUEST, err.to_string())
}

/// Runs the query through the request history so empty results are counted.
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let results = {
        let engine = state.engine.read();
        state
            .history
            .lock()
            .add_find_request_by_status(&engine, &params.q, params.status)
            .map_err(bad_request)?
    };
    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, hits = results.len(), "search");
    Ok(Json(SearchResponse {
        query: params.q,
        took_s: elapsed.as_secs_f64(),
        total_hits: results.len(),
        results,
    }))
}

pub async fn match_handler(
    State(state): State<AppState>,
    Query(params): Query<MatchParams>,
) -> Result<Json<MatchResponse>, ApiError> {
    let matched = state.engine.read().match_document(&params.q, params.id).map_err(bad_request)?;
    Ok(Json(MatchResponse { document_id: params.id, terms: matched.terms, status: matched.status }))
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
) -> Result<Json<DocResponse>, ApiError> {
    let engine = state.engine.read();
    let doc = engine
        .document(doc_id)
        .ok_or((StatusCode::NOT_FOUND, format!("document {doc_id} not found")))?;
    Ok(Json(DocResponse {
        doc_id,
        status: doc.status(),
        rating: doc.rating(),
        term_frequencies: doc
            .term_frequencies()
            .iter()
            .map(|(term, tf)| (term.to_string(), *tf))
            .collect(),
    }))
}

pub async fn batch_handler(
    State(state): State<AppState>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    let engine = state.engine.read();
    let response = if req.joined {
        BatchResponse::Joined { results: process_queries_joined(&engine, &req.queries).map_err(bad_request)? }
    } else {
        BatchResponse::PerQuery { results: process_queries(&engine, &req.queries).map_err(bad_request)? }
    };
    Ok(Json(response))
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let engine = state.engine.read();
    let history = state.history.lock();
    Json(StatsResponse {
        documents: engine.document_count(),
        terms: engine.term_count(),
        requests: history.len(),
        no_result_requests: history.no_result_requests(),
        window: history.capacity(),
    })
}

// --- Admin endpoints ---
async fn add_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(doc): Json<NewDocument>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    authorize(&state, &headers)?;
    let mut engine = state.engine.write();
    engine
        .add_document(doc.id, &doc.text, doc.status, &doc.ratings)
        .map_err(bad_request)?;
    let indexed = engine.document(doc.id).is_some();
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "doc_id": doc.id, "indexed": indexed }))))
}

async fn remove_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(doc_id): Path<DocId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authorize(&state, &headers)?;
    let removed = state.engine.write().remove_document(doc_id);
    Ok(Json(serde_json::json!({ "doc_id": doc_id, "removed": removed })))
}

async fn dedup_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    authorize(&state, &headers)?;
    let removed = remove_duplicates(&mut state.engine.write());
    Ok(Json(serde_json::json!({ "removed": removed })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
