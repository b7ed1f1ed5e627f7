use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sift_core::corpus::{index_corpus, load_corpus, InputDoc};
use sift_core::{max_workers, remove_duplicates, DocId, DocumentStatus, ExecutionMode, SearchEngine};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

type ApiError = (StatusCode, String);

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default)]
    pub status: DocumentStatus,
    /// 0 or absent runs sequentially; larger values are capped at the
    /// machine's available parallelism
    #[serde(default)]
    pub workers: usize,
}

#[derive(Deserialize)]
pub struct MatchParams {
    pub q: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_ms: u128,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub relevance: f64,
    pub rating: i32,
}

#[derive(Serialize)]
pub struct MatchResponse {
    pub doc_id: DocId,
    pub found: bool,
    pub status: DocumentStatus,
    pub words: Vec<String>,
}

#[derive(Clone)]
pub struct AppState {
    /// Searches share the read lock; add/remove/dedup take the write lock.
    pub engine: Arc<RwLock<SearchEngine>>,
    pub admin_token: Option<String>,
}

/// Build an engine from an optional corpus path and space separated stop words.
pub fn load_engine(corpus: Option<&str>, stop_words: &str) -> Result<SearchEngine> {
    let mut engine = SearchEngine::from_stop_text(stop_words)?;
    if let Some(path) = corpus {
        let docs = load_corpus(path)?;
        index_corpus(&mut engine, &docs)?;
    }
    Ok(engine)
}

/// Router over `engine`, with the admin token taken from `ADMIN_TOKEN`.
pub fn build_app(engine: SearchEngine) -> Router {
    build_app_with_token(engine, std::env::var("ADMIN_TOKEN").ok())
}

pub fn build_app_with_token(engine: SearchEngine, admin_token: Option<String>) -> Router {
    let app_state = AppState { engine: Arc::new(RwLock::new(engine)), admin_token };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/match/:doc_id", get(match_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/documents", post(add_document))
        .route("/documents/:doc_id", delete(remove_document))
        .route("/dedup", post(dedup))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn mode_for(workers: usize) -> ExecutionMode {
    if workers == 0 {
        ExecutionMode::Sequential
    } else {
        ExecutionMode::Parallel(workers.min(max_workers()))
    }
}

fn bad_request(err: sift_core::Error) -> ApiError {
    (StatusCode::BAD_REQUEST, err.to_string())
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let found = state
        .engine
        .read()
        .find_top_documents_with(mode_for(params.workers), &params.q, params.status)
        .map_err(bad_request)?;
    let results: Vec<SearchHit> = found
        .into_iter()
        .map(|d| SearchHit { doc_id: d.id, relevance: d.relevance, rating: d.rating })
        .collect();

    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, hits = results.len(), took_ms = elapsed.as_millis() as u64, "search");
    Ok(Json(SearchResponse {
        query: params.q,
        took_ms: elapsed.as_millis(),
        took_s: elapsed.as_secs_f64(),
        total_hits: results.len(),
        results,
    }))
}

pub async fn match_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
    Query(params): Query<MatchParams>,
) -> Result<Json<MatchResponse>, ApiError> {
    let engine = state.engine.read();
    let (words, status) = engine.match_document(&params.q, doc_id).map_err(bad_request)?;
    Ok(Json(MatchResponse {
        doc_id,
        found: engine.contains_document(doc_id),
        status,
        words: words.into_iter().map(str::to_string).collect(),
    }))
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<DocId>) -> Json<serde_json::Value> {
    let engine = state.engine.read();
    if !engine.contains_document(doc_id) {
        return Json(serde_json::json!({ "error": "not found" }));
    }
    let frequencies: BTreeMap<&str, f64> = engine.word_frequencies(doc_id);
    Json(serde_json::json!({
        "doc_id": doc_id,
        "frequencies": frequencies,
    }))
}

// --- Admin endpoints ---
async fn add_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(doc): Json<InputDoc>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    authorize(&state, &headers)?;
    let mut engine = state.engine.write();
    engine
        .add_document(doc.id, &doc.text, doc.status, &doc.ratings)
        .map_err(bad_request)?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "doc_id": doc.id, "num_docs": engine.document_count() })),
    ))
}

async fn remove_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(doc_id): Path<DocId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authorize(&state, &headers)?;
    let mut engine = state.engine.write();
    let removed = engine.contains_document(doc_id);
    engine.remove_document(doc_id);
    Ok(Json(serde_json::json!({ "doc_id": doc_id, "removed": removed })))
}

async fn dedup(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>, ApiError> {
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
