use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::{get, post}, Json, Router};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sitesearch_core::persist::load_index;
use sitesearch_core::query::{find_phrase, lookup_term, PhraseReport, TermHit};
use sitesearch_core::{InvertedIndex, LoadStatus};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer, AllowOrigin};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct FindParams {
    pub q: String,
}

#[derive(Serialize)]
pub struct FindResponse {
    pub query: String,
    pub took_s: f64,
    pub report: PhraseReport,
}

#[derive(Serialize)]
pub struct TermResponse {
    pub term: String,
    pub hits: Vec<TermHit>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub terms: usize,
    pub pages: usize,
}

#[derive(Serialize)]
pub struct LoadResponse {
    pub status: LoadStatus,
    pub message: String,
    pub terms: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub index_path: PathBuf,
    pub index: Arc<RwLock<InvertedIndex>>,
}

pub fn build_app(index_path: impl Into<PathBuf>) -> Result<Router> {
    // Load index at startup
    let index_path = index_path.into();
    let (index, status) = load_index(&index_path)?;
    tracing::info!(%status, terms = index.term_count(), path = %index_path.display(), "index ready");
    let app_state = AppState { index_path, index: Arc::new(RwLock::new(index)) };

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

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/find", get(find_handler))
        .route("/print/:word", get(print_handler))
        .route("/stats", get(stats_handler))
        .route("/load", post(load_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn find_handler(State(state): State<AppState>, Query(params): Query<FindParams>) -> Json<FindResponse> {
    let start = std::time::Instant::now();
    let report = find_phrase(&state.index.read(), &params.q);
    Json(FindResponse { query: params.q, took_s: start.elapsed().as_secs_f64(), report })
}

pub async fn print_handler(
    State(state): State<AppState>,
    Path(word): Path<String>,
) -> Result<Json<TermResponse>, (StatusCode, String)> {
    if word.split_whitespace().count() != 1 {
        return Err((StatusCode::BAD_REQUEST, "print supports single words only; use /find for phrases".into()));
    }
    let term = word.to_lowercase();
    match lookup_term(&state.index.read(), &term) {
        Some(hits) => Ok(Json(TermResponse { term, hits })),
        None => Err((StatusCode::NOT_FOUND, format!("no entries for '{term}'"))),
    }
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let index = state.index.read();
    Json(StatsResponse { terms: index.term_count(), pages: index.url_count() })
}

/// Re-read the index file on the blocking pool and swap it in.
pub async fn load_handler(State(state): State<AppState>) -> Result<Json<LoadResponse>, (StatusCode, String)> {
    let path = state.index_path.clone();
    let loaded = tokio::task::spawn_blocking(move || load_index(&path)).await.map_err(|e| {
        tracing::error!(error = %e, "reload task failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    let (index, status) = loaded.map_err(|e| {
        tracing::error!(error = %e, "reload failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    let terms = index.term_count();
    *state.index.write() = index;
    Ok(Json(LoadResponse { status, message: status.to_string(), terms }))
}
