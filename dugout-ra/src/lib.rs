//! dugout-ra library - Ranked Analysis module
//!
//! Turns OCR text from ranked stat-table screenshots into persisted
//! before/after snapshots, and serves the derived differentials and
//! metric trends over HTTP.

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;

pub mod api;
pub mod db;
pub mod error;
pub mod parser;
pub mod services;
pub mod stats;
pub mod types;

use services::ocr_client::OcrClient;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// OCR collaborator; None when not configured (ingestion disabled,
    /// queries still served)
    pub ocr: Option<Arc<OcrClient>>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, ocr: Option<Arc<OcrClient>>) -> Self {
        Self { db, ocr }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get, post};
    use tower_http::trace::TraceLayer;

    Router::new()
        .route("/api/ingest/batting", post(api::ingest_batting))
        .route("/api/ingest/pitching", post(api::ingest_pitching))
        .route("/api/differential/batting", get(api::get_batting_differential))
        .route("/api/differential/pitching", get(api::get_pitching_differential))
        .route("/api/trend/:metric", get(api::get_metric_trend))
        .route("/api/records/:family", delete(api::reset_records))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
