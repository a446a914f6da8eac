//! Ingestion API handlers
//!
//! POST /api/ingest/batting and /api/ingest/pitching. The request carries
//! the images as two ordered base64 lists, so "first two are before, last
//! two are after" never exists as positional convention anywhere.

use axum::{extract::State, Json};
use base64::Engine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::services::ingestion::{self, ImageSet, IngestionOutcome, IMAGES_PER_TIMING};
use crate::AppState;

/// POST /api/ingest/{batting,pitching} request
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub user_id: i64,
    /// Two base64-encoded screenshots taken before the session
    pub before: Vec<String>,
    /// Two base64-encoded screenshots taken after the session
    pub after: Vec<String>,
}

/// POST /api/ingest/{batting,pitching} response
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub status: String,
    pub ingestion_id: Uuid,
    pub submitted_at: String,
    pub rows_before: usize,
    pub rows_after: usize,
    pub images_failed: usize,
}

impl From<IngestionOutcome> for IngestResponse {
    fn from(outcome: IngestionOutcome) -> Self {
        Self {
            status: "ok".to_string(),
            ingestion_id: outcome.ingestion_id,
            submitted_at: outcome.submitted_at,
            rows_before: outcome.rows_before,
            rows_after: outcome.rows_after,
            images_failed: outcome.images_failed,
        }
    }
}

/// POST /api/ingest/batting
pub async fn ingest_batting(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> ApiResult<Json<IngestResponse>> {
    let images = decode_image_set(&request)?;
    let ocr = require_ocr(&state)?;

    let outcome =
        ingestion::ingest_batting(&state.db, ocr.as_ref(), request.user_id, &images).await?;
    Ok(Json(outcome.into()))
}

/// POST /api/ingest/pitching
pub async fn ingest_pitching(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> ApiResult<Json<IngestResponse>> {
    let images = decode_image_set(&request)?;
    let ocr = require_ocr(&state)?;

    let outcome =
        ingestion::ingest_pitching(&state.db, ocr.as_ref(), request.user_id, &images).await?;
    Ok(Json(outcome.into()))
}

fn require_ocr(
    state: &AppState,
) -> Result<std::sync::Arc<crate::services::ocr_client::OcrClient>, ApiError> {
    state.ocr.clone().ok_or_else(|| {
        ApiError::Unavailable("OCR service is not configured on this instance".to_string())
    })
}

/// Validate the 2+2 image contract and decode the payloads.
fn decode_image_set(request: &IngestRequest) -> Result<ImageSet, ApiError> {
    if request.before.len() != IMAGES_PER_TIMING || request.after.len() != IMAGES_PER_TIMING {
        return Err(ApiError::BadRequest(format!(
            "Expected exactly {} 'before' and {} 'after' images",
            IMAGES_PER_TIMING, IMAGES_PER_TIMING
        )));
    }

    let decode_all = |payloads: &[String], label: &str| {
        payloads
            .iter()
            .enumerate()
            .map(|(i, payload)| {
                base64::engine::general_purpose::STANDARD
                    .decode(payload)
                    .map_err(|_| {
                        ApiError::BadRequest(format!(
                            "'{}' image {} is not valid base64",
                            label,
                            i + 1
                        ))
                    })
            })
            .collect::<Result<Vec<Vec<u8>>, ApiError>>()
    };

    Ok(ImageSet {
        before: decode_all(&request.before, "before")?,
        after: decode_all(&request.after, "after")?,
    })
}
