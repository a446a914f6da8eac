//! Reset API handler
//!
//! DELETE /api/records/:family?user_id=. Wipes every snapshot row the
//! user has in that family; used before starting a fresh generation.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;

use crate::api::differential::UserQuery;
use crate::db::records;
use crate::error::{ApiError, ApiResult};
use crate::types::StatFamily;
use crate::AppState;

/// DELETE /api/records/:family response
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub status: &'static str,
    pub family: &'static str,
    pub deleted: u64,
}

/// DELETE /api/records/:family
pub async fn reset_records(
    State(state): State<AppState>,
    Path(family): Path<String>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<ResetResponse>> {
    let family: StatFamily = family.parse().map_err(ApiError::BadRequest)?;

    let deleted = records::delete_all_for_user(&state.db, family, query.user_id).await?;
    tracing::info!(
        family = family.as_str(),
        user_id = query.user_id,
        deleted,
        "Reset snapshot records"
    );

    Ok(Json(ResetResponse {
        status: "ok",
        family: family.as_str(),
        deleted,
    }))
}
