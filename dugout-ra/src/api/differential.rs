//! Differential API handlers
//!
//! GET /api/differential/{batting,pitching}?user_id=. Values come back
//! fully computed and already rounded, with column labels in fixed order;
//! the presentation collaborator only has to draw them.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::records;
use crate::error::ApiResult;
use crate::stats::differential::{
    batting_differential, batting_row, pitching_differential, pitching_row, sort_batting,
    sort_pitching, BATTING_COLUMNS, PITCHING_COLUMNS,
};
use crate::AppState;

const NO_MATCHING_RECORDS: &str = "No matching records found.";

/// Query parameter shared by the read endpoints
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: i64,
}

/// Differential table response
#[derive(Debug, Serialize)]
pub struct DifferentialResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<Value>>,
}

impl DifferentialResponse {
    fn empty(columns: &'static [&'static str]) -> Self {
        Self {
            status: "empty",
            message: Some(NO_MATCHING_RECORDS),
            columns: columns.to_vec(),
            rows: Vec::new(),
        }
    }

    fn ok(columns: &'static [&'static str], rows: Vec<Vec<Value>>) -> Self {
        Self {
            status: "ok",
            message: None,
            columns: columns.to_vec(),
            rows,
        }
    }
}

/// GET /api/differential/batting
///
/// One row per player present in both timing groups of the most recent
/// submission, sorted descending by OPS.
pub async fn get_batting_differential(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<DifferentialResponse>> {
    let pairs = records::fetch_batting_pairs(&state.db, query.user_id).await?;
    if pairs.is_empty() {
        return Ok(Json(DifferentialResponse::empty(&BATTING_COLUMNS)));
    }

    let mut diffs: Vec<_> = pairs
        .iter()
        .map(|(before, after)| batting_differential(before, after))
        .collect();
    sort_batting(&mut diffs);

    let rows = diffs.iter().map(batting_row).collect();
    Ok(Json(DifferentialResponse::ok(&BATTING_COLUMNS, rows)))
}

/// GET /api/differential/pitching
///
/// One row per paired pitcher, sorted ascending by ERA.
pub async fn get_pitching_differential(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<DifferentialResponse>> {
    let pairs = records::fetch_pitching_pairs(&state.db, query.user_id).await?;
    if pairs.is_empty() {
        return Ok(Json(DifferentialResponse::empty(&PITCHING_COLUMNS)));
    }

    let mut diffs: Vec<_> = pairs
        .iter()
        .map(|(before, after)| pitching_differential(before, after))
        .collect();
    sort_pitching(&mut diffs);

    let rows = diffs.iter().map(pitching_row).collect();
    Ok(Json(DifferentialResponse::ok(&PITCHING_COLUMNS, rows)))
}
