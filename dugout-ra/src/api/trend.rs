//! Trend API handler
//!
//! GET /api/trend/:metric?user_id=. Charts one derived metric across the
//! retained submission groups, oldest first.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;

use crate::api::differential::UserQuery;
use crate::db::records;
use crate::error::{ApiError, ApiResult};
use crate::stats::trend::{build_trend, TrendMetric, TrendSeries};
use crate::types::{StatFamily, RETAINED_SUBMISSIONS};
use crate::AppState;

/// Trend response: the series plus the usual status envelope
#[derive(Debug, Serialize)]
pub struct TrendResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(flatten)]
    pub series: TrendSeries,
}

/// GET /api/trend/:metric
pub async fn get_metric_trend(
    State(state): State<AppState>,
    Path(metric): Path<String>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<TrendResponse>> {
    let metric: TrendMetric = metric.parse().map_err(ApiError::BadRequest)?;

    let mut timestamps = records::fetch_recent_timestamps(
        &state.db,
        StatFamily::Batting,
        query.user_id,
        RETAINED_SUBMISSIONS,
    )
    .await?;

    if timestamps.is_empty() {
        return Ok(Json(TrendResponse {
            status: "empty",
            message: Some("No matching records found."),
            series: build_trend(metric, &[]),
        }));
    }

    // Newest-first from the store; the chart axis runs oldest-first
    timestamps.reverse();

    let mut groups = Vec::with_capacity(timestamps.len());
    for submitted_at in timestamps {
        let lines = records::fetch_batting_group(&state.db, query.user_id, &submitted_at).await?;
        groups.push((submitted_at, lines));
    }

    let series = build_trend(metric, &groups);
    Ok(Json(TrendResponse {
        status: "ok",
        message: None,
        series,
    }))
}
