//! Integration tests for dugout-ra API endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - Differential endpoints (data, empty-result, ordering)
//! - Trend endpoint (metric validation, gap alignment)
//! - Ingestion request validation and OCR-unavailable handling
//! - Reset endpoint

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot` method

use dugout_ra::db::records;
use dugout_ra::types::{BattingLine, TimingLabel};
use dugout_ra::{build_router, AppState};

/// Test helper: fresh database in a temp folder
async fn setup_test_db() -> (tempfile::TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("Should create temp dir");
    let db_path = dir.path().join("dugout.db");
    let pool = dugout_common::db::init_database(&db_path)
        .await
        .expect("Should initialize test database");
    (dir, pool)
}

/// Test helper: create app with test state (no OCR client)
fn setup_app(db: SqlitePool) -> axum::Router {
    let state = AppState::new(db, None);
    build_router(state)
}

/// Test helper: request without body
fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: JSON request
fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn bat(name: &str, ab: i64, h: i64, slg: f64) -> BattingLine {
    BattingLine {
        player_name: name.to_string(),
        ab,
        h,
        bb: 0,
        slg,
        bbk: 0.0,
        hr: 0,
        so: 0,
        sb: 0,
        sb_pct: 0,
    }
}

async fn seed_batting_pair(
    pool: &SqlitePool,
    user_id: i64,
    before: BattingLine,
    after: BattingLine,
    submitted_at: &str,
) {
    let mut conn = pool.acquire().await.unwrap();
    records::insert_batting_row(&mut conn, user_id, &before, TimingLabel::Before, submitted_at)
        .await
        .unwrap();
    records::insert_batting_row(&mut conn, user_id, &after, TimingLabel::After, submitted_at)
        .await
        .unwrap();
}

// =============================================================================
// Health Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db);

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "dugout-ra");
    assert!(body["version"].is_string());
}

// =============================================================================
// Differential Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_batting_differential_empty_result() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db);

    let response = app
        .oneshot(test_request("GET", "/api/differential/batting?user_id=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "empty");
    assert_eq!(body["message"], "No matching records found.");
    assert_eq!(body["rows"].as_array().unwrap().len(), 0);
    // Column labels are present even with no rows
    assert_eq!(body["columns"][0], "Player Name");
}

#[tokio::test]
async fn test_batting_differential_sorted_by_ops_descending() {
    let (_dir, db) = setup_test_db().await;

    // trout improves a lot, bench barely moves
    seed_batting_pair(&db, 1, bat("trout", 10, 3, 0.500), bat("trout", 14, 9, 0.900), "t1").await;
    seed_batting_pair(&db, 1, bat("bench", 10, 3, 0.300), bat("bench", 14, 4, 0.310), "t1").await;

    let app = setup_app(db);
    let response = app
        .oneshot(test_request("GET", "/api/differential/batting?user_id=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");

    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], "trout");
    assert_eq!(rows[1][0], "bench");

    let columns: Vec<&str> = body["columns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_str().unwrap())
        .collect();
    assert_eq!(columns[0], "Player Name");
    assert_eq!(columns.len(), rows[0].as_array().unwrap().len());
}

#[tokio::test]
async fn test_differential_ignores_unpaired_players() {
    let (_dir, db) = setup_test_db().await;

    seed_batting_pair(&db, 1, bat("trout", 10, 3, 0.5), bat("trout", 14, 5, 0.571), "t1").await;
    // after-only player: no pair, silently omitted
    let mut conn = db.acquire().await.unwrap();
    records::insert_batting_row(&mut conn, 1, &bat("rookie", 4, 1, 0.4), TimingLabel::After, "t1")
        .await
        .unwrap();
    drop(conn);

    let app = setup_app(db);
    let body = extract_json(
        app.oneshot(test_request("GET", "/api/differential/batting?user_id=1"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;

    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], "trout");
}

#[tokio::test]
async fn test_differential_scoped_by_user() {
    let (_dir, db) = setup_test_db().await;
    seed_batting_pair(&db, 1, bat("trout", 10, 3, 0.5), bat("trout", 14, 5, 0.571), "t1").await;

    let app = setup_app(db);
    let body = extract_json(
        app.oneshot(test_request("GET", "/api/differential/batting?user_id=2"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    assert_eq!(body["status"], "empty");
}

#[tokio::test]
async fn test_pitching_differential_empty_result() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db);

    let body = extract_json(
        app.oneshot(test_request("GET", "/api/differential/pitching?user_id=1"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    assert_eq!(body["status"], "empty");
    assert_eq!(body["columns"][4], "ERA");
}

// =============================================================================
// Trend Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_trend_unknown_metric_is_bad_request() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db);

    let response = app
        .oneshot(test_request("GET", "/api/trend/exit_velocity?user_id=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Unknown trend metric"));
}

#[tokio::test]
async fn test_trend_empty_result() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db);

    let body = extract_json(
        app.oneshot(test_request("GET", "/api/trend/avg?user_id=1"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    assert_eq!(body["status"], "empty");
    assert_eq!(body["metric"], "avg");
}

#[tokio::test]
async fn test_trend_aligns_absent_player_with_null() {
    let (_dir, db) = setup_test_db().await;

    seed_batting_pair(&db, 1, bat("trout", 8, 2, 0.4), bat("trout", 10, 3, 0.5), "t1").await;
    seed_batting_pair(&db, 1, bat("betts", 6, 2, 0.4), bat("betts", 8, 2, 0.45), "t2").await;
    seed_batting_pair(&db, 1, bat("trout", 16, 8, 0.6), bat("trout", 20, 8, 0.65), "t3").await;

    let app = setup_app(db);
    let body = extract_json(
        app.oneshot(test_request("GET", "/api/trend/avg?user_id=1"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["timestamps"], json!(["t1", "t2", "t3"]));
    // Cumulative AVG from the "after" rows: 3/10, absent, 8/20
    assert_eq!(body["players"]["trout"], json!([0.3, null, 0.4]));
    assert_eq!(body["players"]["betts"], json!([null, 0.25, null]));
}

// =============================================================================
// Ingestion Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_ingest_without_ocr_is_service_unavailable() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db);

    let payload = json!({
        "user_id": 1,
        "before": ["aGk=", "aGk="],
        "after": ["aGk=", "aGk="],
    });
    let response = app
        .oneshot(json_request("POST", "/api/ingest/batting", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_ingest_wrong_image_count_is_bad_request() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db);

    let payload = json!({
        "user_id": 1,
        "before": ["aGk="],
        "after": ["aGk=", "aGk=", "aGk="],
    });
    let response = app
        .oneshot(json_request("POST", "/api/ingest/pitching", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("images"));
}

// =============================================================================
// Reset Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_reset_deletes_user_rows() {
    let (_dir, db) = setup_test_db().await;
    seed_batting_pair(&db, 1, bat("trout", 10, 3, 0.5), bat("trout", 14, 5, 0.571), "t1").await;

    let app = setup_app(db.clone());
    let body = extract_json(
        app.oneshot(test_request("DELETE", "/api/records/batting?user_id=1"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["deleted"], 2);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ranked_bat_stats WHERE user_id = 1")
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_reset_unknown_family_is_bad_request() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db);

    let response = app
        .oneshot(test_request("DELETE", "/api/records/fielding?user_id=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
