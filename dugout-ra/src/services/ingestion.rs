//! Ingestion orchestration: four images in, one committed snapshot group out
//!
//! The four OCR round trips of one ingestion are independent and run
//! concurrently. Failures are contained at the smallest scope: a field
//! degrades to a sentinel, a row is skipped, a failed image contributes
//! nothing. Only a store-level failure aborts the ingestion as a whole.

use crate::db::records;
use crate::parser::{assemble_batting, assemble_pitching};
use crate::services::ocr_client::OcrClient;
use crate::types::{BattingLine, PitchingLine, StatFamily, TimingLabel, RETAINED_SUBMISSIONS};
use dugout_common::{time, Result};
use futures::future::join_all;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

/// Images required on each side of the session
pub const IMAGES_PER_TIMING: usize = 2;

/// Typed 4-image ingestion input: two ordered lists, no positional magic
#[derive(Debug, Clone)]
pub struct ImageSet {
    pub before: Vec<Vec<u8>>,
    pub after: Vec<Vec<u8>>,
}

/// Summary of one committed ingestion
#[derive(Debug, Clone)]
pub struct IngestionOutcome {
    pub ingestion_id: Uuid,
    pub submitted_at: String,
    pub rows_before: usize,
    pub rows_after: usize,
    pub images_failed: usize,
}

/// Ingest four batting screenshots for a user.
pub async fn ingest_batting(
    pool: &SqlitePool,
    ocr: &OcrClient,
    user_id: i64,
    images: &ImageSet,
) -> Result<IngestionOutcome> {
    let (before_streams, after_streams, images_failed) = read_streams(ocr, images).await;

    let before: Vec<BattingLine> = before_streams.iter().flat_map(|s| assemble_batting(s)).collect();
    let after: Vec<BattingLine> = after_streams.iter().flat_map(|s| assemble_batting(s)).collect();

    let submitted_at = time::submission_key(time::now());
    let (rows_before, rows_after) =
        commit_batting(pool, user_id, &before, &after, &submitted_at).await?;

    let outcome = IngestionOutcome {
        ingestion_id: Uuid::new_v4(),
        submitted_at,
        rows_before,
        rows_after,
        images_failed,
    };
    log_outcome(StatFamily::Batting, user_id, &outcome);
    Ok(outcome)
}

/// Ingest four pitching screenshots for a user.
pub async fn ingest_pitching(
    pool: &SqlitePool,
    ocr: &OcrClient,
    user_id: i64,
    images: &ImageSet,
) -> Result<IngestionOutcome> {
    let (before_streams, after_streams, images_failed) = read_streams(ocr, images).await;

    let before: Vec<PitchingLine> =
        before_streams.iter().flat_map(|s| assemble_pitching(s)).collect();
    let after: Vec<PitchingLine> =
        after_streams.iter().flat_map(|s| assemble_pitching(s)).collect();

    let submitted_at = time::submission_key(time::now());
    let (rows_before, rows_after) =
        commit_pitching(pool, user_id, &before, &after, &submitted_at).await?;

    let outcome = IngestionOutcome {
        ingestion_id: Uuid::new_v4(),
        submitted_at,
        rows_before,
        rows_after,
        images_failed,
    };
    log_outcome(StatFamily::Pitching, user_id, &outcome);
    Ok(outcome)
}

/// Commit one batting snapshot group in a single transaction:
/// inserts (row failures skipped), then retention trim.
pub async fn commit_batting(
    pool: &SqlitePool,
    user_id: i64,
    before: &[BattingLine],
    after: &[BattingLine],
    submitted_at: &str,
) -> Result<(usize, usize)> {
    let mut tx = pool.begin().await?;
    let mut inserted = [0usize; 2];

    for (slot, (timing, lines)) in [(TimingLabel::Before, before), (TimingLabel::After, after)]
        .into_iter()
        .enumerate()
    {
        for line in lines {
            match records::insert_batting_row(&mut *tx, user_id, line, timing, submitted_at).await {
                Ok(true) => inserted[slot] += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        user_id,
                        player = %line.player_name,
                        error = %e,
                        "Skipping batting row that failed to insert"
                    );
                }
            }
        }
    }

    records::trim_to_latest(&mut *tx, StatFamily::Batting, user_id, RETAINED_SUBMISSIONS).await?;
    tx.commit().await?;

    Ok((inserted[0], inserted[1]))
}

/// Commit one pitching snapshot group; semantics as `commit_batting`.
pub async fn commit_pitching(
    pool: &SqlitePool,
    user_id: i64,
    before: &[PitchingLine],
    after: &[PitchingLine],
    submitted_at: &str,
) -> Result<(usize, usize)> {
    let mut tx = pool.begin().await?;
    let mut inserted = [0usize; 2];

    for (slot, (timing, lines)) in [(TimingLabel::Before, before), (TimingLabel::After, after)]
        .into_iter()
        .enumerate()
    {
        for line in lines {
            match records::insert_pitching_row(&mut *tx, user_id, line, timing, submitted_at).await {
                Ok(true) => inserted[slot] += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        user_id,
                        player = %line.player_name,
                        error = %e,
                        "Skipping pitching row that failed to insert"
                    );
                }
            }
        }
    }

    records::trim_to_latest(&mut *tx, StatFamily::Pitching, user_id, RETAINED_SUBMISSIONS).await?;
    tx.commit().await?;

    Ok((inserted[0], inserted[1]))
}

/// Run all four OCR calls concurrently. A failed call contributes an
/// empty token stream; the other images still commit.
async fn read_streams(
    ocr: &OcrClient,
    images: &ImageSet,
) -> (Vec<Vec<String>>, Vec<Vec<String>>, usize) {
    let before_futs = images.before.iter().map(|img| ocr.read_lines(img));
    let after_futs = images.after.iter().map(|img| ocr.read_lines(img));

    let (before_results, after_results) =
        futures::join!(join_all(before_futs), join_all(after_futs));

    let mut failed = 0;
    let mut absorb = |results: Vec<std::result::Result<Vec<String>, _>>| -> Vec<Vec<String>> {
        results
            .into_iter()
            .map(|result| match result {
                Ok(lines) => lines,
                Err(e) => {
                    failed += 1;
                    warn!(error = %e, "OCR failed for one image; treating its contribution as empty");
                    Vec::new()
                }
            })
            .collect()
    };

    let before_streams = absorb(before_results);
    let after_streams = absorb(after_results);
    (before_streams, after_streams, failed)
}

fn log_outcome(family: StatFamily, user_id: i64, outcome: &IngestionOutcome) {
    info!(
        family = family.as_str(),
        user_id,
        ingestion_id = %outcome.ingestion_id,
        submitted_at = %outcome.submitted_at,
        rows_before = outcome.rows_before,
        rows_after = outcome.rows_after,
        images_failed = outcome.images_failed,
        "Ingestion committed"
    );
}
