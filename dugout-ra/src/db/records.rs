//! Snapshot row persistence and retrieval
//!
//! The store owns all persisted data; the differential engine and trend
//! aggregator are pure functions over what these queries return. Writes
//! that belong to one ingestion take a `&mut SqliteConnection` so the
//! caller can run them inside a single transaction.

use crate::types::{BattingLine, PitchingLine, StatFamily, TimingLabel};
use dugout_common::Result;
use sqlx::{Row, SqliteConnection, SqlitePool};

/// Remove every snapshot row for a user. Idempotent.
pub async fn delete_all_for_user(
    pool: &SqlitePool,
    family: StatFamily,
    user_id: i64,
) -> Result<u64> {
    let result = sqlx::query(&format!("DELETE FROM {} WHERE user_id = ?", family.table()))
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Insert one batting row; a duplicate of the
/// `(user_id, player_name, timing, submitted_at)` key is a silent no-op.
///
/// Returns whether a row was actually written.
pub async fn insert_batting_row(
    conn: &mut SqliteConnection,
    user_id: i64,
    line: &BattingLine,
    timing: TimingLabel,
    submitted_at: &str,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO ranked_bat_stats
            (user_id, player_name, ab, h, bb, slg, bbk, hr, so, sb, sb_pct, timing, submitted_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (user_id, player_name, timing, submitted_at) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(&line.player_name)
    .bind(line.ab)
    .bind(line.h)
    .bind(line.bb)
    .bind(line.slg)
    .bind(line.bbk)
    .bind(line.hr)
    .bind(line.so)
    .bind(line.sb)
    .bind(line.sb_pct)
    .bind(timing.as_str())
    .bind(submitted_at)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Insert one pitching row; conflict semantics as for batting.
pub async fn insert_pitching_row(
    conn: &mut SqliteConnection,
    user_id: i64,
    line: &PitchingLine,
    timing: TimingLabel,
    submitted_at: &str,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO ranked_pitch_stats
            (user_id, player_name, outs, r, h, bb, slg, hr, so, g, timing, submitted_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (user_id, player_name, timing, submitted_at) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(&line.player_name)
    .bind(line.outs)
    .bind(line.r)
    .bind(line.h)
    .bind(line.bb)
    .bind(line.slg)
    .bind(line.hr)
    .bind(line.so)
    .bind(line.g)
    .bind(timing.as_str())
    .bind(submitted_at)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Keep only the `keep` most recent distinct submission timestamps for a
/// user; older groups are deleted. Runs inside the ingestion transaction,
/// after its inserts, so the just-inserted group is always among the kept.
pub async fn trim_to_latest(
    conn: &mut SqliteConnection,
    family: StatFamily,
    user_id: i64,
    keep: usize,
) -> Result<u64> {
    let sql = format!(
        r#"
        DELETE FROM {table}
        WHERE user_id = ?
          AND submitted_at NOT IN (
              SELECT submitted_at FROM {table}
              WHERE user_id = ?
              GROUP BY submitted_at
              ORDER BY submitted_at DESC
              LIMIT ?
          )
        "#,
        table = family.table()
    );

    let result = sqlx::query(&sql)
        .bind(user_id)
        .bind(user_id)
        .bind(keep as i64)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

/// Joined before/after batting rows for the most recent submission group,
/// matched on player name within the group. Input order preserved.
pub async fn fetch_batting_pairs(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<(BattingLine, BattingLine)>> {
    let rows = sqlx::query(
        r#"
        SELECT a.player_name,
               a.ab, a.h, a.bb, a.slg, a.bbk, a.hr, a.so, a.sb, a.sb_pct,
               b.ab, b.h, b.bb, b.slg, b.bbk, b.hr, b.so, b.sb, b.sb_pct
        FROM ranked_bat_stats a
        JOIN ranked_bat_stats b
          ON b.user_id = a.user_id
         AND b.player_name = a.player_name
         AND b.submitted_at = a.submitted_at
         AND b.timing = 'after'
        WHERE a.user_id = ?
          AND a.timing = 'before'
          AND a.submitted_at = (
              SELECT MAX(submitted_at) FROM ranked_bat_stats WHERE user_id = a.user_id
          )
        ORDER BY a.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let pairs = rows
        .iter()
        .map(|row| {
            let name: String = row.get(0);
            let before = BattingLine {
                player_name: name.clone(),
                ab: row.get(1),
                h: row.get(2),
                bb: row.get(3),
                slg: row.get(4),
                bbk: row.get(5),
                hr: row.get(6),
                so: row.get(7),
                sb: row.get(8),
                sb_pct: row.get(9),
            };
            let after = BattingLine {
                player_name: name,
                ab: row.get(10),
                h: row.get(11),
                bb: row.get(12),
                slg: row.get(13),
                bbk: row.get(14),
                hr: row.get(15),
                so: row.get(16),
                sb: row.get(17),
                sb_pct: row.get(18),
            };
            (before, after)
        })
        .collect();

    Ok(pairs)
}

/// Joined before/after pitching rows, as `fetch_batting_pairs`.
pub async fn fetch_pitching_pairs(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<(PitchingLine, PitchingLine)>> {
    let rows = sqlx::query(
        r#"
        SELECT a.player_name,
               a.outs, a.r, a.h, a.bb, a.slg, a.hr, a.so, a.g,
               b.outs, b.r, b.h, b.bb, b.slg, b.hr, b.so, b.g
        FROM ranked_pitch_stats a
        JOIN ranked_pitch_stats b
          ON b.user_id = a.user_id
         AND b.player_name = a.player_name
         AND b.submitted_at = a.submitted_at
         AND b.timing = 'after'
        WHERE a.user_id = ?
          AND a.timing = 'before'
          AND a.submitted_at = (
              SELECT MAX(submitted_at) FROM ranked_pitch_stats WHERE user_id = a.user_id
          )
        ORDER BY a.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let pairs = rows
        .iter()
        .map(|row| {
            let name: String = row.get(0);
            let before = PitchingLine {
                player_name: name.clone(),
                outs: row.get(1),
                r: row.get(2),
                h: row.get(3),
                bb: row.get(4),
                slg: row.get(5),
                hr: row.get(6),
                so: row.get(7),
                g: row.get(8),
            };
            let after = PitchingLine {
                player_name: name,
                outs: row.get(9),
                r: row.get(10),
                h: row.get(11),
                bb: row.get(12),
                slg: row.get(13),
                hr: row.get(14),
                so: row.get(15),
                g: row.get(16),
            };
            (before, after)
        })
        .collect();

    Ok(pairs)
}

/// Before/after batting rows for one player in the most recent group,
/// if the player appears on both sides of it.
pub async fn fetch_batting_pair(
    pool: &SqlitePool,
    user_id: i64,
    player_name: &str,
) -> Result<Option<(BattingLine, BattingLine)>> {
    let pairs = fetch_batting_pairs(pool, user_id).await?;
    Ok(pairs.into_iter().find(|(before, _)| before.player_name == player_name))
}

/// Before/after pitching rows for one player, as `fetch_batting_pair`.
pub async fn fetch_pitching_pair(
    pool: &SqlitePool,
    user_id: i64,
    player_name: &str,
) -> Result<Option<(PitchingLine, PitchingLine)>> {
    let pairs = fetch_pitching_pairs(pool, user_id).await?;
    Ok(pairs.into_iter().find(|(before, _)| before.player_name == player_name))
}

/// Distinct submission timestamps for a user, newest first.
pub async fn fetch_recent_timestamps(
    pool: &SqlitePool,
    family: StatFamily,
    user_id: i64,
    limit: usize,
) -> Result<Vec<String>> {
    let sql = format!(
        "SELECT submitted_at FROM {}
         WHERE user_id = ?
         GROUP BY submitted_at
         ORDER BY submitted_at DESC
         LIMIT ?",
        family.table()
    );

    let rows = sqlx::query(&sql)
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(|row| row.get(0)).collect())
}

/// Cumulative "after" batting lines recorded in one submission group.
pub async fn fetch_batting_group(
    pool: &SqlitePool,
    user_id: i64,
    submitted_at: &str,
) -> Result<Vec<BattingLine>> {
    let rows = sqlx::query(
        r#"
        SELECT player_name, ab, h, bb, slg, bbk, hr, so, sb, sb_pct
        FROM ranked_bat_stats
        WHERE user_id = ? AND submitted_at = ? AND timing = 'after'
        ORDER BY id
        "#,
    )
    .bind(user_id)
    .bind(submitted_at)
    .fetch_all(pool)
    .await?;

    let lines = rows
        .iter()
        .map(|row| BattingLine {
            player_name: row.get(0),
            ab: row.get(1),
            h: row.get(2),
            bb: row.get(3),
            slg: row.get(4),
            bbk: row.get(5),
            hr: row.get(6),
            so: row.get(7),
            sb: row.get(8),
            sb_pct: row.get(9),
        })
        .collect();

    Ok(lines)
}
