//! Database initialization
//!
//! Creates the snapshot tables on first run. All statements are
//! idempotent so startup is safe against an existing database.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use sqlite options to create database if it doesn't exist
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL mode: concurrent readers with one writer, so a long trend query
    // never blocks an in-flight ingestion transaction
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    // Busy timeout covers same-user ingestion overlap: the second writer
    // waits for the first transaction instead of failing immediately
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_ranked_bat_stats_table(&pool).await?;
    create_ranked_pitch_stats_table(&pool).await?;

    Ok(pool)
}

/// Create the batting snapshot table
///
/// The UNIQUE constraint backs the insert-or-ignore key: re-running OCR on
/// the same image must not fail the batch.
pub async fn create_ranked_bat_stats_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ranked_bat_stats (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            player_name TEXT NOT NULL,
            ab INTEGER NOT NULL DEFAULT 0,
            h INTEGER NOT NULL DEFAULT 0,
            bb INTEGER NOT NULL DEFAULT 0,
            slg REAL NOT NULL DEFAULT 0,
            bbk REAL NOT NULL DEFAULT 0,
            hr INTEGER NOT NULL DEFAULT 0,
            so INTEGER NOT NULL DEFAULT 0,
            sb INTEGER NOT NULL DEFAULT 0,
            sb_pct INTEGER NOT NULL DEFAULT 0,
            timing TEXT NOT NULL CHECK (timing IN ('before', 'after')),
            submitted_at TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (user_id, player_name, timing, submitted_at)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_bat_user_submitted
         ON ranked_bat_stats (user_id, submitted_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the pitching snapshot table
///
/// `outs` stores innings already converted to thirds (the fractional
/// innings token is resolved at assembly time, not here).
pub async fn create_ranked_pitch_stats_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ranked_pitch_stats (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            player_name TEXT NOT NULL,
            outs INTEGER NOT NULL DEFAULT 0,
            r INTEGER NOT NULL DEFAULT 0,
            h INTEGER NOT NULL DEFAULT 0,
            bb INTEGER NOT NULL DEFAULT 0,
            slg REAL NOT NULL DEFAULT 0,
            hr INTEGER NOT NULL DEFAULT 0,
            so INTEGER NOT NULL DEFAULT 0,
            g INTEGER NOT NULL DEFAULT 0,
            timing TEXT NOT NULL CHECK (timing IN ('before', 'after')),
            submitted_at TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (user_id, player_name, timing, submitted_at)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_pitch_user_submitted
         ON ranked_pitch_stats (user_id, submitted_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
