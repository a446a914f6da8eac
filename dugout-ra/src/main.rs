//! dugout-ra (Ranked Analysis) - ranked stat screenshot analysis service
//!
//! Ingests OCR text from stat-table screenshots, persists before/after
//! snapshots per user, and serves sabermetric differentials and trends to
//! the chat-platform frontend.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

use dugout_common::config::{self, OcrSettings};
use dugout_ra::services::ocr_client::OcrClient;
use dugout_ra::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "dugout-ra", about = "Ranked stat analysis service")]
struct Args {
    /// Root folder holding the database (overrides env and config file)
    #[arg(long)]
    root_folder: Option<String>,

    /// Port to listen on
    #[arg(long, default_value_t = 5731)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Dugout Ranked Analysis (dugout-ra) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let root_folder = config::resolve_root_folder(args.root_folder.as_deref());
    config::ensure_root_folder(&root_folder)?;

    let db_path = config::database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = dugout_common::db::init_database(&db_path).await?;
    info!("✓ Database ready");

    // OCR is a soft dependency: without it the read endpoints still serve
    let ocr = match OcrSettings::resolve() {
        Ok(settings) => {
            let client = OcrClient::new(settings)
                .map_err(|e| anyhow::anyhow!("Failed to create OCR client: {}", e))?;
            info!("✓ OCR collaborator configured");
            Some(Arc::new(client))
        }
        Err(e) => {
            warn!("OCR not configured ({}); image ingestion disabled", e);
            None
        }
    };

    let state = AppState::new(pool, ocr);
    let app = build_router(state);

    let addr = format!("127.0.0.1:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("dugout-ra listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
