//! Service-layer collaborators and orchestration

pub mod ingestion;
pub mod ocr_client;
