//! OCR collaborator client
//!
//! Speaks the asynchronous read/analyze protocol: submit image bytes, get
//! `202 Accepted` plus an `Operation-Location`, then poll that location
//! until the analysis succeeds or fails. The caller only ever sees an
//! ordered list of line texts or an `OcrError`.

use dugout_common::config::OcrSettings;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const READ_ANALYZE_PATH: &str = "/vision/v3.2/read/analyze";
const USER_AGENT: &str = "Dugout/0.1.0";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const POLL_INTERVAL_MS: u64 = 1000;
const MAX_POLL_ATTEMPTS: u32 = 30;

/// OCR client errors
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Response missing Operation-Location header")]
    MissingOperationLocation,

    #[error("Analysis failed on the OCR service")]
    AnalysisFailed,

    #[error("Timed out waiting for analysis result")]
    Timeout,

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Read operation poll response (field subset we consume)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadOperation {
    pub status: String,
    pub analyze_result: Option<AnalyzeResult>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResult {
    pub read_results: Vec<ReadResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadResult {
    pub lines: Vec<ReadLine>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadLine {
    pub text: String,
}

/// OCR service client
pub struct OcrClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl OcrClient {
    pub fn new(settings: OcrSettings) -> Result<Self, OcrError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| OcrError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            api_key: settings.api_key,
        })
    }

    /// Extract image text as ordered lines, reading order preserved.
    pub async fn read_lines(&self, image: &[u8]) -> Result<Vec<String>, OcrError> {
        let url = format!("{}{}", self.endpoint, READ_ANALYZE_PATH);

        tracing::debug!(bytes = image.len(), "Submitting image to OCR read endpoint");

        let response = self
            .http_client
            .post(&url)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .header("Content-Type", "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await
            .map_err(|e| OcrError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == 401 {
            return Err(OcrError::InvalidApiKey);
        }

        if status != 202 {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OcrError::ApiError(status.as_u16(), error_text));
        }

        let operation_location = response
            .headers()
            .get("Operation-Location")
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .ok_or(OcrError::MissingOperationLocation)?;

        self.poll_operation(&operation_location).await
    }

    /// Poll the operation location until a terminal status or timeout.
    async fn poll_operation(&self, operation_location: &str) -> Result<Vec<String>, OcrError> {
        for _ in 0..MAX_POLL_ATTEMPTS {
            tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;

            let response = self
                .http_client
                .get(operation_location)
                .header("Ocp-Apim-Subscription-Key", &self.api_key)
                .send()
                .await
                .map_err(|e| OcrError::NetworkError(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_default();
                return Err(OcrError::ApiError(status.as_u16(), error_text));
            }

            let operation: ReadOperation = response
                .json()
                .await
                .map_err(|e| OcrError::ParseError(e.to_string()))?;

            match operation.status.as_str() {
                "succeeded" => {
                    let lines = Self::collect_lines(&operation);
                    tracing::info!(lines = lines.len(), "OCR analysis succeeded");
                    return Ok(lines);
                }
                "failed" => return Err(OcrError::AnalysisFailed),
                other => {
                    tracing::debug!(status = %other, "OCR analysis still running");
                }
            }
        }

        Err(OcrError::Timeout)
    }

    /// Flatten a succeeded operation into its line texts.
    ///
    /// Blank lines are dropped; they carry no field and would only feed
    /// the zero sentinel downstream.
    pub fn collect_lines(operation: &ReadOperation) -> Vec<String> {
        operation
            .analyze_result
            .iter()
            .flat_map(|result| &result.read_results)
            .flat_map(|page| &page.lines)
            .map(|line| line.text.trim().to_string())
            .filter(|text| !text.is_empty())
            .collect()
    }
}
