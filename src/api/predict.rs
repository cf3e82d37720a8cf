//! Prediction endpoint
//!
//! One JSON request in, one JSON response out. The binary feeds it a line at a
//! time from stdin.

use std::sync::Arc;

use serde::Serialize;

use crate::api::error::ApiError;
use crate::model::{AnalysisRequest, Verdict};
use crate::service::RiskAggregator;

/// Successful prediction: `[label, confidence]` plus the full verdict
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub data: (&'static str, f64),
    pub details: Verdict,
}

impl From<Verdict> for PredictResponse {
    fn from(verdict: Verdict) -> Self {
        Self {
            data: (verdict.prediction.as_str(), verdict.confidence),
            details: verdict,
        }
    }
}

/// Score one request
///
/// The analysis runs in its own task, so a panic inside any component comes
/// back as [`ApiError::Internal`] instead of taking down the caller.
pub async fn predict(
    engine: Arc<RiskAggregator>,
    request: AnalysisRequest,
) -> Result<PredictResponse, ApiError> {
    let task = tokio::spawn(async move { engine.analyze(&request).await });

    let verdict = match task.await {
        Ok(result) => result?,
        Err(e) if e.is_panic() => {
            return Err(ApiError::Internal("Analysis task panicked".to_string()));
        }
        Err(e) => return Err(ApiError::Internal(format!("Analysis task failed: {}", e))),
    };

    Ok(PredictResponse::from(verdict))
}

/// Parse a raw JSON request body
pub fn parse_request(body: &str) -> Result<AnalysisRequest, ApiError> {
    let request: AnalysisRequest = serde_json::from_str(body)?;
    Ok(request)
}

/// Handle one JSON line and render the JSON reply, success or error
pub async fn handle_line(engine: Arc<RiskAggregator>, line: &str) -> String {
    let result = match parse_request(line) {
        Ok(request) => predict(engine, request).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => render(&response),
        Err(e) => render(&e.error_response()),
    }
}

fn render<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to serialize response");
        serde_json::json!({
            "error": "internal_error",
            "message": format!("Failed to serialize response: {}", e),
            "status": 500,
        })
        .to_string()
    })
}
