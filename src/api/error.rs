//! Unified API error handling
//!
//! Every failed request is answered with the same [`ErrorResponse`] shape.

use serde::Serialize;
use uuid::Uuid;

use crate::service::AnalysisError;

/// Standard error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type/code
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Unique request ID for tracing
    pub request_id: String,
    /// HTTP-equivalent status code
    pub status: u16,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Bad request / validation error (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Internal error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Internal(_) => "internal_error",
        }
    }

    pub fn error_response(&self) -> ErrorResponse {
        let status = self.status_code();
        let error_type = self.error_type();

        tracing::error!(
            error_type = error_type,
            status = status,
            message = %self,
            "API error"
        );

        ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            request_id: Uuid::new_v4().to_string(),
            status,
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::EmptyText | AnalysisError::TextTooLong { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            AnalysisError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::BadRequest(format!("Malformed request body: {}", err))
    }
}
