//! Error types for fbk-ai
//!
//! Every failure reaches the client as a distinct status and code. Rejected
//! model output additionally carries the raw model text for diagnosis.

use crate::db::StoreError;
use crate::services::{AnalysisError, SummarizerError};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Message returned alongside rejected model output
pub const INVALID_MODEL_OUTPUT_MESSAGE: &str = "AI returned invalid JSON";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Submitted text was empty (400)
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Request body missing, not JSON, or the wrong shape
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Nothing stored yet to work on (404)
    #[error("No data: {0}")]
    NoData(String),

    /// Model output failed parsing or validation (500)
    #[error("Invalid model output: {reason}")]
    InvalidModelOutput { raw: String, reason: String },

    /// Model endpoint unavailable or failing (502)
    #[error("Gateway failure: {0}")]
    GatewayFailure(String),

    /// Model call missed its deadline (504)
    #[error("Gateway timeout")]
    GatewayTimeout,

    /// Persistence failed (500)
    #[error("Store failure: {0}")]
    StoreFailure(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmptyText => ApiError::EmptyInput("Feedback text is empty".to_string()),
            other => ApiError::StoreFailure(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::EmptyInput => ApiError::EmptyInput("Feedback text is empty".to_string()),
            AnalysisError::MalformedOutput { raw } => ApiError::InvalidModelOutput {
                raw,
                reason: "output is not JSON".to_string(),
            },
            AnalysisError::SchemaViolation { raw, reason, .. } => {
                ApiError::InvalidModelOutput { raw, reason }
            }
            AnalysisError::GatewayFailure(e) => ApiError::GatewayFailure(e.to_string()),
            AnalysisError::GatewayTimeout => ApiError::GatewayTimeout,
        }
    }
}

impl From<SummarizerError> for ApiError {
    fn from(err: SummarizerError) -> Self {
        match err {
            SummarizerError::NoData => ApiError::NoData("No feedback to summarize".to_string()),
            SummarizerError::StoreFailure(e) => e.into(),
            SummarizerError::GatewayFailure(e) => ApiError::GatewayFailure(e.to_string()),
            SummarizerError::GatewayTimeout => ApiError::GatewayTimeout,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::InvalidModelOutput { raw, .. } => {
                let body = Json(json!({
                    "error": INVALID_MODEL_OUTPUT_MESSAGE,
                    "raw": raw,
                }));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
            ApiError::EmptyInput(msg) => (StatusCode::BAD_REQUEST, "EMPTY_INPUT", msg),
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg),
            ApiError::NoData(msg) => (StatusCode::NOT_FOUND, "NO_DATA", msg),
            ApiError::GatewayFailure(msg) => (StatusCode::BAD_GATEWAY, "GATEWAY_FAILURE", msg),
            ApiError::GatewayTimeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "GATEWAY_TIMEOUT",
                "Language model call timed out".to_string(),
            ),
            ApiError::StoreFailure(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_FAILURE",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
