//! Feedback endpoints
//!
//! - `POST /ingest`: store a bare record
//! - `POST /analyze`: classify, then store the enriched record
//! - `GET /summary`: rolling summary over the newest records
//! - `GET /feedback`: every record, newest first

use crate::{ApiResult, AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use fbk_common::db::{Analysis, FeedbackRecord};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Request payload for `POST /ingest`
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub text: String,
}

/// Response payload for `POST /ingest`
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub status: String,
}

/// Request payload for `POST /analyze`
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub feedback: String,
}

/// Response payload for `GET /summary`
///
/// Mirrors the gateway's response object: the model text under `response`.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub response: String,
}

/// POST /ingest
///
/// **Request:** `{"text": "..."}`
/// **Response:** `{"status": "ok"}`
///
/// **Errors:**
/// - 400 Bad Request: empty or whitespace-only text, or a malformed body
/// - 500 Internal Server Error: store failure
pub async fn ingest_feedback(
    State(state): State<AppState>,
    payload: Result<Json<IngestRequest>, JsonRejection>,
) -> ApiResult<Json<IngestResponse>> {
    let Json(payload) = payload?;
    let id = state.store.insert_bare(&payload.text).await?;
    info!(id = %id, "Feedback ingested");

    Ok(Json(IngestResponse {
        status: "ok".to_string(),
    }))
}

/// POST /analyze
///
/// **Request:** `{"feedback": "..."}`
/// **Response:** `{"summary": "...", "sentiment": "...", "urgency": "..."}`
///
/// The record is written only after the model output validates, and it is
/// written with the feedback exactly as submitted.
///
/// **Errors:**
/// - 400 Bad Request: empty feedback or a malformed body (model not called)
/// - 500 Internal Server Error: `{"error": "AI returned invalid JSON", "raw": ...}`
/// - 502 Bad Gateway / 504 Gateway Timeout: model call failed or timed out
pub async fn analyze_feedback(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<Analysis>> {
    let Json(payload) = payload?;
    let analysis = state.analyzer.analyze(&payload.feedback).await?;

    let id = state
        .store
        .insert_enriched(&payload.feedback, &analysis)
        .await?;
    info!(id = %id, "Analyzed feedback stored");

    Ok(Json(analysis))
}

/// GET /summary
///
/// Summarizes the configured window of most recent feedback (20 by default).
///
/// **Errors:**
/// - 404 Not Found: no feedback stored yet (model not called)
/// - 502 Bad Gateway / 504 Gateway Timeout: model call failed or timed out
pub async fn summarize_feedback(State(state): State<AppState>) -> ApiResult<Json<SummaryResponse>> {
    let response = state
        .summarizer
        .summarize_recent(state.summary_window)
        .await?;

    Ok(Json(SummaryResponse { response }))
}

/// GET /feedback
pub async fn list_feedback(State(state): State<AppState>) -> ApiResult<Json<Vec<FeedbackRecord>>> {
    let records = state.store.list_all().await?;
    Ok(Json(records))
}

/// Build feedback routes
pub fn feedback_routes() -> Router<AppState> {
    Router::new()
        .route("/ingest", post(ingest_feedback))
        .route("/analyze", post(analyze_feedback))
        .route("/summary", get(summarize_feedback))
        .route("/feedback", get(list_feedback))
}
