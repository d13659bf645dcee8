//! Structured feedback analysis
//!
//! Turns one piece of feedback into a validated [`Analysis`] by asking the
//! language model for a strict JSON object and checking it against the fixed
//! schema. Model output that does not parse, or parses into the wrong shape,
//! is rejected with the offending payload attached; no default classification
//! is ever substituted.
//!
//! This component makes exactly one model call per request and never touches
//! storage. Persisting the result is the caller's job.

use crate::services::llm_gateway::{run_with_deadline, ChatMessage, GatewayError, LlmGateway, ModelInput};
use crate::services::prompts;
use fbk_common::db::Analysis;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Analysis failures
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Feedback was empty after trimming; the model was not called
    #[error("Feedback text is empty")]
    EmptyInput,

    /// Model output was not JSON
    #[error("Model returned malformed output")]
    MalformedOutput { raw: String },

    /// Model output was JSON but not a valid analysis
    #[error("Model output violates schema: {reason}")]
    SchemaViolation {
        parsed: serde_json::Value,
        raw: String,
        reason: String,
    },

    /// The gateway call failed
    #[error("Language model gateway failed: {0}")]
    GatewayFailure(GatewayError),

    /// The gateway call missed its deadline
    #[error("Language model call timed out")]
    GatewayTimeout,
}

impl AnalysisError {
    /// Model text behind a rejected output, if this failure has one
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            AnalysisError::MalformedOutput { raw } | AnalysisError::SchemaViolation { raw, .. } => {
                Some(raw)
            }
            _ => None,
        }
    }
}

impl From<GatewayError> for AnalysisError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Timeout => AnalysisError::GatewayTimeout,
            other => AnalysisError::GatewayFailure(other),
        }
    }
}

/// Parse and validate raw model output
///
/// Only surrounding whitespace is tolerated; prose or code fences around the
/// object make the output malformed. Unknown extra keys are ignored.
pub fn parse_analysis(raw: &str) -> Result<Analysis, AnalysisError> {
    let parsed: serde_json::Value =
        serde_json::from_str(raw.trim()).map_err(|_| AnalysisError::MalformedOutput {
            raw: raw.to_string(),
        })?;

    let violation = |reason: String| AnalysisError::SchemaViolation {
        parsed: parsed.clone(),
        raw: raw.to_string(),
        reason,
    };

    if !parsed.is_object() {
        return Err(violation("expected a JSON object".to_string()));
    }

    let analysis = Analysis::deserialize(&parsed).map_err(|e| violation(e.to_string()))?;

    if analysis.summary.trim().is_empty() {
        return Err(violation("summary is empty".to_string()));
    }

    Ok(analysis)
}

/// Classifies feedback through the language model gateway
pub struct FeedbackAnalyzer {
    gateway: Arc<dyn LlmGateway>,
    model: String,
    deadline: Option<Duration>,
}

impl FeedbackAnalyzer {
    pub fn new(gateway: Arc<dyn LlmGateway>, model: impl Into<String>) -> Self {
        Self {
            gateway,
            model: model.into(),
            deadline: None,
        }
    }

    /// Bound each model call; expiry surfaces as [`AnalysisError::GatewayTimeout`]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Analyze one piece of feedback
    pub async fn analyze(&self, feedback: &str) -> Result<Analysis, AnalysisError> {
        let feedback = feedback.trim();
        if feedback.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let prompt = prompts::analysis_prompt(feedback);
        let input = ModelInput::Messages(vec![ChatMessage::user(prompt)]);

        let raw = run_with_deadline(self.gateway.as_ref(), &self.model, input, self.deadline).await?;

        match parse_analysis(&raw) {
            Ok(analysis) => {
                tracing::info!(
                    sentiment = %analysis.sentiment,
                    urgency = %analysis.urgency,
                    "Feedback analyzed"
                );
                Ok(analysis)
            }
            Err(e) => {
                tracing::warn!(model = %self.model, raw = %raw, "Rejected model output: {}", e);
                Err(e)
            }
        }
    }
}
