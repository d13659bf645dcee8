//! Rolling summary over recent feedback
//!
//! The summary is free text meant for people to read, so the model output is
//! returned as-is with no parsing or validation.

use crate::db::{FeedbackStore, StoreError};
use crate::services::llm_gateway::{run_with_deadline, GatewayError, LlmGateway, ModelInput};
use crate::services::prompts;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Summary failures
#[derive(Debug, Error)]
pub enum SummarizerError {
    /// Store holds no feedback; the model was not called
    #[error("No feedback to summarize")]
    NoData,

    #[error("Store failure: {0}")]
    StoreFailure(#[from] StoreError),

    #[error("Language model gateway failed: {0}")]
    GatewayFailure(GatewayError),

    #[error("Language model call timed out")]
    GatewayTimeout,
}

impl From<GatewayError> for SummarizerError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Timeout => SummarizerError::GatewayTimeout,
            other => SummarizerError::GatewayFailure(other),
        }
    }
}

/// Summarizes the newest feedback texts
pub struct FeedbackSummarizer {
    store: Arc<dyn FeedbackStore>,
    gateway: Arc<dyn LlmGateway>,
    model: String,
    deadline: Option<Duration>,
}

impl FeedbackSummarizer {
    pub fn new(
        store: Arc<dyn FeedbackStore>,
        gateway: Arc<dyn LlmGateway>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            store,
            gateway,
            model: model.into(),
            deadline: None,
        }
    }

    /// Bound each model call; expiry surfaces as [`SummarizerError::GatewayTimeout`]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Summarize up to `limit` most recent feedback texts, newest first
    pub async fn summarize_recent(&self, limit: NonZeroU32) -> Result<String, SummarizerError> {
        let texts = self.store.list_recent(limit.get()).await?;
        if texts.is_empty() {
            tracing::debug!("Summary requested over empty feedback log");
            return Err(SummarizerError::NoData);
        }

        let prompt = prompts::summary_prompt(&texts);
        let summary = run_with_deadline(
            self.gateway.as_ref(),
            &self.model,
            ModelInput::Prompt(prompt),
            self.deadline,
        )
        .await?;

        tracing::info!(items = texts.len(), "Generated feedback summary");

        Ok(summary)
    }
}
