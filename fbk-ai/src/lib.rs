//! fbk-ai library interface
//!
//! Feedback analysis service: ingests customer feedback, classifies it through
//! a language model, stores the results and produces rolling summaries.

pub mod api;
pub mod db;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use db::FeedbackStore;
use fbk_common::config::TomlConfig;
use services::{FeedbackAnalyzer, FeedbackSummarizer, LlmGateway};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

/// Number of recent records fed to `/summary` unless configured otherwise
pub const DEFAULT_SUMMARY_WINDOW: u32 = 20;

/// Service tuning taken from the module config
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub analysis_model: String,
    pub summary_model: String,
    pub summary_window: NonZeroU32,
    /// Deadline applied around every model call
    pub gateway_deadline: Option<Duration>,
}

impl ServiceSettings {
    pub fn from_config(config: &TomlConfig) -> fbk_common::Result<Self> {
        let summary_window = NonZeroU32::new(config.summary_window).ok_or_else(|| {
            fbk_common::Error::Config("summary_window must be at least 1".to_string())
        })?;

        Ok(Self {
            analysis_model: config.llm.analysis_model.clone(),
            summary_model: config.llm.summary_model.clone(),
            summary_window,
            gateway_deadline: Some(Duration::from_secs(config.llm.timeout_secs)),
        })
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        let llm = fbk_common::config::LlmConfig::default();
        Self {
            analysis_model: llm.analysis_model,
            summary_model: llm.summary_model,
            summary_window: NonZeroU32::new(DEFAULT_SUMMARY_WINDOW).unwrap_or(NonZeroU32::MIN),
            gateway_deadline: None,
        }
    }
}

/// Application state shared across handlers
///
/// Holds only immutable handles; all durable state lives in the store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FeedbackStore>,
    pub analyzer: Arc<FeedbackAnalyzer>,
    pub summarizer: Arc<FeedbackSummarizer>,
    pub summary_window: NonZeroU32,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn FeedbackStore>,
        gateway: Arc<dyn LlmGateway>,
        settings: &ServiceSettings,
    ) -> Self {
        let mut analyzer = FeedbackAnalyzer::new(gateway.clone(), settings.analysis_model.clone());
        let mut summarizer =
            FeedbackSummarizer::new(store.clone(), gateway, settings.summary_model.clone());

        if let Some(deadline) = settings.gateway_deadline {
            analyzer = analyzer.with_deadline(deadline);
            summarizer = summarizer.with_deadline(deadline);
        }

        Self {
            store,
            analyzer: Arc::new(analyzer),
            summarizer: Arc::new(summarizer),
            summary_window: settings.summary_window,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::ui_routes())
        .merge(api::feedback_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
