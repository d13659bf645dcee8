//! Feedback analysis services
//!
//! - `llm_gateway`: the gateway trait and deadline handling
//! - `workers_ai`: HTTP gateway implementation
//! - `prompts`: prompt builders
//! - `analyzer`: structured, validated classification of one feedback item
//! - `summarizer`: free-text summary over the newest feedback

pub mod analyzer;
pub mod llm_gateway;
pub mod prompts;
pub mod summarizer;
pub mod workers_ai;

pub use analyzer::{parse_analysis, AnalysisError, FeedbackAnalyzer};
pub use llm_gateway::{ChatMessage, GatewayError, LlmGateway, ModelInput, Role};
pub use summarizer::{FeedbackSummarizer, SummarizerError};
pub use workers_ai::WorkersAiGateway;
