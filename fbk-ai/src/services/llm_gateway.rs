//! Language model gateway abstraction
//!
//! The gateway is an untrusted text generator: it takes a prompt or a message
//! list and hands back whatever text the model produced. Nothing returned
//! here has been parsed or validated.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Gateway errors
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Could not reach the model endpoint
    #[error("Network error: {0}")]
    Transport(String),

    /// Endpoint answered with a failure status or `success: false`
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Endpoint answered but the envelope carried no model text
    #[error("Invalid gateway response: {0}")]
    InvalidResponse(String),

    /// The call did not finish before its deadline
    #[error("Model call timed out")]
    Timeout,
}

/// Chat role of a message sent in message mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in message-mode invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// What to send to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelInput {
    /// Single-prompt mode
    Prompt(String),
    /// Multi-message mode
    Messages(Vec<ChatMessage>),
}

/// Single-shot, non-streaming model invocation
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Run `model` on `input` and return the complete response text
    async fn run(&self, model: &str, input: ModelInput) -> Result<String, GatewayError>;
}

/// Run a gateway call, converting an expired deadline into [`GatewayError::Timeout`]
pub async fn run_with_deadline(
    gateway: &dyn LlmGateway,
    model: &str,
    input: ModelInput,
    deadline: Option<Duration>,
) -> Result<String, GatewayError> {
    match deadline {
        Some(limit) => tokio::time::timeout(limit, gateway.run(model, input))
            .await
            .map_err(|_| {
                tracing::warn!(model = %model, deadline_ms = limit.as_millis() as u64, "Model call exceeded deadline");
                GatewayError::Timeout
            })?,
        None => gateway.run(model, input).await,
    }
}
