//! Workers AI gateway
//!
//! HTTP implementation of [`LlmGateway`] against the Workers AI REST API:
//! `POST {base_url}/accounts/{account_id}/ai/run/{model}` with a bearer token.
//! Prompt mode sends `{"prompt": ...}`, message mode sends `{"messages": [...]}`.
//! The model text comes back in the `result.response` field of the envelope.

use crate::services::llm_gateway::{ChatMessage, GatewayError, LlmGateway, ModelInput};
use async_trait::async_trait;
use fbk_common::config::LlmConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const USER_AGENT: &str = concat!("fbk-ai/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RunRequest<'a> {
    Prompt { prompt: &'a str },
    Messages { messages: &'a [ChatMessage] },
}

#[derive(Debug, Deserialize)]
struct RunEnvelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    result: Option<RunResult>,
    #[serde(default)]
    errors: Vec<ApiMessage>,
}

#[derive(Debug, Deserialize)]
struct RunResult {
    #[serde(default)]
    response: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

fn describe_errors(errors: &[ApiMessage]) -> String {
    errors
        .iter()
        .map(|e| match e.code {
            Some(code) => format!("[{}] {}", code, e.message),
            None => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Workers AI REST client
pub struct WorkersAiGateway {
    http_client: reqwest::Client,
    base_url: String,
    account_id: String,
    api_token: String,
}

impl WorkersAiGateway {
    /// Build a gateway from the `[llm]` config section
    pub fn from_config(config: &LlmConfig) -> fbk_common::Result<Self> {
        let account_id = config.require_account_id()?;
        let api_token = config.require_api_token()?;

        Self::new(
            &config.base_url,
            account_id,
            api_token,
            Duration::from_secs(config.timeout_secs),
        )
        .map_err(|e| fbk_common::Error::Config(e.to_string()))
    }

    pub fn new(
        base_url: &str,
        account_id: &str,
        api_token: &str,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            account_id: account_id.to_string(),
            api_token: api_token.to_string(),
        })
    }

    fn run_url(&self, model: &str) -> String {
        format!("{}/accounts/{}/ai/run/{}", self.base_url, self.account_id, model)
    }
}

#[async_trait]
impl LlmGateway for WorkersAiGateway {
    async fn run(&self, model: &str, input: ModelInput) -> Result<String, GatewayError> {
        let body = match &input {
            ModelInput::Prompt(prompt) => RunRequest::Prompt { prompt },
            ModelInput::Messages(messages) => RunRequest::Messages { messages },
        };

        let url = self.run_url(model);
        tracing::debug!(model = %model, url = %url, "Invoking language model");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout
            } else {
                GatewayError::Transport(e.to_string())
            }
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<RunEnvelope>(&text)
                .ok()
                .map(|env| describe_errors(&env.errors))
                .filter(|m| !m.is_empty())
                .unwrap_or(text);
            tracing::warn!(model = %model, status = status.as_u16(), "Language model call failed");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: RunEnvelope = serde_json::from_str(&text)
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        if envelope.success == Some(false) {
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: describe_errors(&envelope.errors),
            });
        }

        // Some models pre-parse JSON answers; hand those back as text so the
        // caller validates them like any other output.
        let output = match envelope.result.map(|r| r.response) {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Null) | None => {
                return Err(GatewayError::InvalidResponse(
                    "missing result.response".to_string(),
                ))
            }
            Some(other) => other.to_string(),
        };

        tracing::debug!(model = %model, response_len = output.len(), "Language model responded");

        Ok(output)
    }
}
