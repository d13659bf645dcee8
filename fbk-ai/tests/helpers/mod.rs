//! Shared test helpers for fbk-ai integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use fbk_ai::db::SqliteFeedbackStore;
use fbk_ai::services::{GatewayError, LlmGateway, ModelInput};
use fbk_ai::{build_router, AppState, ServiceSettings};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Gateway that replays queued replies and records every call
#[derive(Default)]
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<Result<String, GatewayError>>>,
    calls: Mutex<Vec<(String, ModelInput)>>,
}

impl ScriptedGateway {
    pub fn replying(replies: Vec<Result<String, GatewayError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn ok(reply: &str) -> Arc<Self> {
        Self::replying(vec![Ok(reply.to_string())])
    }

    pub fn calls(&self) -> Vec<(String, ModelInput)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    async fn run(&self, model: &str, input: ModelInput) -> Result<String, GatewayError> {
        self.calls.lock().unwrap().push((model.to_string(), input));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Transport("no scripted reply left".to_string())))
    }
}

/// Gateway that never answers within any reasonable deadline
pub struct StalledGateway;

#[async_trait]
impl LlmGateway for StalledGateway {
    async fn run(&self, _model: &str, _input: ModelInput) -> Result<String, GatewayError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok("too late".to_string())
    }
}

/// In-memory store with the production schema
///
/// One connection so every query sees the same `:memory:` database.
pub async fn memory_store() -> SqliteFeedbackStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    fbk_common::db::create_feedback_table(&pool).await.unwrap();
    SqliteFeedbackStore::new(pool)
}

/// Router over a fresh in-memory store and the given gateway
pub async fn test_app(gateway: Arc<dyn LlmGateway>) -> (Router, SqliteFeedbackStore) {
    test_app_with_settings(gateway, ServiceSettings::default()).await
}

pub async fn test_app_with_settings(
    gateway: Arc<dyn LlmGateway>,
    settings: ServiceSettings,
) -> (Router, SqliteFeedbackStore) {
    let store = memory_store().await;
    let state = AppState::new(Arc::new(store.clone()), gateway, &settings);
    (build_router(state), store)
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Extract JSON body from response
pub async fn extract_json(response: Response<Body>) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

pub async fn extract_text(response: Response<Body>) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(body.to_vec()).unwrap()
}
