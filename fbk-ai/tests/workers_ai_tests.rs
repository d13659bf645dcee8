//! Workers AI gateway tests against a mock HTTP endpoint

use fbk_ai::services::{ChatMessage, GatewayError, LlmGateway, ModelInput, WorkersAiGateway};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "@cf/meta/llama-3-8b-instruct";
const RUN_PATH: &str = "/accounts/acct-123/ai/run/@cf/meta/llama-3-8b-instruct";

fn gateway(server: &MockServer) -> WorkersAiGateway {
    WorkersAiGateway::new(&server.uri(), "acct-123", "secret-token", Duration::from_secs(5)).unwrap()
}

fn envelope(response: serde_json::Value) -> serde_json::Value {
    json!({
        "result": { "response": response },
        "success": true,
        "errors": [],
        "messages": []
    })
}

#[tokio::test]
async fn test_prompt_mode_request_and_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RUN_PATH))
        .and(header("authorization", "Bearer secret-token"))
        .and(body_json(json!({"prompt": "Summarize the following feedback:\nA"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!("One item: A."))))
        .expect(1)
        .mount(&server)
        .await;

    let text = gateway(&server)
        .run(
            MODEL,
            ModelInput::Prompt("Summarize the following feedback:\nA".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(text, "One item: A.");
}

#[tokio::test]
async fn test_messages_mode_request_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RUN_PATH))
        .and(body_json(json!({
            "messages": [{"role": "user", "content": "Classify this"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!("{\"a\":1}"))))
        .expect(1)
        .mount(&server)
        .await;

    let text = gateway(&server)
        .run(
            MODEL,
            ModelInput::Messages(vec![ChatMessage::user("Classify this")]),
        )
        .await
        .unwrap();

    assert_eq!(text, "{\"a\":1}");
}

#[tokio::test]
async fn test_response_text_returned_verbatim() {
    let server = MockServer::start().await;
    let fenced = "```json\n{\"summary\":\"x\"}\n```";
    Mock::given(method("POST"))
        .and(path(RUN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!(fenced))))
        .mount(&server)
        .await;

    let text = gateway(&server)
        .run(MODEL, ModelInput::Prompt("p".to_string()))
        .await
        .unwrap();

    assert_eq!(text, fenced, "gateway must not clean up model output");
}

#[tokio::test]
async fn test_structured_response_is_serialized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RUN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!({"summary": "s", "sentiment": "Neutral"}))),
        )
        .mount(&server)
        .await;

    let text = gateway(&server)
        .run(MODEL, ModelInput::Prompt("p".to_string()))
        .await
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, json!({"summary": "s", "sentiment": "Neutral"}));
}

#[tokio::test]
async fn test_error_status_carries_envelope_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RUN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "result": null,
            "success": false,
            "errors": [{"code": 10000, "message": "Authentication error"}],
            "messages": []
        })))
        .mount(&server)
        .await;

    let err = gateway(&server)
        .run(MODEL, ModelInput::Prompt("p".to_string()))
        .await
        .unwrap_err();

    match err {
        GatewayError::Api { status, message } => {
            assert_eq!(status, 401);
            assert!(message.contains("Authentication error"), "got {}", message);
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_error_status_with_plain_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RUN_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = gateway(&server)
        .run(MODEL, ModelInput::Prompt("p".to_string()))
        .await
        .unwrap_err();

    match err {
        GatewayError::Api { status, message } => {
            assert_eq!(status, 503);
            assert!(message.contains("upstream unavailable"));
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_success_false_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RUN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {"response": "ignored"},
            "success": false,
            "errors": [{"code": 3040, "message": "Capacity temporarily exceeded"}],
            "messages": []
        })))
        .mount(&server)
        .await;

    let err = gateway(&server)
        .run(MODEL, ModelInput::Prompt("p".to_string()))
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Api { .. }), "got {:?}", err);
}

#[tokio::test]
async fn test_missing_response_field_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RUN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {},
            "success": true,
            "errors": [],
            "messages": []
        })))
        .mount(&server)
        .await;

    let err = gateway(&server)
        .run(MODEL, ModelInput::Prompt("p".to_string()))
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::InvalidResponse(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RUN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!("late")))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let gateway = WorkersAiGateway::new(
        &server.uri(),
        "acct-123",
        "secret-token",
        Duration::from_millis(200),
    )
    .unwrap();

    let err = gateway
        .run(MODEL, ModelInput::Prompt("p".to_string()))
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Timeout), "got {:?}", err);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    // Port 9 (discard) on loopback is not expected to accept HTTP connections
    let gateway = WorkersAiGateway::new(
        "http://127.0.0.1:9",
        "acct-123",
        "secret-token",
        Duration::from_secs(2),
    )
    .unwrap();

    let err = gateway
        .run(MODEL, ModelInput::Prompt("p".to_string()))
        .await
        .unwrap_err();

    assert!(
        matches!(err, GatewayError::Transport(_) | GatewayError::Timeout),
        "got {:?}",
        err
    );
}
