mod common;

use std::time::Duration;

use ai_service::error::LlmError;
use ai_service::{Config, GeminiClient};
use axum::http::StatusCode;
use common::{MockGemini, TEST_KEY};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn generate_returns_first_candidate_text() {
    let mock = MockGemini::replying("Here is your summary.").await;
    let client = GeminiClient::new(&mock.config()).unwrap();

    let text = assert_ok!(client.generate("Summarise Rust ownership").await);

    assert_eq!(text, "Here is your summary.");
    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].key.as_deref(), Some(TEST_KEY));
    assert_eq!(requests[0].body["contents"][0]["role"], json!("user"));
    assert_eq!(requests[0].prompt(), "Summarise Rust ownership");
}

#[tokio::test]
async fn upstream_error_carries_status_and_body() {
    let mock = MockGemini::spawn(
        StatusCode::TOO_MANY_REQUESTS,
        json!({"error": {"message": "quota exceeded"}}),
        Duration::ZERO,
    )
    .await;
    let client = GeminiClient::new(&mock.config()).unwrap();

    let err = assert_err!(client.generate("hi").await);

    match &err {
        LlmError::Upstream { status, message } => {
            assert_eq!(*status, 429);
            assert!(message.contains("quota exceeded"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // 只尝试一次
    assert_eq!(mock.requests().len(), 1);
}

#[tokio::test]
async fn empty_candidates_are_reported() {
    let mock = MockGemini::spawn(StatusCode::OK, json!({"candidates": []}), Duration::ZERO).await;
    let client = GeminiClient::new(&mock.config()).unwrap();

    let err = assert_err!(client.generate("hi").await);
    assert!(matches!(err, LlmError::EmptyCompletion { .. }));
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let mock = MockGemini::spawn(
        StatusCode::OK,
        common::completion("too late"),
        Duration::from_secs(3),
    )
    .await;
    let config = Config {
        request_timeout_secs: 1,
        ..mock.config()
    };
    let client = GeminiClient::new(&config).unwrap();

    let err = assert_err!(client.generate("hi").await);
    assert!(matches!(err, LlmError::Timeout { secs: 1 }));
    assert!(!err.to_string().contains(TEST_KEY));
}

#[tokio::test]
async fn missing_key_never_reaches_upstream() {
    let mock = MockGemini::replying("unused").await;
    let config = Config {
        gemini_api_key: None,
        ..mock.config()
    };
    let client = GeminiClient::new(&config).unwrap();

    let err = assert_err!(client.generate("hi").await);
    assert!(matches!(err, LlmError::MissingApiKey(_)));
    assert!(mock.requests().is_empty());
}
