#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ai_service::Config;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

pub const TEST_MODEL: &str = "gemini-test";
pub const TEST_KEY: &str = "test-key";

/// 模拟服务收到的一次请求
#[derive(Debug, Clone)]
pub struct Recorded {
    pub key: Option<String>,
    pub body: Value,
}

impl Recorded {
    /// 请求中的提示词
    pub fn prompt(&self) -> &str {
        self.body["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap_or_default()
    }
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: Value,
    delay: Duration,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

/// 模拟的 Gemini 服务
pub struct MockGemini {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockGemini {
    pub async fn replying(text: &str) -> Self {
        Self::spawn(StatusCode::OK, completion(text), Duration::ZERO).await
    }

    pub async fn spawn(status: StatusCode, body: Value, delay: Duration) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            status,
            body,
            delay,
            requests: requests.clone(),
        };

        let app = Router::new()
            .route(
                &format!("/v1/models/{TEST_MODEL}:generateContent"),
                post(generate),
            )
            .with_state(state);
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}/v1"),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// 指向该模拟服务的配置
    pub fn config(&self) -> Config {
        Config {
            gemini_api_key: Some(TEST_KEY.to_string()),
            gemini_api_base_url: self.base_url.clone(),
            gemini_model: TEST_MODEL.to_string(),
            request_timeout_secs: 5,
            ..Config::default()
        }
    }
}

async fn generate(
    State(state): State<MockState>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.requests.lock().unwrap().push(Recorded {
        key: query.get("key").cloned(),
        body,
    });
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    (state.status, Json(state.body.clone()))
}

/// 标准的成功响应
pub fn completion(text: &str) -> Value {
    json!({
        "candidates": [
            { "content": { "role": "model", "parts": [ { "text": text } ] } }
        ]
    })
}
