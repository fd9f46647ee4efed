//! HTTP 接口层
//!
//! 只负责请求解析、参数校验和错误映射，业务交给 [`GenerationFlow`]。

mod handlers;
mod models;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::LlmError;
use crate::workflow::GenerationFlow;

pub use handlers::DOWNLOAD_FILE_NAME;
pub use models::{ContentResponse, FeedbackResponse, HomeResponse};

/// 所有处理函数共享的状态
#[derive(Debug)]
pub struct AppState {
    pub flow: GenerationFlow,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        Ok(Self {
            flow: GenerationFlow::new(config)?,
            max_upload_bytes: config.max_upload_bytes,
        })
    }
}

/// 根据配置构建完整的路由
pub fn build_app(config: &Config) -> Result<Router, LlmError> {
    Ok(router(Arc::new(AppState::new(config)?)))
}

pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::home))
        .route("/assignment/generate", post(handlers::generate_assignment))
        .route("/assignment/check", post(handlers::check_assignment))
        .route("/content/generate", post(handlers::generate_content))
        .route("/feedback/generate", post(handlers::generate_feedback))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
