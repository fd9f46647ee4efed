//! # AI Service
//!
//! 作业生成 / 批改 / 学习内容 / 反馈的 HTTP 服务，背后调用 Gemini 生成文本
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 与外部服务通信，只暴露能力
//! - `GeminiClient` - 单次 `generateContent` 调用，带超时，不重试
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 纯粹的单项能力，不关心流程
//! - `prompt_builder` - 结构化请求 → 提示词
//! - `evaluation` - 模型回复 → 反馈 + 分数
//! - `pdf_renderer` / `pdf_extractor` - 文本与 PDF 互转
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 每个接口的完整处理流程
//! - `GenerationFlow` - 提示词 → 模型 →（解析分数 | 生成 PDF）
//!
//! ### ④ 接口层（API）
//! - `api/` - axum 路由、参数校验、错误映射
//!
//! ## 模块结构

pub mod api;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use api::{build_app, router, AppState};
pub use clients::GeminiClient;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{EvaluationResult, MarksScored};
pub use workflow::GenerationFlow;
