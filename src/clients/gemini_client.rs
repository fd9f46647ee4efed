/// Gemini API 客户端
///
/// 封装对 `generateContent` 接口的单次调用：不重试、不流式，超时由配置决定。
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ConfigError, LlmError};

/// 请求体
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// 响应体，只解析需要的字段
#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Default, Deserialize)]
struct PartResponse {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|text| !text.is_empty())
    }
}

/// Gemini 客户端
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    api_base_url: String,
    model_name: String,
    timeout_secs: u64,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("api_base_url", &self.api_base_url)
            .field("model_name", &self.model_name)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl GeminiClient {
    /// 根据配置创建客户端
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(LlmError::Request)?;

        Ok(Self {
            http,
            api_key: config.gemini_api_key.clone(),
            api_base_url: config.gemini_api_base_url.trim_end_matches('/').to_string(),
            model_name: config.gemini_model.clone(),
            timeout_secs: config.request_timeout_secs,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base_url, self.model_name)
    }

    /// 发送提示词，返回模型生成的文本
    ///
    /// 未配置 API 密钥时不会发出请求。
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey(ConfigError::MissingApiKey))?;

        debug!("调用 Gemini API，模型: {}", self.model_name);
        debug!("提示词长度: {} 字符", prompt.len());

        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                // URL 中带有密钥，不能出现在日志和错误信息里
                let e = e.without_url();
                warn!("Gemini API 调用失败: {}", e);
                if e.is_timeout() {
                    LlmError::Timeout {
                        secs: self.timeout_secs,
                    }
                } else {
                    LlmError::Request(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response body>".to_string());
            warn!("Gemini API 返回错误状态 {}: {}", status, message);
            return Err(LlmError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.without_url()))?;

        debug!("Gemini API 调用成功");

        parsed.first_text().ok_or_else(|| LlmError::EmptyCompletion {
            model: self.model_name.clone(),
        })
    }
}
