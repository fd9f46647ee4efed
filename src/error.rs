use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// LLM 服务错误
    #[error(transparent)]
    Llm(#[from] LlmError),
    /// PDF 处理错误
    #[error(transparent)]
    Pdf(#[from] PdfError),
    /// 请求参数错误（400）
    #[error(transparent)]
    Request(#[from] RequestError),
    /// 业务错误，附带接口前缀
    #[error("{context}: {source}")]
    Endpoint {
        context: &'static str,
        #[source]
        source: Box<AppError>,
    },
    /// 路由不存在
    #[error("Not Found")]
    NotFound,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 缺少 API 密钥
    #[error("Gemini API Key is missing. Set GEMINI_API_KEY in the environment or .env file.")]
    MissingApiKey,
    /// 配置文件读取失败
    #[error("failed to read config file {path}: {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("failed to parse config file {path}: {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// 未配置 API 密钥，请求未发出
    #[error(transparent)]
    MissingApiKey(#[from] ConfigError),
    /// 请求超时
    #[error("Error calling Gemini API: request timed out after {secs}s")]
    Timeout { secs: u64 },
    /// 网络请求失败
    #[error("Error calling Gemini API: {0}")]
    Request(#[source] reqwest::Error),
    /// 上游返回非 2xx
    #[error("Error calling Gemini API: {status} {message}")]
    Upstream { status: u16, message: String },
    /// 响应体无法解析
    #[error("Error calling Gemini API: invalid response body: {0}")]
    InvalidResponse(#[source] reqwest::Error),
    /// 响应中没有生成文本
    #[error("No content generated by model {model}")]
    EmptyCompletion { model: String },
}

/// PDF 处理错误
#[derive(Debug, Error)]
pub enum PdfError {
    /// 生成 PDF 失败
    #[error("failed to render PDF: {0}")]
    RenderFailed(#[from] lopdf::Error),
    /// 写入 PDF 文件失败
    #[error("failed to write PDF {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 生成内容为空
    #[error("No assignment content generated.")]
    EmptyContent,
}

/// 请求参数错误
#[derive(Debug, Error)]
pub enum RequestError {
    /// 上传文件类型不正确
    #[error("Only PDF files are allowed.")]
    InvalidContentType { content_type: Option<String> },
    /// 缺少表单字段
    #[error("missing form field: {0}")]
    MissingField(&'static str),
    /// 表单字段值非法
    #[error("invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
    /// multipart 解析失败
    #[error("malformed multipart body: {0}")]
    Multipart(String),
    /// JSON 请求体解析失败
    #[error("invalid JSON body: {0}")]
    Json(String),
}

impl AppError {
    /// 为错误加上接口前缀，例如 "Content generation failed"
    pub fn in_endpoint(self, context: &'static str) -> Self {
        match self {
            // 参数错误保持原样返回 400
            AppError::Request(_) => self,
            other => AppError::Endpoint {
                context,
                source: Box::new(other),
            },
        }
    }

    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Request(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Endpoint { source, .. } => source.status_code(),
            AppError::Llm(_) | AppError::Pdf(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = self.to_string();

        if status.is_server_error() {
            tracing::error!("请求处理失败: {}", detail);
        } else {
            tracing::warn!("请求被拒绝 ({}): {}", status, detail);
        }

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
