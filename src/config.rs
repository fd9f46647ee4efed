use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// 默认配置文件名（位于工作目录）
pub const DEFAULT_CONFIG_FILE: &str = "ai-service.toml";

/// 程序配置
///
/// 启动时构建一次，之后通过 `AppState` 以引用方式传给各个服务。
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    /// Gemini API 密钥，缺失时所有生成请求直接失败
    pub gemini_api_key: Option<String>,
    pub gemini_api_base_url: String,
    pub gemini_model: String,
    /// 单次生成请求的超时（秒）
    pub request_timeout_secs: u64,
    // --- 上传 / 输出 ---
    /// multipart 上传大小上限（字节）
    pub max_upload_bytes: usize,
    /// 生成的 PDF 额外落盘目录（可选）
    pub pdf_output_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            verbose_logging: false,
            gemini_api_key: None,
            gemini_api_base_url: "https://generativelanguage.googleapis.com/v1".to_string(),
            gemini_model: "gemini-1.5-flash".to_string(),
            request_timeout_secs: 15,
            max_upload_bytes: 20 * 1024 * 1024,
            pdf_output_dir: None,
        }
    }
}

impl Config {
    /// 加载配置：TOML 文件（可选）→ 环境变量覆盖
    ///
    /// 配置文件路径取自 `AI_SERVICE_CONFIG`，否则尝试工作目录下的 `ai-service.toml`。
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var("AI_SERVICE_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            Err(_) => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    /// 从 TOML 文件读取，缺省字段使用默认值
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 用环境变量覆盖当前值，无法解析的值保留原值
    pub fn with_env_overrides(self) -> Self {
        let env = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            host: env("HOST").unwrap_or(self.host),
            port: env("PORT").and_then(|v| v.parse().ok()).unwrap_or(self.port),
            verbose_logging: env("VERBOSE_LOGGING")
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.verbose_logging),
            gemini_api_key: env("GEMINI_API_KEY").or(self.gemini_api_key),
            gemini_api_base_url: env("GEMINI_API_BASE_URL").unwrap_or(self.gemini_api_base_url),
            gemini_model: env("GEMINI_MODEL").unwrap_or(self.gemini_model),
            request_timeout_secs: env("REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.request_timeout_secs),
            max_upload_bytes: env("MAX_UPLOAD_BYTES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.max_upload_bytes),
            pdf_output_dir: env("PDF_OUTPUT_DIR").map(PathBuf::from).or(self.pdf_output_dir),
        }
    }

    /// 监听地址字符串，例如 `0.0.0.0:8000`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_fills_missing_fields_with_defaults() {
        let config = Config::from_toml_str(
            r#"
port = 9100
gemini_model = "gemini-2.0-flash"
pdf_output_dir = "out"
"#,
        )
        .unwrap();

        assert_eq!(config.port, 9100);
        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert_eq!(config.pdf_output_dir, Some(PathBuf::from("out")));
        assert_eq!(config.request_timeout_secs, 15);
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.bind_addr(), "0.0.0.0:9100");
    }

    #[test]
    fn invalid_toml_is_rejected() {
        assert!(Config::from_toml_str("port = \"not a number\"").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Config::from_file(Path::new("definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("definitely/not/here.toml"));
    }
}
