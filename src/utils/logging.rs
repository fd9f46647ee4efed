/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info 级别。
/// 重复调用是安全的（测试中会多次初始化）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "ai_service={default_level},tower_http={default_level}"
        ))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 AI Assignment Generator 启动");
    info!("🌐 监听地址: {}", config.bind_addr());
    info!("🤖 模型: {}", config.gemini_model);
    info!("⏱️ 请求超时: {} 秒", config.request_timeout_secs);
    if config.gemini_api_key.is_none() {
        warn!("⚠️ 未配置 GEMINI_API_KEY，所有生成请求都会失败");
    }
    if let Some(dir) = &config.pdf_output_dir {
        info!("📁 PDF 输出目录: {}", dir.display());
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
