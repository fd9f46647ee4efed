//! PDF 文本提取 - 业务能力层
//!
//! 只负责"上传的 PDF → 纯文本"，任何失败都退化为固定提示文本。

use tracing::{debug, warn};

/// 无法提取文本时返回的内容
pub const NO_READABLE_TEXT: &str = "No readable text found in PDF.";

/// 提取文本是否可用
pub fn is_readable(text: &str) -> bool {
    !text.is_empty() && text != NO_READABLE_TEXT
}

/// 同步提取所有页面的文本
///
/// 解析失败、库内部 panic 或文本为空时返回 [`NO_READABLE_TEXT`]。
pub fn extract_text(bytes: &[u8]) -> String {
    let result = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));

    match result {
        Ok(Ok(text)) => {
            let text = normalize(&text);
            if text.is_empty() {
                debug!("PDF 中没有可提取的文本");
                NO_READABLE_TEXT.to_string()
            } else {
                text
            }
        }
        Ok(Err(e)) => {
            warn!("PDF 文本提取失败: {}", e);
            NO_READABLE_TEXT.to_string()
        }
        Err(_) => {
            warn!("PDF 文本提取过程中发生 panic");
            NO_READABLE_TEXT.to_string()
        }
    }
}

/// 在阻塞线程池中提取，避免占用异步运行时
pub async fn extract_text_blocking(bytes: Vec<u8>) -> String {
    match tokio::task::spawn_blocking(move || extract_text(&bytes)).await {
        Ok(text) => text,
        Err(e) => {
            warn!("PDF 提取任务失败: {}", e);
            NO_READABLE_TEXT.to_string()
        }
    }
}

// 分页符换成换行，去掉每行尾部空白和首尾空行
fn normalize(text: &str) -> String {
    text.replace('\u{000C}', "\n")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
