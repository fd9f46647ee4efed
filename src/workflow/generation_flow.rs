//! 生成流程 - 流程层
//!
//! 每个接口一条流程：提示词 → 模型 →（解析分数 | 生成 PDF）
//!
//! - 不关心 HTTP 细节
//! - 只依赖客户端（clients）和业务能力（services）

use std::path::PathBuf;

use tracing::{info, warn};

use crate::clients::GeminiClient;
use crate::config::Config;
use crate::error::{AppResult, LlmError, PdfError};
use crate::models::{
    AssignmentRequest, CheckRequest, ContentRequest, EvaluationResult, FeedbackRequest,
    MarksScored,
};
use crate::services::{evaluation, pdf_extractor, pdf_renderer, prompt_builder, RenderedDocument};
use crate::utils::logging::truncate_text;

/// 模型没有返回内容时的默认文本
pub const NO_CONTENT_GENERATED: &str = "No content generated.";
pub const NO_FEEDBACK_GENERATED: &str = "No feedback generated.";
/// PDF 中没有文本时的批改反馈
pub const UNREADABLE_SUBMISSION_FEEDBACK: &str =
    "The submitted PDF contains no readable text. Please ensure the file is valid.";

/// 生成流程
#[derive(Clone, Debug)]
pub struct GenerationFlow {
    client: GeminiClient,
    pdf_output_dir: Option<PathBuf>,
}

impl GenerationFlow {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        Ok(Self {
            client: GeminiClient::new(config)?,
            pdf_output_dir: config.pdf_output_dir.clone(),
        })
    }

    /// 生成作业并排版成 PDF
    pub async fn generate_assignment(&self, req: &AssignmentRequest) -> AppResult<RenderedDocument> {
        info!("📝 生成作业: {} / {}", req.subject, req.topic);

        let prompt = prompt_builder::assignment_prompt(req);
        let content = match self.client.generate(&prompt).await {
            Ok(content) => content,
            Err(LlmError::EmptyCompletion { .. }) => return Err(PdfError::EmptyContent.into()),
            Err(e) => return Err(e.into()),
        };

        let title = format!("Assignment: {}", req.subject);
        let document = pdf_renderer::render(&title, &content)?;

        if let Some(dir) = &self.pdf_output_dir {
            let path = document.persist(dir).await?;
            info!("📄 PDF 已保存: {}", path.display());
        }

        info!(
            "✓ 作业 PDF 生成完成: {} ({} 页)",
            document.file_name(),
            document.page_count
        );
        Ok(document)
    }

    /// 生成学习内容
    pub async fn generate_content(&self, req: &ContentRequest) -> AppResult<String> {
        info!("📚 生成学习内容: {} ({})", req.topic_name, req.content_type);

        let prompt = prompt_builder::content_prompt(req);
        Ok(self.generate_or(&prompt, NO_CONTENT_GENERATED).await?)
    }

    /// 生成反馈
    pub async fn generate_feedback(&self, req: &FeedbackRequest) -> AppResult<String> {
        info!(
            "💬 生成反馈: 语气 {} | 重点 {} | 长度 {}",
            req.feedback_tone, req.feedback_focus, req.feedback_length
        );

        let prompt = prompt_builder::feedback_prompt(req);
        Ok(self.generate_or(&prompt, NO_FEEDBACK_GENERATED).await?)
    }

    /// 批改上传的 PDF 作业
    ///
    /// PDF 中没有可读文本时不调用模型，直接返回 0 分。
    pub async fn check_assignment(
        &self,
        out_of_marks: u32,
        check_prompt: String,
        pdf_bytes: Vec<u8>,
    ) -> AppResult<EvaluationResult> {
        info!("🔍 正在提取 PDF 文本...");
        let submission_text = pdf_extractor::extract_text_blocking(pdf_bytes).await;
        info!("提取到的文本（前 200 字符）: {}", truncate_text(&submission_text, 200));

        if !pdf_extractor::is_readable(&submission_text) {
            warn!("⚠️ 上传的 PDF 没有可读文本，跳过模型调用");
            return Ok(EvaluationResult {
                feedback: UNREADABLE_SUBMISSION_FEEDBACK.to_string(),
                marks_scored: MarksScored::from(0),
            });
        }

        let req = CheckRequest {
            out_of_marks,
            check_prompt,
            submission_text,
        };
        let prompt = prompt_builder::check_prompt(&req);
        let reply = self.generate_or(&prompt, NO_FEEDBACK_GENERATED).await?;

        let result = evaluation::interpret(&reply, req.out_of_marks);
        info!("✓ 批改完成，分数: {:?}", result.marks_scored);
        Ok(result)
    }

    /// 调用模型，空回复时使用默认文本
    async fn generate_or(&self, prompt: &str, fallback: &str) -> Result<String, LlmError> {
        match self.client.generate(prompt).await {
            Err(LlmError::EmptyCompletion { model }) => {
                warn!("模型 {} 没有返回内容，使用默认文本", model);
                Ok(fallback.to_string())
            }
            other => other,
        }
    }
}
