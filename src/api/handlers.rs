use std::sync::Arc;

use axum::{
    extract::{
        multipart::{Multipart, MultipartError, MultipartRejection},
        rejection::JsonRejection,
        State,
    },
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::error::{AppError, AppResult, RequestError};
use crate::models::{AssignmentRequest, ContentRequest, EvaluationResult, FeedbackRequest};

use super::models::{ContentResponse, FeedbackResponse, HomeResponse};
use super::AppState;

/// 下载时使用的文件名
pub const DOWNLOAD_FILE_NAME: &str = "assignment.pdf";
const PDF_CONTENT_TYPE: &str = "application/pdf";

pub async fn home() -> Json<HomeResponse> {
    Json(HomeResponse {
        message: "AI Assignment Generator is running!",
    })
}

/// POST /assignment/generate
pub async fn generate_assignment(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AssignmentRequest>, JsonRejection>,
) -> AppResult<Response> {
    let context = "Assignment generation failed";
    let Json(req) = payload
        .map_err(json_error)
        .map_err(|e| e.in_endpoint(context))?;

    let document = state
        .flow
        .generate_assignment(&req)
        .await
        .map_err(|e| e.in_endpoint(context))?;

    let headers = [
        (header::CONTENT_TYPE, PDF_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{DOWNLOAD_FILE_NAME}\""),
        ),
        (
            header::HeaderName::from_static("x-document-id"),
            document.id.to_string(),
        ),
    ];
    Ok((headers, document.bytes).into_response())
}

/// POST /assignment/check（multipart: out_of_marks, check_prompt, file）
pub async fn check_assignment(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<EvaluationResult>> {
    let context = "Assignment checking failed";
    let form = read_check_form(multipart)
        .await
        .map_err(|e| AppError::from(e).in_endpoint(context))?;

    info!(
        "收到批改请求: 文件 {} | 满分 {}",
        form.file_name.as_deref().unwrap_or("<unnamed>"),
        form.out_of_marks
    );

    let result = state
        .flow
        .check_assignment(form.out_of_marks, form.check_prompt, form.file_bytes)
        .await
        .map_err(|e| e.in_endpoint(context))?;

    Ok(Json(result))
}

/// POST /content/generate
pub async fn generate_content(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ContentRequest>, JsonRejection>,
) -> AppResult<Json<ContentResponse>> {
    let context = "Content generation failed";
    let Json(req) = payload
        .map_err(json_error)
        .map_err(|e| e.in_endpoint(context))?;

    let content = state
        .flow
        .generate_content(&req)
        .await
        .map_err(|e| e.in_endpoint(context))?;

    Ok(Json(ContentResponse { content }))
}

/// POST /feedback/generate
pub async fn generate_feedback(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> AppResult<Json<FeedbackResponse>> {
    let context = "Feedback generation failed";
    let Json(req) = payload
        .map_err(json_error)
        .map_err(|e| e.in_endpoint(context))?;

    let feedback = state
        .flow
        .generate_feedback(&req)
        .await
        .map_err(|e| e.in_endpoint(context))?;

    Ok(Json(FeedbackResponse { feedback }))
}

pub async fn not_found() -> AppError {
    AppError::NotFound
}

fn json_error(rejection: JsonRejection) -> AppError {
    RequestError::Json(rejection.body_text()).into()
}

fn multipart_error(err: MultipartError) -> RequestError {
    RequestError::Multipart(err.body_text())
}

/// 批改表单
struct CheckForm {
    out_of_marks: u32,
    check_prompt: String,
    file_name: Option<String>,
    file_bytes: Vec<u8>,
}

async fn read_check_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<CheckForm, RequestError> {
    let mut multipart = multipart.map_err(|e| RequestError::Multipart(e.body_text()))?;

    let mut out_of_marks = None;
    let mut check_prompt = None;
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "out_of_marks" => out_of_marks = Some(field.text().await.map_err(multipart_error)?),
            "check_prompt" => check_prompt = Some(field.text().await.map_err(multipart_error)?),
            "file" => {
                let content_type = field.content_type().map(str::to_string);
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some((content_type, file_name, bytes.to_vec()));
            }
            // 未知字段忽略
            _ => {}
        }
    }

    let out_of_marks = out_of_marks.ok_or(RequestError::MissingField("out_of_marks"))?;
    let check_prompt = check_prompt.ok_or(RequestError::MissingField("check_prompt"))?;
    let (content_type, file_name, file_bytes) = file.ok_or(RequestError::MissingField("file"))?;

    let out_of_marks = parse_out_of_marks(&out_of_marks)?;

    if !is_pdf(content_type.as_deref()) {
        return Err(RequestError::InvalidContentType { content_type });
    }

    Ok(CheckForm {
        out_of_marks,
        check_prompt,
        file_name,
        file_bytes,
    })
}

fn parse_out_of_marks(value: &str) -> Result<u32, RequestError> {
    let invalid = |reason: &str| RequestError::InvalidField {
        field: "out_of_marks",
        reason: reason.to_string(),
    };
    match value.trim().parse::<u32>() {
        Ok(0) => Err(invalid("must be a positive integer")),
        Ok(marks) => Ok(marks),
        Err(_) => Err(invalid(&format!("'{}' is not an integer", value))),
    }
}

fn is_pdf(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case(PDF_CONTENT_TYPE))
        .unwrap_or(false)
}
