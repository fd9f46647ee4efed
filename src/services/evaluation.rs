//! 批改结果解析 - 业务能力层
//!
//! 只负责从模型回复中提取"反馈 + 分数"，不关心回复从哪里来。
//!
//! 解析顺序：
//! 1. 第一个 ```` ```json ```` 代码块：解析成功则读取 `marks_scored` 字段；
//!    解析失败直接返回 [`MarksScored::ParseError`]，不再尝试下一步
//! 2. 全文查找 `N/满分` 形式的分数，取第一个

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{EvaluationResult, MarksScored};

static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\s*\n(.*?)\n```").expect("valid fence pattern"));

/// 解析模型回复，任何输入都不会失败
///
/// `feedback` 原样保留 `raw_text`。
pub fn interpret(raw_text: &str, max_score: u32) -> EvaluationResult {
    let marks_scored = extract_marks(raw_text, max_score);

    if let Some(marks) = marks_scored.as_f64() {
        if marks < 0.0 || marks > f64::from(max_score) {
            // 不截断，只记录
            warn!("模型给出的分数 {} 超出范围 [0, {}]", marks, max_score);
        }
    }

    EvaluationResult {
        feedback: raw_text.to_string(),
        marks_scored,
    }
}

/// 提取分数
pub fn extract_marks(raw_text: &str, max_score: u32) -> MarksScored {
    if let Some(block) = JSON_FENCE.captures(raw_text).and_then(|c| c.get(1)) {
        debug!("找到 JSON 代码块，长度: {} 字符", block.as_str().len());
        return marks_from_json_block(block.as_str());
    }

    marks_from_fraction(raw_text, max_score)
}

fn marks_from_json_block(block: &str) -> MarksScored {
    match serde_json::from_str::<Value>(block) {
        Ok(Value::Object(map)) => map
            .get("marks_scored")
            .cloned()
            .map(MarksScored::Found)
            .unwrap_or(MarksScored::NotFound),
        Ok(other) => {
            debug!("JSON 代码块不是对象: {}", other);
            MarksScored::NotFound
        }
        Err(e) => {
            warn!("JSON 代码块解析失败: {}", e);
            MarksScored::ParseError
        }
    }
}

fn marks_from_fraction(raw_text: &str, max_score: u32) -> MarksScored {
    let pattern = format!(r"([0-9]+)\s*/\s*{}", max_score);
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            warn!("分数匹配模式无效 {}: {}", pattern, e);
            return MarksScored::NotFound;
        }
    };

    let first = re.captures(raw_text).and_then(|c| c.get(1)).map(|m| m.as_str());
    match first {
        Some(digits) => marks_from_digits(digits),
        None => MarksScored::NotFound,
    }
}

// 只取第一个匹配；超出 u64 的分数按 JSON 浮点数保留
fn marks_from_digits(digits: &str) -> MarksScored {
    if let Ok(marks) = digits.parse::<u64>() {
        return MarksScored::from(marks);
    }
    match digits.trim_start_matches('0').parse::<serde_json::Number>() {
        Ok(number) => MarksScored::Found(Value::Number(number)),
        Err(e) => {
            warn!("分数 {} 无法表示为数字: {}", digits, e);
            MarksScored::NotFound
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fenced_json_wins_over_fraction() {
        let raw = "Here you go.\n```json\n{\"feedback\": \"Solid\", \"marks_scored\": 7}\n```\nI would say 9/10.";
        let result = interpret(raw, 10);

        assert_eq!(result.feedback, raw);
        assert_eq!(result.marks_scored, MarksScored::Found(json!(7)));
    }

    #[test]
    fn fraction_fallback() {
        let result = interpret("Great work, 8/10 overall.", 10);
        assert_eq!(result.marks_scored, MarksScored::Found(json!(8)));
        assert_eq!(result.feedback, "Great work, 8/10 overall.");
    }

    #[test]
    fn fraction_allows_spaces_and_takes_first_match() {
        assert_eq!(extract_marks("first 12 / 20, later 15/20", 20).as_i64(), Some(12));
    }

    #[test]
    fn oversized_first_fraction_is_not_skipped() {
        let marks = extract_marks("99999999999999999999/10 but really 3/10", 10);

        assert_eq!(marks.as_i64(), None);
        match marks {
            MarksScored::Found(value) => assert_eq!(value.as_f64(), Some(1e20)),
            other => panic!("unexpected marks: {other:?}"),
        }
    }

    #[test]
    fn fraction_digits_are_ascii_only() {
        assert_eq!(extract_marks("\u{0668}/10", 10), MarksScored::NotFound);
        assert_eq!(extract_marks("\u{0668}/10 or 8/10", 10).as_i64(), Some(8));
    }

    #[test]
    fn fraction_must_use_max_score() {
        assert_eq!(extract_marks("scored 4/5 on part one", 10), MarksScored::NotFound);
    }

    #[test]
    fn empty_text_is_not_found() {
        assert_eq!(extract_marks("", 10), MarksScored::NotFound);
    }

    #[test]
    fn plain_prose_is_not_found() {
        let result = interpret("Nice essay, but cite your sources.", 25);
        assert_eq!(result.marks_scored, MarksScored::NotFound);
    }

    #[test]
    fn malformed_json_is_parse_error_without_fallback() {
        let raw = "```json\n{\"marks_scored\": 6,}\n```\nScore: 6/10";
        assert_eq!(extract_marks(raw, 10), MarksScored::ParseError);
    }

    #[test]
    fn json_without_field_is_not_found() {
        let raw = "```json\n{\"feedback\": \"missing score\"}\n```";
        assert_eq!(extract_marks(raw, 10), MarksScored::NotFound);
    }

    #[test]
    fn json_array_is_not_found() {
        let raw = "```json\n[1, 2, 3]\n```";
        assert_eq!(extract_marks(raw, 10), MarksScored::NotFound);
    }

    #[test]
    fn only_first_fence_is_considered() {
        let raw = "```json\n{\"marks_scored\": 3}\n```\n\n```json\n{\"marks_scored\": 9}\n```";
        assert_eq!(extract_marks(raw, 10).as_i64(), Some(3));
    }

    #[test]
    fn field_type_is_not_coerced() {
        let raw = "```json\n{\"marks_scored\": \"8.5\"}\n```";
        assert_eq!(extract_marks(raw, 10), MarksScored::Found(json!("8.5")));
    }

    #[test]
    fn out_of_range_fallback_is_accepted() {
        assert_eq!(extract_marks("You get 15/10!", 10).as_i64(), Some(15));
    }

    #[test]
    fn fence_with_trailing_spaces_after_tag() {
        let raw = "```json   \n{\"marks_scored\": 4}\n```";
        assert_eq!(extract_marks(raw, 5).as_i64(), Some(4));
    }

    #[test]
    fn unterminated_fence_falls_back_to_fraction() {
        let raw = "```json\n{\"marks_scored\": 4}\nNo closing fence, 3/5";
        assert_eq!(extract_marks(raw, 5).as_i64(), Some(3));
    }
}
