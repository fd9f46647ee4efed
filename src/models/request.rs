use serde::{Deserialize, Serialize};

/// 作业生成请求（`/assignment/generate`）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRequest {
    pub subject: String,
    pub assignment_type: String,
    #[serde(deserialize_with = "deserialize_word_limit")]
    pub word_limit: u32,
    pub deadline: String,
    pub topic: String,
}

/// 学习内容生成请求（`/content/generate`）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRequest {
    pub topic_name: String,
    pub content_type: String,
}

/// 反馈生成请求（`/feedback/generate`）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub student_submission: String,
    /// Supportive, Constructive, Critical
    pub feedback_tone: String,
    /// Comprehensive 等
    pub feedback_focus: String,
    /// Short, Standard, Long
    pub feedback_length: String,
    pub include_auto_grading: bool,
}

/// 作业批改请求，由 multipart 表单和 PDF 提取文本组合而成
#[derive(Debug, Clone)]
pub struct CheckRequest {
    pub out_of_marks: u32,
    pub check_prompt: String,
    pub submission_text: String,
}

// 字数限制既可以是整数也可以是数字字符串
fn deserialize_word_limit<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct WordLimitVisitor;

    impl<'de> Visitor<'de> for WordLimitVisitor {
        type Value = u32;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a non-negative integer or a numeric string")
        }

        fn visit_u64<E>(self, value: u64) -> Result<u32, E>
        where
            E: serde::de::Error,
        {
            u32::try_from(value).map_err(|_| E::custom(format!("word_limit {value} is too large")))
        }

        fn visit_i64<E>(self, value: i64) -> Result<u32, E>
        where
            E: serde::de::Error,
        {
            u32::try_from(value).map_err(|_| E::custom(format!("word_limit {value} is out of range")))
        }

        fn visit_str<E>(self, value: &str) -> Result<u32, E>
        where
            E: serde::de::Error,
        {
            value
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("word_limit '{value}' is not an integer")))
        }
    }

    deserializer.deserialize_any(WordLimitVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_limit_accepts_numbers_and_numeric_strings() {
        let from_int: AssignmentRequest = serde_json::from_str(
            r#"{"subject":"History","assignment_type":"Essay","word_limit":500,"deadline":"Friday","topic":"Rome"}"#,
        )
        .unwrap();
        let from_str: AssignmentRequest = serde_json::from_str(
            r#"{"subject":"History","assignment_type":"Essay","word_limit":" 750 ","deadline":"Friday","topic":"Rome"}"#,
        )
        .unwrap();

        assert_eq!(from_int.word_limit, 500);
        assert_eq!(from_str.word_limit, 750);
    }

    #[test]
    fn word_limit_rejects_garbage() {
        let result = serde_json::from_str::<AssignmentRequest>(
            r#"{"subject":"History","assignment_type":"Essay","word_limit":"many","deadline":"Friday","topic":"Rome"}"#,
        );
        assert!(result.is_err());

        let negative = serde_json::from_str::<AssignmentRequest>(
            r#"{"subject":"History","assignment_type":"Essay","word_limit":-5,"deadline":"Friday","topic":"Rome"}"#,
        );
        assert!(negative.is_err());
    }
}
