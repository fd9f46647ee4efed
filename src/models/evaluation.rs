use serde::{Serialize, Serializer};
use serde_json::Value;

/// 未找到分数时返回给客户端的文本
pub const MARKS_NOT_FOUND: &str = "Marks not found.";
/// JSON 代码块解析失败时返回给客户端的文本
pub const MARKS_PARSE_ERROR: &str = "Error parsing feedback JSON.";

/// 从模型回复中提取出的分数
///
/// `Found` 保存原始 JSON 值，不做类型转换（模型可能返回 `7`、`"7"` 或 `7.5`）。
#[derive(Debug, Clone, PartialEq)]
pub enum MarksScored {
    Found(Value),
    NotFound,
    ParseError,
}

impl MarksScored {
    /// 数值形式的分数（若可表示为整数）
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MarksScored::Found(value) => value.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MarksScored::Found(value) => value.as_f64(),
            _ => None,
        }
    }
}

impl From<u64> for MarksScored {
    fn from(marks: u64) -> Self {
        MarksScored::Found(Value::from(marks))
    }
}

impl Serialize for MarksScored {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            MarksScored::Found(value) => value.serialize(serializer),
            MarksScored::NotFound => serializer.serialize_str(MARKS_NOT_FOUND),
            MarksScored::ParseError => serializer.serialize_str(MARKS_PARSE_ERROR),
        }
    }
}

/// 批改结果
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    pub feedback: String,
    pub marks_scored: MarksScored,
}
