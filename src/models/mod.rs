pub mod evaluation;
pub mod request;

pub use evaluation::{EvaluationResult, MarksScored, MARKS_NOT_FOUND, MARKS_PARSE_ERROR};
pub use request::{AssignmentRequest, CheckRequest, ContentRequest, FeedbackRequest};
