//! 提示词构建 - 业务能力层
//!
//! 纯函数：结构化请求 → 发给模型的提示词，不做任何校验。

use phf::phf_map;

use crate::models::{AssignmentRequest, CheckRequest, ContentRequest, FeedbackRequest};

/// 已知的内容类型及其说明（键为小写）
static CONTENT_TYPE_GUIDES: phf::Map<&'static str, &'static str> = phf_map! {
    "summary" => "Provide a concise summary of the topic.",
    "detailed notes" => "Generate detailed notes covering all aspects.",
    "flashcards" => "Provide at least 5 flashcard-style Q&A.",
    "concept map" => "Describe key concepts and how they relate.",
};

/// 查找内容类型的说明，大小写不敏感
pub fn content_type_guide(content_type: &str) -> Option<&'static str> {
    CONTENT_TYPE_GUIDES
        .get(content_type.trim().to_lowercase().as_str())
        .copied()
}

/// 作业生成提示词
pub fn assignment_prompt(req: &AssignmentRequest) -> String {
    format!(
        r#"Generate an academic assignment with the following details:
- Subject: {}
- Assignment Type: {}
- Word Limit: {}
- Deadline: {}
- Topic: {}

Provide a detailed assignment with instructions and at least 5 AI-generated questions."#,
        req.subject, req.assignment_type, req.word_limit, req.deadline, req.topic
    )
}

/// 学习内容提示词
pub fn content_prompt(req: &ContentRequest) -> String {
    let mut prompt = format!(
        r#"Generate educational content for the topic: {}
Content Type: {}

Options:
- Summary: Provide a concise summary of the topic.
- Detailed Notes: Generate detailed notes covering all aspects.
- Flashcards: Provide at least 5 flashcard-style Q&A.
- Concept Map: Describe key concepts and how they relate."#,
        req.topic_name, req.content_type
    );

    if let Some(guide) = content_type_guide(&req.content_type) {
        prompt.push_str("\n\nRequested format: ");
        prompt.push_str(guide);
    }

    prompt
}

/// 反馈生成提示词
pub fn feedback_prompt(req: &FeedbackRequest) -> String {
    format!(
        r#"Generate feedback for the following student submission.

Submission:
{}

Preferences:
- Tone: {}
- Focus: {}
- Length: {}
- Auto-Grading: {}

Provide detailed, constructive feedback."#,
        req.student_submission,
        req.feedback_tone,
        req.feedback_focus,
        req.feedback_length,
        if req.include_auto_grading {
            "Enabled"
        } else {
            "Disabled"
        }
    )
}

/// 作业批改提示词，要求模型按固定 JSON 格式返回
pub fn check_prompt(req: &CheckRequest) -> String {
    format!(
        r#"You are an AI-based assignment evaluator. Carefully review the student's submission.

**Assignment Submission:**
{submission}

**Evaluation Criteria:**
{criteria}

**Marking Scheme:**
- Maximum Marks: {max}

**Response Format (Important! Return JSON only):**
{{
  "feedback": "Your detailed feedback here.",
  "marks_scored": <marks out of {max}>
}}"#,
        submission = req.submission_text,
        criteria = req.check_prompt,
        max = req.out_of_marks
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_prompt_lists_every_field() {
        let prompt = assignment_prompt(&AssignmentRequest {
            subject: "Physics".to_string(),
            assignment_type: "Problem Set".to_string(),
            word_limit: 800,
            deadline: "2026-11-01".to_string(),
            topic: "Kinematics".to_string(),
        });

        assert!(prompt.contains("- Subject: Physics"));
        assert!(prompt.contains("- Assignment Type: Problem Set"));
        assert!(prompt.contains("- Word Limit: 800"));
        assert!(prompt.contains("- Deadline: 2026-11-01"));
        assert!(prompt.contains("- Topic: Kinematics"));
        assert!(prompt.contains("at least 5 AI-generated questions"));
    }

    #[test]
    fn content_prompt_adds_guide_for_known_type() {
        let known = content_prompt(&ContentRequest {
            topic_name: "Photosynthesis".to_string(),
            content_type: "FlashCards".to_string(),
        });
        let unknown = content_prompt(&ContentRequest {
            topic_name: "Photosynthesis".to_string(),
            content_type: "Poem".to_string(),
        });

        assert!(known.ends_with("Requested format: Provide at least 5 flashcard-style Q&A."));
        assert!(unknown.contains("Content Type: Poem"));
        assert!(!unknown.contains("Requested format"));
    }

    #[test]
    fn feedback_prompt_reports_auto_grading_flag() {
        let mut req = FeedbackRequest {
            student_submission: "The mitochondria is the powerhouse.".to_string(),
            feedback_tone: "Supportive".to_string(),
            feedback_focus: "Comprehensive".to_string(),
            feedback_length: "Short".to_string(),
            include_auto_grading: true,
        };
        assert!(feedback_prompt(&req).contains("- Auto-Grading: Enabled"));

        req.include_auto_grading = false;
        let prompt = feedback_prompt(&req);
        assert!(prompt.contains("- Auto-Grading: Disabled"));
        assert!(prompt.contains("The mitochondria is the powerhouse."));
    }

    #[test]
    fn check_prompt_embeds_marks_and_format() {
        let prompt = check_prompt(&CheckRequest {
            out_of_marks: 20,
            check_prompt: "Grade for clarity".to_string(),
            submission_text: "My essay".to_string(),
        });

        assert!(prompt.contains("- Maximum Marks: 20"));
        assert!(prompt.contains("\"marks_scored\": <marks out of 20>"));
        assert!(prompt.contains("Grade for clarity"));
        assert!(prompt.contains("My essay"));
    }

    #[test]
    fn prompts_are_deterministic() {
        let req = ContentRequest {
            topic_name: "Rust".to_string(),
            content_type: "Summary".to_string(),
        };
        assert_eq!(content_prompt(&req), content_prompt(&req));
    }
}
