//! Scored feedback report and tolerant parsing of the evaluator's JSON.

use serde::{Deserialize, Serialize};

use crate::generate::GeminiError;

/// Per-question evaluation. `technical_score`/`tech_comment` are present for
/// Technical sessions, `behavioral_comment` for HR/Managerial ones; the two
/// groups never appear together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionFeedback {
    pub question: String,
    pub answer: String,
    pub communication_score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_score: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fluency_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavioral_comment: Option<String>,
}

/// The evaluator's verdict on a completed session. Overall scores are on a
/// 0-100 scale, per-question scores on 1-10.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackReport {
    pub overall_score: f32,
    pub communication_score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_score: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_behavioral_score: Option<f32>,
    #[serde(default)]
    pub interview_summary: String,
    #[serde(default)]
    pub overall_suggestions: Vec<String>,
    #[serde(default)]
    pub questions: Vec<QuestionFeedback>,
}

/// Parses the model output into a report.
///
/// Tries the raw text as JSON first, then falls back to the widest
/// `{` .. `}` span. Models routinely wrap the object in prose or code
/// fences despite being told not to, and the span extraction recovers
/// those responses.
pub fn parse_report(raw: &str) -> Result<FeedbackReport, GeminiError> {
    let trimmed = raw.trim();
    if let Ok(report) = serde_json::from_str::<FeedbackReport>(trimmed) {
        return Ok(report);
    }

    let start = trimmed.find('{');
    let end = trimmed.rfind('}');
    if let (Some(start), Some(end)) = (start, end) {
        if start < end {
            if let Ok(report) = serde_json::from_str::<FeedbackReport>(&trimmed[start..=end]) {
                return Ok(report);
            }
        }
    }

    Err(GeminiError::FeedbackParse)
}
