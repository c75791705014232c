//! Question batches, captured answers, and extraction of question lines from
//! free-text model output.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A numbered or bulleted list line ending in a question mark. The marker is
/// captured separately so it can be stripped before the line is spoken.
static LIST_QUESTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d+\.|[-•])\s?(.+\?)$").expect("static regex"));

/// Extracts interview questions from a free-text model response.
///
/// Tiers, in order of preference:
/// 1. numbered/bulleted lines ending in `?` (list markers stripped);
/// 2. any line longer than 10 characters ending in `?`;
/// 3. the entire raw response as a single question.
///
/// The last tier means the result is never empty for non-empty input, so a
/// model that ignores the one-question-per-line instruction still produces a
/// usable (if ugly) batch instead of a dead session.
pub fn extract_questions(text: &str) -> Vec<String> {
    let listed: Vec<String> = text
        .lines()
        .filter_map(|line| {
            LIST_QUESTION
                .captures(line.trim())
                .map(|caps| caps[1].trim().to_string())
        })
        .collect();
    if !listed.is_empty() {
        return listed;
    }

    let plain: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| line.len() > 10 && line.ends_with('?'))
        .map(str::to_string)
        .collect();
    if !plain.is_empty() {
        return plain;
    }

    vec![text.to_string()]
}

/// Ordered question sequence for one session. Batches may be appended
/// mid-session but the sequence is never reordered or truncated.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct QuestionBatch {
    questions: Vec<String>,
}

impl QuestionBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.questions.get(index).map(String::as_str)
    }

    /// Appends a continuation batch, preserving existing order.
    pub fn extend_with(&mut self, batch: Vec<String>) {
        self.questions.extend(batch);
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.questions.iter().map(String::as_str)
    }
}

/// Captured transcript per question index. An unanswered question is simply
/// absent; no placeholder text is ever stored. Recording an answer for an
/// index replaces any prior take at that index.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    answers: BTreeMap<usize, String>,
}

impl AnswerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the finalized transcript for a question, replacing any earlier
    /// take. Stopping and restarting a capture does not append.
    pub fn record(&mut self, index: usize, transcript: String) {
        self.answers.insert(index, transcript);
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    /// True when no question has a non-empty answer.
    pub fn is_effectively_empty(&self) -> bool {
        self.answers.values().all(|a| a.trim().is_empty())
    }

    /// The (question, answer) pairs with non-empty answers, in batch order.
    /// Unanswered questions never reach the feedback generator.
    pub fn answered_pairs(&self, batch: &QuestionBatch) -> Vec<(String, String)> {
        batch
            .iter()
            .enumerate()
            .filter_map(|(i, question)| {
                self.answers
                    .get(&i)
                    .filter(|answer| !answer.trim().is_empty())
                    .map(|answer| (question.to_string(), answer.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_numbered_and_bulleted_lines() {
        let text = "Here are your questions:\n1. Tell me about yourself?\n- What is ownership in Rust?\n• How do you handle deadlines?\nGood luck!";
        let qs = extract_questions(text);
        assert_eq!(
            qs,
            vec![
                "Tell me about yourself?",
                "What is ownership in Rust?",
                "How do you handle deadlines?"
            ]
        );
    }

    #[test]
    fn falls_back_to_plain_question_lines() {
        let text = "Intro text without questions\nWhat does a B-tree index optimize?\nshort?\n";
        let qs = extract_questions(text);
        assert_eq!(qs, vec!["What does a B-tree index optimize?"]);
    }

    #[test]
    fn falls_back_to_whole_response() {
        let text = "The model refused to produce a list today.";
        let qs = extract_questions(text);
        assert_eq!(qs, vec![text.to_string()]);
    }

    #[test]
    fn recording_replaces_prior_take() {
        let mut answers = AnswerRecord::new();
        answers.record(0, "A".into());
        answers.record(0, "B".into());
        assert_eq!(answers.get(0), Some("B"));
    }

    #[test]
    fn answered_pairs_skip_unanswered_in_order() {
        let mut batch = QuestionBatch::new();
        batch.extend_with(vec![
            "Q0?".into(),
            "Q1?".into(),
            "Q2?".into(),
            "Q3?".into(),
            "Q4?".into(),
        ]);
        let mut answers = AnswerRecord::new();
        answers.record(4, "a4".into());
        answers.record(0, "a0".into());
        answers.record(2, "a2".into());
        answers.record(1, "  ".into()); // whitespace-only counts as unanswered

        let pairs = answers.answered_pairs(&batch);
        assert_eq!(
            pairs,
            vec![
                ("Q0?".to_string(), "a0".to_string()),
                ("Q2?".to_string(), "a2".to_string()),
                ("Q4?".to_string(), "a4".to_string()),
            ]
        );
    }

    #[test]
    fn empty_record_is_effectively_empty() {
        let mut answers = AnswerRecord::new();
        assert!(answers.is_effectively_empty());
        answers.record(0, "  ".into());
        assert!(answers.is_effectively_empty());
        answers.record(1, "real answer".into());
        assert!(!answers.is_effectively_empty());
    }
}
