//! Gemini-backed question and feedback generation.
//!
//! The `Interviewer` trait is the seam between the session controller and the
//! model provider. The controller only ever talks to the trait; unit tests
//! substitute `mockall`'s generated mock, and the real `GeminiClient` lives
//! behind it so a different provider can be wired in without touching the
//! session logic.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::feedback::{self, FeedbackReport};
use crate::interview::{InterviewConfig, InterviewKind};
use crate::prompts;
use crate::questions;

/// Model used when the caller does not pick one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Prompts above this length are rejected before any request is sent.
pub const MAX_PROMPT_CHARS: usize = 10_000;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1/models";
const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("prompt too long: {0} chars")]
    PromptTooLong(usize),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model returned no content")]
    EmptyResponse,

    #[error("feedback response was not valid JSON")]
    FeedbackParse,
}

/// Everything the session controller needs from the model provider.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait Interviewer: Send + Sync {
    /// Generates the opening question batch for a session.
    async fn initial_questions(
        &self,
        config: &InterviewConfig,
        prior_sessions: u32,
    ) -> Result<Vec<String>, GeminiError>;

    /// Generates a mid-session continuation batch without introductory
    /// questions.
    async fn more_questions(
        &self,
        config: &InterviewConfig,
        prior_sessions: u32,
    ) -> Result<Vec<String>, GeminiError>;

    /// Scores the answered transcript and returns the structured report.
    async fn feedback(
        &self,
        kind: InterviewKind,
        pairs: &[(String, String)],
    ) -> Result<FeedbackReport, GeminiError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    role: &'static str,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

impl GenerateRequest {
    fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
        }
    }

    pub fn with_default_model(api_key: String) -> Self {
        Self::new(api_key, DEFAULT_MODEL.to_string())
    }

    /// Sends one prompt and returns the first candidate's text.
    ///
    /// Retries up to three attempts total: 503 (model overloaded) backs off
    /// `attempt * 2` seconds, transport failures back off `attempt * 1`
    /// seconds. All other API errors are final.
    async fn generate(&self, prompt: &str) -> Result<String, GeminiError> {
        if self.api_key.trim().is_empty() {
            return Err(GeminiError::MissingApiKey);
        }
        if prompt.len() > MAX_PROMPT_CHARS {
            return Err(GeminiError::PromptTooLong(prompt.len()));
        }

        let url = format!("{BASE_URL}/{}:generateContent?key={}", self.model, self.api_key);
        let body = GenerateRequest::from_prompt(prompt);

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.send_once(&url, &body).await {
                Ok(text) => return Ok(text),
                Err(GeminiError::Api { status: 503, message }) if attempt < MAX_ATTEMPTS => {
                    let delay = Duration::from_secs(u64::from(attempt) * 2);
                    tracing::warn!(attempt, ?delay, %message, "model overloaded, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(GeminiError::Transport(err)) if attempt < MAX_ATTEMPTS => {
                    let delay = Duration::from_secs(u64::from(attempt));
                    tracing::warn!(attempt, ?delay, error = %err, "request failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn send_once(&self, url: &str, body: &GenerateRequest) -> Result<String, GeminiError> {
        let resp = self.client.post(url).json(body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed = resp.json::<GenerateResponse>().await?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(GeminiError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl Interviewer for GeminiClient {
    async fn initial_questions(
        &self,
        config: &InterviewConfig,
        prior_sessions: u32,
    ) -> Result<Vec<String>, GeminiError> {
        let prompt = prompts::initial_prompt(config, prior_sessions);
        let text = self.generate(&prompt).await?;
        Ok(questions::extract_questions(&text))
    }

    async fn more_questions(
        &self,
        config: &InterviewConfig,
        prior_sessions: u32,
    ) -> Result<Vec<String>, GeminiError> {
        let prompt = prompts::continuation_prompt(config, prior_sessions);
        let text = self.generate(&prompt).await?;
        Ok(questions::extract_questions(&text))
    }

    async fn feedback(
        &self,
        kind: InterviewKind,
        pairs: &[(String, String)],
    ) -> Result<FeedbackReport, GeminiError> {
        let prompt = prompts::feedback_prompt(kind, pairs);
        let text = self.generate(&prompt).await?;
        feedback::parse_report(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn config() -> InterviewConfig {
        InterviewConfig {
            candidate: "Asha Rao".into(),
            email: None,
            role: "Backend Engineer".into(),
            company: None,
            graduation: "B.Tech".into(),
            experience: "2 years".into(),
            kind: InterviewKind::Technical,
            job_description: None,
            resume: "Rust, PostgreSQL".into(),
        }
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_request() {
        let client = GeminiClient::with_default_model(String::new());
        let result = client.initial_questions(&config(), 0).await;
        assert!(matches!(result, Err(GeminiError::MissingApiKey)));
    }

    #[tokio::test]
    async fn oversized_prompt_fails_before_any_request() {
        let client = GeminiClient::with_default_model("key".into());
        let mut big = config();
        big.resume = "x".repeat(6_000);
        big.job_description = Some("y".repeat(6_000));
        let result = client.initial_questions(&big, 0).await;
        assert!(matches!(result, Err(GeminiError::PromptTooLong(_))));
    }

    // Live integration test against the real Gemini API. Ignored by default so
    // `cargo test` runs without a key; run with `cargo test -- --ignored`.
    #[tokio::test]
    #[ignore]
    async fn live_initial_questions() {
        dotenvy::dotenv_override().ok();
        let api_key = env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY not set");
        let client = GeminiClient::with_default_model(api_key);

        let qs = client
            .initial_questions(&config(), 0)
            .await
            .expect("question generation failed");
        println!("questions: {qs:#?}");
        assert!(qs.len() > 3, "should return a real question batch");
    }
}
