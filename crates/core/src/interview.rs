use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SessionError;

/// Upper bound on the free-text fields (resume, job description).
pub const MAX_FREE_TEXT: usize = 8 * 1024;

/// The closed set of interview categories. The original product inferred the
/// category from free-text matching at render time; here it is fixed at
/// configuration time, and the HR/Managerial pairing used for scoring is an
/// explicit method rather than a string check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterviewKind {
    Technical,
    Hr,
    Managerial,
}

impl InterviewKind {
    /// Human-readable label, as used inside prompts and stored records.
    pub fn label(&self) -> &'static str {
        match self {
            InterviewKind::Technical => "Technical",
            InterviewKind::Hr => "HR",
            InterviewKind::Managerial => "Managerial",
        }
    }

    /// HR and Managerial sessions are scored on communication plus a combined
    /// logical/behavioral dimension; Technical sessions on communication plus
    /// a technical dimension. The two groupings are mutually exclusive.
    pub fn uses_behavioral_scoring(&self) -> bool {
        matches!(self, InterviewKind::Hr | InterviewKind::Managerial)
    }
}

impl fmt::Display for InterviewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for InterviewKind {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "technical" => Ok(InterviewKind::Technical),
            "hr" => Ok(InterviewKind::Hr),
            "managerial" => Ok(InterviewKind::Managerial),
            other => Err(SessionError::ConfigurationInvalid(format!(
                "unknown interview kind: {other}"
            ))),
        }
    }
}

/// Immutable candidate/session input captured before the session starts.
/// Created once by the upstream form; the controller only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewConfig {
    pub candidate: String,
    /// Candidate identity used to key stored sessions. Falls back to the
    /// candidate name when absent.
    pub email: Option<String>,
    pub role: String,
    pub company: Option<String>,
    /// Education background line, e.g. "B.Tech"; may be empty.
    pub graduation: String,
    pub experience: String,
    pub kind: InterviewKind,
    pub job_description: Option<String>,
    pub resume: String,
}

impl InterviewConfig {
    /// Rejects missing or oversized inputs before a session is allowed to
    /// start. Only validated input ever reaches the prompt builders.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.candidate.trim().is_empty() {
            return Err(SessionError::ConfigurationInvalid(
                "candidate name is required".into(),
            ));
        }
        if self.role.trim().is_empty() {
            return Err(SessionError::ConfigurationInvalid(
                "target role is required".into(),
            ));
        }
        if self.experience.trim().is_empty() {
            return Err(SessionError::ConfigurationInvalid(
                "years of experience is required".into(),
            ));
        }
        if self.resume.trim().is_empty() {
            return Err(SessionError::ConfigurationInvalid(
                "resume content is required".into(),
            ));
        }
        if self.resume.len() > MAX_FREE_TEXT {
            return Err(SessionError::ConfigurationInvalid(format!(
                "resume content exceeds {MAX_FREE_TEXT} bytes"
            )));
        }
        if let Some(jd) = &self.job_description {
            if jd.len() > MAX_FREE_TEXT {
                return Err(SessionError::ConfigurationInvalid(format!(
                    "job description exceeds {MAX_FREE_TEXT} bytes"
                )));
            }
        }
        Ok(())
    }

    /// Identity string used for stored records and prior-session lookups.
    pub fn identity(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.candidate)
    }
}
