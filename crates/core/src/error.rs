use thiserror::Error;

use crate::generate::GeminiError;
use crate::speech::SpeechError;

/// Errors surfaced by the session controller. Feedback and persistence
/// failures at termination are reported through the session outcome instead,
/// since the session still ends.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid interview configuration: {0}")]
    ConfigurationInvalid(String),

    #[error("operation not valid in the current session state: {0}")]
    InvalidState(String),

    #[error("question generation failed: {0}")]
    GenerationFailed(#[source] GeminiError),

    #[error("speech failed: {0}")]
    Speech(#[from] SpeechError),
}
