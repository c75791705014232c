//! Speech I/O seam between the session controller and the host platform.
//!
//! The controller never touches microphones or audio devices directly; it
//! drives this trait and the host wires in whatever capture and playback it
//! has. Tests substitute the generated mock.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeechError {
    /// The platform has no recognizer or synthesizer at all. Surfaces as a
    /// session-blocking error before any capture is attempted.
    #[error("speech capability unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("speech capture failed: {0}")]
    Capture(String),

    #[error("speech playback failed: {0}")]
    Playback(String),
}

/// Capture and playback operations the controller needs from the host.
///
/// `end_capture` returns the complete transcript of the take that just
/// finished; each take replaces the previous one for the same question, so
/// implementations must not accumulate text across captures.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait SpeechIo: Send + Sync {
    /// Starts transcribing the candidate. Any ongoing playback should be
    /// cancelled first so the prompt voice is not transcribed as an answer.
    async fn begin_capture(&self) -> Result<(), SpeechError>;

    /// Stops transcribing and returns the finalized transcript for this take.
    async fn end_capture(&self) -> Result<String, SpeechError>;

    /// Speaks a question aloud. Resolves when playback has been queued, not
    /// when it finishes.
    async fn speak(&self, text: &str) -> Result<(), SpeechError>;

    /// Stops any in-flight playback immediately.
    async fn cancel_playback(&self) -> Result<(), SpeechError>;

    /// Whether playback is currently audible.
    fn is_speaking(&self) -> bool;

    /// Releases capture and playback resources. Called exactly once when the
    /// session closes; must be safe even if capture never started.
    async fn release(&self) -> Result<(), SpeechError>;
}
