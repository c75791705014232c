//! Terminal-backed speech adapter.
//!
//! Stands in for a browser recognizer/synthesizer: questions are printed as
//! the interviewer's voice, and lines the candidate types between `start`
//! and `stop` become the "spoken" answer. Each capture starts from an empty
//! buffer, so a retake replaces the previous one.

use async_trait::async_trait;
use std::sync::Mutex;

use prepmate_core::speech::{SpeechError, SpeechIo};

#[derive(Default)]
pub struct ConsoleSpeech {
    // Some(lines) while a capture is in progress.
    take: Mutex<Option<Vec<String>>>,
}

impl ConsoleSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one typed line into the current take. Ignored when no capture
    /// is in progress.
    pub fn push_line(&self, line: &str) {
        if let Ok(mut take) = self.take.lock() {
            if let Some(lines) = take.as_mut() {
                lines.push(line.to_string());
            }
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.take.lock().map(|t| t.is_some()).unwrap_or(false)
    }
}

#[async_trait]
impl SpeechIo for ConsoleSpeech {
    async fn begin_capture(&self) -> Result<(), SpeechError> {
        let mut take = self
            .take
            .lock()
            .map_err(|_| SpeechError::Capture("capture state poisoned".into()))?;
        *take = Some(Vec::new());
        println!("(recording - type your answer, then 'stop')");
        Ok(())
    }

    async fn end_capture(&self) -> Result<String, SpeechError> {
        let mut take = self
            .take
            .lock()
            .map_err(|_| SpeechError::Capture("capture state poisoned".into()))?;
        let lines = take
            .take()
            .ok_or_else(|| SpeechError::Capture("no capture in progress".into()))?;
        Ok(lines.join(" "))
    }

    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        println!("\nInterviewer: {text}");
        Ok(())
    }

    async fn cancel_playback(&self) -> Result<(), SpeechError> {
        Ok(())
    }

    fn is_speaking(&self) -> bool {
        false
    }

    async fn release(&self) -> Result<(), SpeechError> {
        let mut take = self
            .take
            .lock()
            .map_err(|_| SpeechError::Capture("capture state poisoned".into()))?;
        *take = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn capture_collects_typed_lines() {
        let speech = ConsoleSpeech::new();
        speech.begin_capture().await.unwrap();
        speech.push_line("I would use");
        speech.push_line("a bounded queue");
        let transcript = speech.end_capture().await.unwrap();
        assert_eq!(transcript, "I would use a bounded queue");
        assert!(!speech.is_capturing());
    }

    #[tokio::test]
    async fn end_without_begin_is_an_error() {
        let speech = ConsoleSpeech::new();
        assert!(matches!(
            speech.end_capture().await,
            Err(SpeechError::Capture(_))
        ));
    }

    #[tokio::test]
    async fn lines_outside_a_capture_are_dropped() {
        let speech = ConsoleSpeech::new();
        speech.push_line("ignored");
        speech.begin_capture().await.unwrap();
        speech.push_line("kept");
        assert_eq!(speech.end_capture().await.unwrap(), "kept");
    }

    #[tokio::test]
    async fn each_capture_starts_fresh() {
        let speech = ConsoleSpeech::new();
        speech.begin_capture().await.unwrap();
        speech.push_line("first take");
        speech.end_capture().await.unwrap();

        speech.begin_capture().await.unwrap();
        speech.push_line("second take");
        assert_eq!(speech.end_capture().await.unwrap(), "second take");
    }
}
