//! The live session controller.
//!
//! Owns the question batch, captured answers, dual clocks, and the state
//! machine for one mock interview. All external effects go through the three
//! trait seams (`Interviewer`, `SpeechIo`, `SessionStore`), so the whole
//! lifecycle is testable against mocks.
//!
//! The controller runs on a single logical task: every operation takes
//! `&mut self`, so state checks before an `.await` cannot race with another
//! operation on the same session.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::clock::{ClockTick, SessionClock};
use crate::error::SessionError;
use crate::feedback::FeedbackReport;
use crate::generate::Interviewer;
use crate::interview::InterviewConfig;
use crate::questions::{AnswerRecord, QuestionBatch};
use crate::speech::SpeechIo;
use crate::store::{SessionRecord, SessionStore};

/// Lifecycle of one session. Strictly forward, except that
/// `AwaitingAnswer` and `Capturing` alternate as takes start and stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No questions yet; generation has not succeeded.
    Initializing,
    /// A question is current and the candidate is not being recorded.
    AwaitingAnswer,
    /// The candidate's answer is being transcribed.
    Capturing,
    /// Moving to the next question (transient).
    Advancing,
    /// Termination in progress; feedback may be in flight.
    Ending,
    /// Terminal. The outcome says how it ended.
    Ended,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionOutcome {
    /// Feedback was generated and the session persisted.
    Report(FeedbackReport),
    /// Nothing was answered, so no evaluation was attempted.
    NoAnswersProvided,
    /// Feedback or persistence failed; nothing was stored.
    Failed(String),
}

/// Serializable mid-session checkpoint, so an interrupted session can resume
/// with its questions, answers, and remaining time intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub questions: QuestionBatch,
    pub answers: AnswerRecord,
    pub current_index: usize,
    pub session_seconds_remaining: u32,
}

/// Read-only projection of the controller for a UI.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub state: SessionState,
    pub current_question: Option<String>,
    pub question_index: usize,
    pub total_questions: usize,
    pub session_seconds_remaining: u32,
    pub answer_seconds_remaining: u32,
    pub partial_transcript: Option<String>,
    pub outcome: Option<SessionOutcome>,
}

pub struct SessionController {
    config: InterviewConfig,
    interviewer: Arc<dyn Interviewer>,
    speech: Arc<dyn SpeechIo>,
    store: Arc<dyn SessionStore>,
    questions: QuestionBatch,
    answers: AnswerRecord,
    clock: SessionClock,
    current_index: usize,
    partial: Option<String>,
    state: SessionState,
    outcome: Option<SessionOutcome>,
    prior_sessions: u32,
}

impl SessionController {
    pub fn new(
        config: InterviewConfig,
        interviewer: Arc<dyn Interviewer>,
        speech: Arc<dyn SpeechIo>,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, SessionError> {
        Self::with_clock(config, interviewer, speech, store, SessionClock::new())
    }

    /// Like `new`, with injectable clock ceilings.
    pub fn with_clock(
        config: InterviewConfig,
        interviewer: Arc<dyn Interviewer>,
        speech: Arc<dyn SpeechIo>,
        store: Arc<dyn SessionStore>,
        clock: SessionClock,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self {
            config,
            interviewer,
            speech,
            store,
            questions: QuestionBatch::new(),
            answers: AnswerRecord::new(),
            clock,
            current_index: 0,
            partial: None,
            state: SessionState::Initializing,
            outcome: None,
            prior_sessions: 0,
        })
    }

    /// Generates the opening question batch. Idempotent: once a batch
    /// exists, later calls do nothing. The session clock starts on the first
    /// successful batch, and the first question is spoken.
    ///
    /// On generation failure the session stays `Initializing` so the caller
    /// can retry.
    pub async fn load_questions(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Initializing || !self.questions.is_empty() {
            return Ok(());
        }

        // The difficulty bias degrades gracefully: a store that cannot count
        // prior sessions means standard questions, not a dead session.
        self.prior_sessions = match self
            .store
            .completed_sessions(self.config.identity(), self.config.kind)
            .await
        {
            Ok(count) => count,
            Err(err) => {
                tracing::warn!(error = %err, "could not count prior sessions, assuming none");
                0
            }
        };

        let batch = self
            .interviewer
            .initial_questions(&self.config, self.prior_sessions)
            .await
            .map_err(SessionError::GenerationFailed)?;
        tracing::info!(count = batch.len(), "question batch ready");

        self.questions.extend_with(batch);
        self.clock.start_session_clock();
        self.state = SessionState::AwaitingAnswer;
        self.speak_current().await;
        Ok(())
    }

    /// Begins capturing the candidate's answer to the current question and
    /// starts the per-answer countdown. If capture cannot start, the state
    /// and answer clock are left untouched.
    pub async fn start_answering(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::AwaitingAnswer {
            return Err(SessionError::InvalidState(
                "can only start answering while awaiting an answer".into(),
            ));
        }
        if let Err(err) = self.speech.cancel_playback().await {
            tracing::warn!(error = %err, "could not cancel playback before capture");
        }
        self.speech.begin_capture().await?;

        self.partial = None;
        self.clock.start_answer_clock();
        self.state = SessionState::Capturing;
        Ok(())
    }

    /// Finalizes the current take. The transcript replaces any earlier take
    /// for this question.
    pub async fn stop_answering(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Capturing {
            return Err(SessionError::InvalidState(
                "no capture in progress".into(),
            ));
        }
        let result = self.speech.end_capture().await;
        self.clock.stop_answer_clock();
        self.partial = None;
        self.state = SessionState::AwaitingAnswer;

        let transcript = result?;
        self.answers.record(self.current_index, transcript);
        Ok(())
    }

    /// Advances to the next question. A capture in progress is finalized
    /// first. The index never moves past the last question; the answer
    /// clock is reset to its ceiling either way.
    pub async fn next_question(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::Capturing {
            if let Err(err) = self.stop_answering().await {
                tracing::warn!(error = %err, "could not finalize take before advancing");
            }
        }
        if self.state != SessionState::AwaitingAnswer {
            return Err(SessionError::InvalidState(
                "cannot advance before questions are loaded or after the session ended".into(),
            ));
        }

        self.clock.reset_answer_clock();
        if self.current_index + 1 < self.questions.len() {
            self.state = SessionState::Advancing;
            self.current_index += 1;
            self.speak_current().await;
            self.state = SessionState::AwaitingAnswer;
        }
        Ok(())
    }

    /// Replays the current question aloud.
    pub async fn repeat_question(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::AwaitingAnswer {
            return Err(SessionError::InvalidState(
                "can only repeat while awaiting an answer".into(),
            ));
        }
        if let Err(err) = self.speech.cancel_playback().await {
            tracing::warn!(error = %err, "could not cancel playback before repeat");
        }
        self.speak_current().await;
        Ok(())
    }

    /// Appends a continuation batch. Only valid on the last question while
    /// the session clock is still running; the current index and any answer
    /// in progress are untouched.
    pub async fn request_more_questions(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::AwaitingAnswer {
            return Err(SessionError::InvalidState(
                "can only request more questions between answers".into(),
            ));
        }
        if self.current_index + 1 < self.questions.len() {
            return Err(SessionError::InvalidState(
                "questions remain in the current batch".into(),
            ));
        }
        if !self.clock.session_running() {
            return Err(SessionError::InvalidState(
                "session time is up".into(),
            ));
        }

        let batch = self
            .interviewer
            .more_questions(&self.config, self.prior_sessions)
            .await
            .map_err(SessionError::GenerationFailed)?;
        tracing::info!(count = batch.len(), "continuation batch appended");
        self.questions.extend_with(batch);
        Ok(())
    }

    /// Terminates the session. Idempotent: the first call decides the
    /// outcome, later calls do nothing.
    ///
    /// With no answered questions the session ends as `NoAnswersProvided`
    /// and the evaluator is never called. Otherwise feedback is generated
    /// over the answered pairs only; on success the record is persisted
    /// exactly once, and a feedback or persistence failure ends the session
    /// as `Failed` with nothing stored.
    pub async fn end_session(&mut self) -> Result<(), SessionError> {
        if matches!(self.state, SessionState::Ending | SessionState::Ended) {
            return Ok(());
        }
        let was_capturing = self.state == SessionState::Capturing;
        self.state = SessionState::Ending;
        self.clock.stop_answer_clock();
        self.clock.stop_session_clock();

        if let Err(err) = self.speech.cancel_playback().await {
            tracing::warn!(error = %err, "could not cancel playback during termination");
        }
        if was_capturing {
            match self.speech.end_capture().await {
                Ok(transcript) => self.answers.record(self.current_index, transcript),
                Err(err) => {
                    tracing::warn!(error = %err, "could not finalize the last take");
                }
            }
        }

        let pairs = self.answers.answered_pairs(&self.questions);
        if pairs.is_empty() {
            tracing::info!("session ended with no answers, skipping evaluation");
            self.outcome = Some(SessionOutcome::NoAnswersProvided);
            self.state = SessionState::Ended;
            return Ok(());
        }

        tracing::info!(answered = pairs.len(), "requesting feedback");
        match self.interviewer.feedback(self.config.kind, &pairs).await {
            Ok(report) => {
                let record = SessionRecord::new(
                    self.config.identity().to_string(),
                    self.config.kind,
                    self.config.role.clone(),
                    Some(report.clone()),
                );
                match self.store.append(&record).await {
                    Ok(()) => {
                        tracing::info!(id = %record.id, "session persisted");
                        self.outcome = Some(SessionOutcome::Report(report));
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "session could not be persisted");
                        self.outcome = Some(SessionOutcome::Failed(err.to_string()));
                    }
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "feedback generation failed");
                self.outcome = Some(SessionOutcome::Failed(err.to_string()));
            }
        }
        self.state = SessionState::Ended;
        Ok(())
    }

    /// Consumes one elapsed second. Session expiry terminates through the
    /// same path as a manual end; answer expiry advances to the next
    /// question, but only if a capture is actually in progress.
    pub async fn tick(&mut self) -> Result<(), SessionError> {
        if matches!(self.state, SessionState::Ending | SessionState::Ended) {
            return Ok(());
        }
        match self.clock.tick() {
            ClockTick::SessionExpired => {
                tracing::info!("session time expired");
                self.end_session().await
            }
            ClockTick::AnswerExpired => {
                if self.state == SessionState::Capturing {
                    tracing::info!("answer time expired, advancing");
                    self.next_question().await
                } else {
                    Ok(())
                }
            }
            ClockTick::None => Ok(()),
        }
    }

    /// Live partial transcript from the recognizer, display-only. Ignored
    /// unless a capture is in progress.
    pub fn observe_partial(&mut self, text: String) {
        if self.state == SessionState::Capturing {
            self.partial = Some(text);
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            questions: self.questions.clone(),
            answers: self.answers.clone(),
            current_index: self.current_index,
            session_seconds_remaining: self.clock.session_remaining(),
        }
    }

    /// Rebuilds mid-session state from a snapshot. Only meaningful on a
    /// freshly constructed controller.
    pub fn restore(&mut self, snapshot: SessionSnapshot) {
        self.current_index = snapshot
            .current_index
            .min(snapshot.questions.len().saturating_sub(1));
        self.answers = snapshot.answers;
        if !snapshot.questions.is_empty() {
            self.clock.start_session_clock();
            self.state = SessionState::AwaitingAnswer;
        }
        self.questions = snapshot.questions;
        self.clock
            .restore_session_remaining(snapshot.session_seconds_remaining);
    }

    /// Abandons the session: stops clocks and releases speech resources
    /// without generating feedback or persisting anything.
    pub async fn close(&mut self) {
        self.clock.stop_answer_clock();
        self.clock.stop_session_clock();
        if let Err(err) = self.speech.cancel_playback().await {
            tracing::warn!(error = %err, "could not cancel playback on close");
        }
        if let Err(err) = self.speech.release().await {
            tracing::warn!(error = %err, "could not release speech resources");
        }
        self.state = SessionState::Ended;
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            state: self.state,
            current_question: self.current_question().map(str::to_string),
            question_index: self.current_index,
            total_questions: self.questions.len(),
            session_seconds_remaining: self.clock.session_remaining(),
            answer_seconds_remaining: self.clock.answer_remaining(),
            partial_transcript: self.partial.clone(),
            outcome: self.outcome.clone(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn outcome(&self) -> Option<&SessionOutcome> {
        self.outcome.as_ref()
    }

    pub fn current_question(&self) -> Option<&str> {
        self.questions.get(self.current_index)
    }

    pub fn answer_seconds_remaining(&self) -> u32 {
        self.clock.answer_remaining()
    }

    pub fn session_seconds_remaining(&self) -> u32 {
        self.clock.session_remaining()
    }

    // Speaking the question is best-effort: a synthesis failure leaves the
    // question on screen and the session usable.
    async fn speak_current(&mut self) {
        let Some(question) = self.questions.get(self.current_index) else {
            return;
        };
        if let Err(err) = self.speech.speak(question).await {
            tracing::warn!(error = %err, "could not speak the current question");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::DEFAULT_ANSWER_SECS;
    use crate::feedback::FeedbackReport;
    use crate::generate::MockInterviewer;
    use crate::interview::InterviewKind;
    use crate::speech::MockSpeechIo;
    use crate::store::MockSessionStore;
    use mockall::Sequence;

    fn config() -> InterviewConfig {
        InterviewConfig {
            candidate: "Asha Rao".into(),
            email: Some("asha@example.com".into()),
            role: "Backend Engineer".into(),
            company: Some("Initech".into()),
            graduation: "B.Tech".into(),
            experience: "2 years".into(),
            kind: InterviewKind::Technical,
            job_description: Some("Build APIs".into()),
            resume: "Rust, PostgreSQL, Kafka".into(),
        }
    }

    fn report() -> FeedbackReport {
        FeedbackReport {
            overall_score: 80.0,
            communication_score: 82.0,
            technical_score: Some(78.0),
            logical_behavioral_score: None,
            interview_summary: "Good session.".into(),
            overall_suggestions: vec!["Practice aloud".into()],
            questions: vec![],
        }
    }

    fn quiet_speech() -> MockSpeechIo {
        let mut speech = MockSpeechIo::new();
        speech
            .expect_speak()
            .returning(|_| Box::pin(async { Ok(()) }));
        speech
            .expect_cancel_playback()
            .returning(|| Box::pin(async { Ok(()) }));
        speech
            .expect_begin_capture()
            .returning(|| Box::pin(async { Ok(()) }));
        speech
    }

    fn counting_store(prior: u32) -> MockSessionStore {
        let mut store = MockSessionStore::new();
        store
            .expect_completed_sessions()
            .returning(move |_, _| Box::pin(async move { Ok(prior) }));
        store
    }

    fn three_questions() -> MockInterviewer {
        let mut interviewer = MockInterviewer::new();
        interviewer.expect_initial_questions().returning(|_, _| {
            Box::pin(async {
                Ok(vec![
                    "Q0?".to_string(),
                    "Q1?".to_string(),
                    "Q2?".to_string(),
                ])
            })
        });
        interviewer
    }

    fn controller(
        interviewer: MockInterviewer,
        speech: MockSpeechIo,
        store: MockSessionStore,
        clock: SessionClock,
    ) -> SessionController {
        SessionController::with_clock(
            config(),
            Arc::new(interviewer),
            Arc::new(speech),
            Arc::new(store),
            clock,
        )
        .expect("valid config")
    }

    #[tokio::test]
    async fn end_session_is_idempotent_and_persists_once() {
        let mut interviewer = three_questions();
        interviewer
            .expect_feedback()
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(report()) }));

        let mut speech = quiet_speech();
        speech
            .expect_end_capture()
            .returning(|| Box::pin(async { Ok("my answer".to_string()) }));

        let mut store = counting_store(0);
        store
            .expect_append()
            .times(1)
            .returning(|_| Box::pin(async { Ok(()) }));

        let mut session = controller(interviewer, speech, store, SessionClock::new());
        session.load_questions().await.unwrap();
        session.start_answering().await.unwrap();
        session.stop_answering().await.unwrap();

        session.end_session().await.unwrap();
        session.end_session().await.unwrap();
        session.end_session().await.unwrap();

        assert_eq!(session.state(), SessionState::Ended);
        assert!(matches!(
            session.outcome(),
            Some(SessionOutcome::Report(_))
        ));
    }

    #[tokio::test]
    async fn retake_replaces_the_previous_answer() {
        let interviewer = three_questions();

        let mut speech = quiet_speech();
        let mut seq = Sequence::new();
        speech
            .expect_end_capture()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Box::pin(async { Ok("first take".to_string()) }));
        speech
            .expect_end_capture()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Box::pin(async { Ok("second take".to_string()) }));

        let mut session = controller(
            interviewer,
            speech,
            counting_store(0),
            SessionClock::new(),
        );
        session.load_questions().await.unwrap();

        session.start_answering().await.unwrap();
        session.stop_answering().await.unwrap();
        session.start_answering().await.unwrap();
        session.stop_answering().await.unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.answers.get(0), Some("second take"));
    }

    #[tokio::test]
    async fn advancing_resets_the_answer_clock() {
        let interviewer = three_questions();
        let mut speech = quiet_speech();
        speech
            .expect_end_capture()
            .returning(|| Box::pin(async { Ok("answer".to_string()) }));

        let clock = SessionClock::with_ceilings(600, DEFAULT_ANSWER_SECS);
        let mut session = controller(interviewer, speech, counting_store(0), clock);
        session.load_questions().await.unwrap();

        session.start_answering().await.unwrap();
        session.tick().await.unwrap();
        session.tick().await.unwrap();
        assert_eq!(session.answer_seconds_remaining(), DEFAULT_ANSWER_SECS - 2);

        session.next_question().await.unwrap();
        assert_eq!(session.answer_seconds_remaining(), DEFAULT_ANSWER_SECS);
        assert_eq!(session.view().question_index, 1);
    }

    #[tokio::test]
    async fn index_never_moves_past_the_last_question() {
        let interviewer = three_questions();
        let mut session = controller(
            interviewer,
            quiet_speech(),
            counting_store(0),
            SessionClock::new(),
        );
        session.load_questions().await.unwrap();

        for _ in 0..5 {
            session.next_question().await.unwrap();
        }
        assert_eq!(session.view().question_index, 2);
        assert_eq!(session.state(), SessionState::AwaitingAnswer);
    }

    #[tokio::test]
    async fn no_answers_short_circuits_the_evaluator() {
        let mut interviewer = three_questions();
        interviewer.expect_feedback().never();

        let mut store = counting_store(0);
        store.expect_append().never();

        let mut session = controller(interviewer, quiet_speech(), store, SessionClock::new());
        session.load_questions().await.unwrap();

        session.end_session().await.unwrap();
        assert_eq!(session.state(), SessionState::Ended);
        assert!(matches!(
            session.outcome(),
            Some(SessionOutcome::NoAnswersProvided)
        ));
    }

    #[tokio::test]
    async fn feedback_sees_only_answered_pairs_in_order() {
        let mut interviewer = three_questions();
        interviewer
            .expect_feedback()
            .times(1)
            .withf(|_, pairs| {
                pairs
                    == [
                        ("Q0?".to_string(), "a0".to_string()),
                        ("Q2?".to_string(), "a2".to_string()),
                    ]
            })
            .returning(|_, _| Box::pin(async { Ok(report()) }));

        let mut speech = quiet_speech();
        let mut seq = Sequence::new();
        speech
            .expect_end_capture()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Box::pin(async { Ok("a0".to_string()) }));
        speech
            .expect_end_capture()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Box::pin(async { Ok("a2".to_string()) }));

        let mut store = counting_store(0);
        store
            .expect_append()
            .times(1)
            .returning(|_| Box::pin(async { Ok(()) }));

        let mut session = controller(interviewer, speech, store, SessionClock::new());
        session.load_questions().await.unwrap();

        session.start_answering().await.unwrap();
        session.stop_answering().await.unwrap();
        session.next_question().await.unwrap(); // Q1 left unanswered
        session.next_question().await.unwrap();
        session.start_answering().await.unwrap();
        session.stop_answering().await.unwrap();

        session.end_session().await.unwrap();
        assert!(matches!(
            session.outcome(),
            Some(SessionOutcome::Report(_))
        ));
    }

    #[tokio::test]
    async fn session_expiry_terminates_like_a_manual_end() {
        let mut interviewer = three_questions();
        interviewer.expect_feedback().never();

        let mut store = counting_store(0);
        store.expect_append().never();

        let clock = SessionClock::with_ceilings(3, 120);
        let mut session = controller(interviewer, quiet_speech(), store, clock);
        session.load_questions().await.unwrap();

        for _ in 0..3 {
            session.tick().await.unwrap();
        }
        assert_eq!(session.state(), SessionState::Ended);
        assert!(matches!(
            session.outcome(),
            Some(SessionOutcome::NoAnswersProvided)
        ));

        // Further ticks after termination are harmless.
        session.tick().await.unwrap();
        assert_eq!(session.state(), SessionState::Ended);
    }

    #[tokio::test]
    async fn answer_expiry_advances_only_while_capturing() {
        let interviewer = three_questions();
        let mut speech = quiet_speech();
        speech
            .expect_end_capture()
            .returning(|| Box::pin(async { Ok("ran out of time".to_string()) }));

        let clock = SessionClock::with_ceilings(600, 2);
        let mut session = controller(interviewer, speech, counting_store(0), clock);
        session.load_questions().await.unwrap();

        session.start_answering().await.unwrap();
        session.tick().await.unwrap();
        session.tick().await.unwrap();

        assert_eq!(session.state(), SessionState::AwaitingAnswer);
        assert_eq!(session.view().question_index, 1);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.answers.get(0), Some("ran out of time"));
    }

    #[tokio::test]
    async fn failed_capture_start_leaves_state_untouched() {
        let interviewer = three_questions();
        let mut speech = MockSpeechIo::new();
        speech
            .expect_speak()
            .returning(|_| Box::pin(async { Ok(()) }));
        speech
            .expect_cancel_playback()
            .returning(|| Box::pin(async { Ok(()) }));
        speech.expect_begin_capture().returning(|| {
            Box::pin(async {
                Err(crate::speech::SpeechError::CapabilityUnavailable(
                    "no microphone".into(),
                ))
            })
        });

        let mut session = controller(
            interviewer,
            speech,
            counting_store(0),
            SessionClock::new(),
        );
        session.load_questions().await.unwrap();

        let result = session.start_answering().await;
        assert!(matches!(result, Err(SessionError::Speech(_))));
        assert_eq!(session.state(), SessionState::AwaitingAnswer);
        assert!(session.view().partial_transcript.is_none());
        assert_eq!(session.answer_seconds_remaining(), DEFAULT_ANSWER_SECS);
    }

    #[tokio::test]
    async fn generation_failure_keeps_the_session_initializing() {
        let mut interviewer = MockInterviewer::new();
        let mut seq = Sequence::new();
        interviewer
            .expect_initial_questions()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Box::pin(async {
                    Err(crate::generate::GeminiError::Api {
                        status: 503,
                        message: "overloaded".into(),
                    })
                })
            });
        interviewer
            .expect_initial_questions()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Box::pin(async { Ok(vec!["Q0?".to_string()]) }));

        let mut session = controller(
            interviewer,
            quiet_speech(),
            counting_store(0),
            SessionClock::new(),
        );

        let first = session.load_questions().await;
        assert!(matches!(first, Err(SessionError::GenerationFailed(_))));
        assert_eq!(session.state(), SessionState::Initializing);

        session.load_questions().await.unwrap();
        assert_eq!(session.state(), SessionState::AwaitingAnswer);
        assert_eq!(session.current_question(), Some("Q0?"));
    }

    #[tokio::test]
    async fn more_questions_append_without_moving_the_index() {
        let mut interviewer = three_questions();
        interviewer
            .expect_more_questions()
            .times(1)
            .returning(|_, _| {
                Box::pin(async { Ok(vec!["Q3?".to_string(), "Q4?".to_string()]) })
            });

        let mut session = controller(
            interviewer,
            quiet_speech(),
            counting_store(0),
            SessionClock::new(),
        );
        session.load_questions().await.unwrap();

        // Mid-batch requests are rejected.
        assert!(session.request_more_questions().await.is_err());

        session.next_question().await.unwrap();
        session.next_question().await.unwrap();
        session.request_more_questions().await.unwrap();

        let view = session.view();
        assert_eq!(view.total_questions, 5);
        assert_eq!(view.question_index, 2);

        session.next_question().await.unwrap();
        assert_eq!(session.current_question(), Some("Q3?"));
    }

    #[tokio::test]
    async fn failed_feedback_ends_without_persisting() {
        let mut interviewer = three_questions();
        interviewer.expect_feedback().times(1).returning(|_, _| {
            Box::pin(async {
                Err(crate::generate::GeminiError::Api {
                    status: 500,
                    message: "boom".into(),
                })
            })
        });

        let mut speech = quiet_speech();
        speech
            .expect_end_capture()
            .returning(|| Box::pin(async { Ok("an answer".to_string()) }));

        let mut store = counting_store(0);
        store.expect_append().never();

        let mut session = controller(interviewer, speech, store, SessionClock::new());
        session.load_questions().await.unwrap();
        session.start_answering().await.unwrap();
        session.stop_answering().await.unwrap();

        session.end_session().await.unwrap();
        assert!(matches!(
            session.outcome(),
            Some(SessionOutcome::Failed(_))
        ));
    }

    #[tokio::test]
    async fn ending_while_capturing_salvages_the_last_take() {
        let mut interviewer = three_questions();
        interviewer
            .expect_feedback()
            .times(1)
            .withf(|_, pairs| pairs == [("Q0?".to_string(), "salvaged".to_string())])
            .returning(|_, _| Box::pin(async { Ok(report()) }));

        let mut speech = quiet_speech();
        speech
            .expect_end_capture()
            .returning(|| Box::pin(async { Ok("salvaged".to_string()) }));

        let mut store = counting_store(0);
        store
            .expect_append()
            .times(1)
            .returning(|_| Box::pin(async { Ok(()) }));

        let mut session = controller(interviewer, speech, store, SessionClock::new());
        session.load_questions().await.unwrap();
        session.start_answering().await.unwrap();

        session.end_session().await.unwrap();
        assert!(matches!(
            session.outcome(),
            Some(SessionOutcome::Report(_))
        ));
    }

    #[tokio::test]
    async fn snapshot_restores_questions_answers_and_time() {
        let interviewer = three_questions();
        let mut speech = quiet_speech();
        speech
            .expect_end_capture()
            .returning(|| Box::pin(async { Ok("kept".to_string()) }));

        let clock = SessionClock::with_ceilings(600, 120);
        let mut session = controller(interviewer, speech, counting_store(0), clock);
        session.load_questions().await.unwrap();
        session.start_answering().await.unwrap();
        session.stop_answering().await.unwrap();
        session.next_question().await.unwrap();
        for _ in 0..10 {
            session.tick().await.unwrap();
        }

        let snapshot = session.snapshot();
        let encoded = serde_json::to_string(&snapshot).unwrap();
        let decoded: SessionSnapshot = serde_json::from_str(&encoded).unwrap();

        let mut resumed = controller(
            MockInterviewer::new(),
            quiet_speech(),
            counting_store(0),
            SessionClock::with_ceilings(600, 120),
        );
        resumed.restore(decoded);

        let view = resumed.view();
        assert_eq!(view.state, SessionState::AwaitingAnswer);
        assert_eq!(view.question_index, 1);
        assert_eq!(view.total_questions, 3);
        assert_eq!(view.session_seconds_remaining, 590);
        assert_eq!(resumed.snapshot().answers.get(0), Some("kept"));
    }

    #[tokio::test]
    async fn partials_only_surface_while_capturing() {
        let interviewer = three_questions();
        let mut session = controller(
            interviewer,
            quiet_speech(),
            counting_store(0),
            SessionClock::new(),
        );
        session.load_questions().await.unwrap();

        session.observe_partial("ignored".into());
        assert_eq!(session.view().partial_transcript, None);

        session.start_answering().await.unwrap();
        session.observe_partial("I would start by".into());
        assert_eq!(
            session.view().partial_transcript.as_deref(),
            Some("I would start by")
        );
    }

    #[tokio::test]
    async fn close_releases_speech_without_feedback() {
        let mut interviewer = three_questions();
        interviewer.expect_feedback().never();

        let mut speech = quiet_speech();
        speech
            .expect_release()
            .times(1)
            .returning(|| Box::pin(async { Ok(()) }));

        let mut store = counting_store(0);
        store.expect_append().never();

        let mut session = controller(interviewer, speech, store, SessionClock::new());
        session.load_questions().await.unwrap();

        session.close().await;
        assert_eq!(session.state(), SessionState::Ended);
        assert!(session.outcome().is_none());
    }
}
