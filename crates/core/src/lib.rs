pub mod clock;
pub mod error;
pub mod feedback;
pub mod generate;
pub mod interview;
pub mod prompts;
pub mod questions;
pub mod session;
pub mod speech;
pub mod store;

pub use clock::{ClockTick, SessionClock};
pub use error::SessionError;
pub use feedback::{FeedbackReport, QuestionFeedback};
pub use generate::{GeminiClient, GeminiError, Interviewer};
pub use interview::{InterviewConfig, InterviewKind};
pub use session::{SessionController, SessionOutcome, SessionSnapshot, SessionState, SessionView};
pub use speech::{SpeechError, SpeechIo};
pub use store::{SessionRecord, SessionStore, StoreError};
