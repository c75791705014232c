//! Dual countdown clocks for a live session.
//!
//! Two independent one-second countdowns: the session clock bounds the whole
//! interview and starts exactly once, when the first question becomes
//! available; the answer clock bounds a single spoken answer and is reset to
//! its ceiling every time it starts or the question changes. Ticks are
//! delivered by the runtime; this type only does the bookkeeping.

/// Session ceiling: 20 minutes.
pub const DEFAULT_SESSION_SECS: u32 = 20 * 60;
/// Per-answer ceiling: 2 minutes.
pub const DEFAULT_ANSWER_SECS: u32 = 2 * 60;

/// What a single elapsed second meant. Session expiry takes priority when
/// both clocks hit zero on the same tick, so the session terminates rather
/// than advancing to a question nobody will answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTick {
    None,
    SessionExpired,
    AnswerExpired,
}

#[derive(Debug, Clone)]
pub struct SessionClock {
    session_ceiling: u32,
    answer_ceiling: u32,
    session_remaining: u32,
    answer_remaining: u32,
    session_running: bool,
    answer_running: bool,
    session_started: bool,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::with_ceilings(DEFAULT_SESSION_SECS, DEFAULT_ANSWER_SECS)
    }

    pub fn with_ceilings(session_secs: u32, answer_secs: u32) -> Self {
        Self {
            session_ceiling: session_secs,
            answer_ceiling: answer_secs,
            session_remaining: session_secs,
            answer_remaining: answer_secs,
            session_running: false,
            answer_running: false,
            session_started: false,
        }
    }

    /// Starts the session countdown. The session clock starts at most once
    /// per session; later calls are no-ops.
    pub fn start_session_clock(&mut self) {
        if !self.session_started && self.session_remaining > 0 {
            self.session_started = true;
            self.session_running = true;
        }
    }

    pub fn stop_session_clock(&mut self) {
        self.session_running = false;
    }

    /// Resets the answer countdown to its ceiling and starts it.
    pub fn start_answer_clock(&mut self) {
        self.answer_remaining = self.answer_ceiling;
        self.answer_running = true;
    }

    pub fn stop_answer_clock(&mut self) {
        self.answer_running = false;
    }

    /// Stops the answer countdown and restores its ceiling, without starting
    /// it. Used when the current question changes.
    pub fn reset_answer_clock(&mut self) {
        self.answer_running = false;
        self.answer_remaining = self.answer_ceiling;
    }

    /// Consumes one elapsed second. Expiry fires exactly once per clock: the
    /// expiring clock stops itself before the event is reported.
    pub fn tick(&mut self) -> ClockTick {
        if self.session_running {
            self.session_remaining = self.session_remaining.saturating_sub(1);
            if self.session_remaining == 0 {
                self.session_running = false;
                return ClockTick::SessionExpired;
            }
        }
        if self.answer_running {
            self.answer_remaining = self.answer_remaining.saturating_sub(1);
            if self.answer_remaining == 0 {
                self.answer_running = false;
                return ClockTick::AnswerExpired;
            }
        }
        ClockTick::None
    }

    pub fn session_remaining(&self) -> u32 {
        self.session_remaining
    }

    pub fn answer_remaining(&self) -> u32 {
        self.answer_remaining
    }

    pub fn answer_ceiling(&self) -> u32 {
        self.answer_ceiling
    }

    pub fn session_running(&self) -> bool {
        self.session_running
    }

    pub fn answer_running(&self) -> bool {
        self.answer_running
    }

    /// Restores the session countdown from a saved snapshot. Keeps the clock
    /// running state consistent with whether the session had already begun.
    pub fn restore_session_remaining(&mut self, secs: u32) {
        self.session_remaining = secs.min(self.session_ceiling);
        if self.session_started && self.session_remaining == 0 {
            self.session_running = false;
        }
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}
