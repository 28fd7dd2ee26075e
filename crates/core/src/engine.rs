//! The level engine: drives one level's question loop and decides pass/fail.
//!
//! ```text
//! NotStarted ──start──▶ AwaitingAnswer ──submit (×10)──▶ LevelComplete
//!                            ▲    │                          │
//!                            └────┘ submit (<10)             └─retry/advance─▶ AwaitingAnswer
//! ```

use chrono::Duration;

use crate::error::EngineError;
use crate::model::{
    Grade, Level, LevelResult, LevelSession, LockedLevelError, Question, SessionState,
};
use crate::provider::QuestionProvider;
use crate::time::Clock;

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// What the caller should render after a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionOutcome {
    /// The level goes on with this question.
    Continue(Question),
    /// The tenth answer was graded; the level is over.
    LevelComplete(LevelResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The next level was started.
    Started(Level),
    /// The last level of the grade was passed; nothing left to start.
    GradeComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    NotStarted,
    AwaitingAnswer,
    LevelComplete,
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Synchronous level engine owning the player's session state.
pub struct LevelEngine {
    state: SessionState,
    provider: Box<dyn QuestionProvider>,
    clock: Clock,
    level: Option<LevelSession>,
}

impl LevelEngine {
    #[must_use]
    pub fn new(state: SessionState, provider: impl QuestionProvider + 'static) -> Self {
        Self {
            state,
            provider: Box::new(provider),
            clock: Clock::default(),
            level: None,
        }
    }

    /// Override the clock (usually for deterministic testing).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Mutable access for grade/mode/name selection between levels.
    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    #[must_use]
    pub fn into_state(self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    #[must_use]
    pub fn level_session(&self) -> Option<&LevelSession> {
        self.level.as_ref()
    }

    #[must_use]
    pub fn engine_state(&self) -> EngineState {
        match &self.level {
            None => EngineState::NotStarted,
            Some(session) if session.is_complete() => EngineState::LevelComplete,
            Some(_) => EngineState::AwaitingAnswer,
        }
    }

    /// Begin (or restart) a level and issue its first question.
    ///
    /// # Errors
    ///
    /// Returns `LockedLevelError` if `level` is above the grade's unlock
    /// ceiling. The engine is left exactly as it was.
    pub fn start(&mut self, grade: Grade, level: Level) -> Result<(), LockedLevelError> {
        self.state.ensure_playable(grade, level)?;

        self.state.enter_level(grade, level);
        let now = self.clock.now();
        let mut session = LevelSession::new(grade, level, now);
        let question = self.provider.next_question(grade, self.state.mode());
        session.issue(question, now);

        tracing::debug!(
            grade = grade.value(),
            level = level.value(),
            attempt = %session.attempt_id(),
            "level started"
        );
        self.level = Some(session);
        Ok(())
    }

    /// Replay the active level (or the selected one when nothing was started).
    ///
    /// # Errors
    ///
    /// Returns `LockedLevelError` only if the selected level is locked, which
    /// cannot happen for a level that was already played.
    pub fn retry(&mut self) -> Result<(), LockedLevelError> {
        let (grade, level) = match &self.level {
            Some(session) => (session.grade(), session.level()),
            None => (self.state.grade(), self.state.current_level()),
        };
        self.start(grade, level)
    }

    /// After a passed level, move on to the next one.
    ///
    /// # Errors
    ///
    /// - `EngineError::NoActiveLevel` if no level was played.
    /// - `EngineError::LevelInProgress` if the level is not finished yet.
    /// - `EngineError::NotPassed` if the finished level was failed.
    pub fn advance_level(&mut self) -> Result<AdvanceOutcome, EngineError> {
        let session = self.level.as_ref().ok_or(EngineError::NoActiveLevel)?;
        let result = session.result().ok_or(EngineError::LevelInProgress)?;
        if !result.passed() {
            return Err(EngineError::NotPassed);
        }
        let grade = session.grade();
        let Some(next) = session.level().next() else {
            tracing::info!(grade = grade.value(), "all levels of grade completed");
            return Ok(AdvanceOutcome::GradeComplete);
        };
        self.start(grade, next)?;
        Ok(AdvanceOutcome::Started(next))
    }

    /// Drop the level in progress. Nothing is recorded for it.
    pub fn abandon(&mut self) {
        if let Some(session) = self.level.take() {
            tracing::debug!(
                attempt = %session.attempt_id(),
                answered = session.questions_answered(),
                "level abandoned"
            );
        }
    }

    /// The question awaiting an answer.
    ///
    /// If a level is active but holds no question, one is requested on the spot.
    ///
    /// # Errors
    ///
    /// - `EngineError::NoActiveLevel` before any level was started.
    /// - `EngineError::LevelComplete` once the tenth answer has been graded.
    pub fn current_question(&mut self) -> Result<&Question, EngineError> {
        let mode = self.state.mode();
        let session = self.level.as_mut().ok_or(EngineError::NoActiveLevel)?;
        if session.is_complete() {
            return Err(EngineError::LevelComplete);
        }
        if session.current_question().is_none() {
            tracing::debug!(attempt = %session.attempt_id(), "re-issuing missing question");
            let question = self.provider.next_question(session.grade(), mode);
            session.issue(question, self.clock.now());
        }
        session.current_question().ok_or(EngineError::NoActiveLevel)
    }

    /// Grade `raw` against the current question and move the level forward.
    ///
    /// Malformed input is graded as incorrect, never reported as an error.
    ///
    /// # Errors
    ///
    /// - `EngineError::NoActiveLevel` before any level was started.
    /// - `EngineError::LevelComplete` once the level is over.
    pub fn submit(&mut self, raw: &str) -> Result<QuestionOutcome, EngineError> {
        self.current_question()?;

        let now = self.clock.now();
        let mode = self.state.mode();
        let session = self.level.as_mut().ok_or(EngineError::NoActiveLevel)?;
        let issued = session.take_current().ok_or(EngineError::NoActiveLevel)?;

        let is_correct = issued.question.is_correct(raw);
        if is_correct {
            self.state.award_correct();
        } else {
            self.state.note_miss(issued.question.topic());
        }

        let finished = session.record(issued, raw, is_correct, now);
        if let Some(entry) = session.last_entry() {
            self.state.push_history(entry.clone());
        }

        let Some(result) = finished else {
            let question = self.provider.next_question(session.grade(), mode);
            let next = session.issue(question, now).clone();
            return Ok(QuestionOutcome::Continue(next));
        };

        let (grade, level) = (session.grade(), session.level());
        let raised = self
            .state
            .progress_mut()
            .record_result(grade, level, result);
        tracing::info!(
            grade = grade.value(),
            level = level.value(),
            correct = result.correct_count(),
            percent = result.percent(),
            passed = result.passed(),
            unlocked = raised.map(|l| l.value()),
            "level complete"
        );
        Ok(QuestionOutcome::LevelComplete(result))
    }

    /// Submit an empty answer because the question timer ran out.
    ///
    /// # Errors
    ///
    /// Same as [`LevelEngine::submit`].
    pub fn submit_timeout(&mut self) -> Result<QuestionOutcome, EngineError> {
        self.submit("")
    }

    /// Time left to answer the current question, if one is awaiting an answer.
    #[must_use]
    pub fn time_remaining(&self) -> Option<Duration> {
        let issued_at = self.level.as_ref()?.current_issued_at()?;
        let remaining = self.state.settings().time_limit() - self.clock.since(issued_at);
        Some(remaining.max(Duration::zero()))
    }

    #[must_use]
    pub fn is_time_up(&self) -> bool {
        self.time_remaining()
            .is_some_and(|remaining| remaining <= Duration::zero())
    }
}

impl std::fmt::Debug for LevelEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelEngine")
            .field("state", &self.state)
            .field("clock", &self.clock)
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}
