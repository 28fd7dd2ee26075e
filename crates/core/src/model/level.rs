use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{AttemptId, Grade, Level, Question};
use crate::rules::{PASS_PERCENT, QUESTIONS_PER_LEVEL};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LevelResultError {
    #[error("correct count ({correct}) exceeds total ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },

    #[error("percent {percent} does not match {correct}/{total}")]
    PercentMismatch { percent: u8, correct: u32, total: u32 },

    #[error("passed flag does not match percent {percent}")]
    PassedMismatch { percent: u8 },
}

//
// ─── LEVEL RESULT ──────────────────────────────────────────────────────────────
//

/// Final score of a completed level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLevelResult")]
pub struct LevelResult {
    #[serde(rename = "correct")]
    correct_count: u32,
    total: u32,
    percent: u8,
    passed: bool,
}

impl LevelResult {
    /// Compute the result for `correct_count` right answers out of `total`.
    ///
    /// The percent is floored; a level passes at [`PASS_PERCENT`] or above.
    #[must_use]
    pub fn from_counts(correct_count: u32, total: u32) -> Self {
        let correct_count = correct_count.min(total);
        let percent = floor_percent(correct_count, total);
        Self {
            correct_count,
            total,
            percent,
            passed: percent >= PASS_PERCENT,
        }
    }

    /// Rehydrate a result from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `LevelResultError` if the stored fields disagree with each other.
    pub fn from_persisted(
        correct_count: u32,
        total: u32,
        percent: u8,
        passed: bool,
    ) -> Result<Self, LevelResultError> {
        if correct_count > total {
            return Err(LevelResultError::CorrectExceedsTotal {
                correct: correct_count,
                total,
            });
        }
        let expected = Self::from_counts(correct_count, total);
        if expected.percent != percent {
            return Err(LevelResultError::PercentMismatch {
                percent,
                correct: correct_count,
                total,
            });
        }
        if expected.passed != passed {
            return Err(LevelResultError::PassedMismatch { percent });
        }
        Ok(expected)
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn percent(&self) -> u8 {
        self.percent
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }
}

#[derive(Deserialize)]
struct RawLevelResult {
    correct: u32,
    total: u32,
    percent: u8,
    passed: bool,
}

impl TryFrom<RawLevelResult> for LevelResult {
    type Error = LevelResultError;

    fn try_from(raw: RawLevelResult) -> Result<Self, Self::Error> {
        Self::from_persisted(raw.correct, raw.total, raw.percent, raw.passed)
    }
}

fn floor_percent(correct: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = u64::from(correct) * 100 / u64::from(total);
    u8::try_from(percent.min(100)).unwrap_or(100)
}

//
// ─── QUESTION LOG ──────────────────────────────────────────────────────────────
//

/// One graded submission inside a level.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionLogEntry {
    /// 1-based position of the question within the level.
    pub q_no: u32,
    pub question: Question,
    pub given: String,
    pub is_correct: bool,
    pub elapsed_secs: f64,
    pub answered_at: DateTime<Utc>,
}

//
// ─── LEVEL SESSION ─────────────────────────────────────────────────────────────
//

/// Aggregated view of level progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelProgress {
    pub total: u32,
    pub answered: u32,
    pub remaining: u32,
    pub is_complete: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IssuedQuestion {
    pub(crate) question: Question,
    pub(crate) issued_at: DateTime<Utc>,
}

/// Mutable state of the one level currently being played.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSession {
    attempt_id: AttemptId,
    grade: Grade,
    level: Level,
    started_at: DateTime<Utc>,
    questions_answered: u32,
    correct_count: u32,
    log: Vec<QuestionLogEntry>,
    current: Option<IssuedQuestion>,
    result: Option<LevelResult>,
}

impl LevelSession {
    #[must_use]
    pub fn new(grade: Grade, level: Level, started_at: DateTime<Utc>) -> Self {
        Self {
            attempt_id: AttemptId::new_v4(),
            grade,
            level,
            started_at,
            questions_answered: 0,
            correct_count: 0,
            log: Vec::new(),
            current: None,
            result: None,
        }
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn grade(&self) -> Grade {
        self.grade
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn questions_answered(&self) -> u32 {
        self.questions_answered
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn log(&self) -> &[QuestionLogEntry] {
        &self.log
    }

    #[must_use]
    pub fn last_entry(&self) -> Option<&QuestionLogEntry> {
        self.log.last()
    }

    /// The question awaiting an answer, if one has been issued.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.current.as_ref().map(|issued| &issued.question)
    }

    #[must_use]
    pub fn current_issued_at(&self) -> Option<DateTime<Utc>> {
        self.current.as_ref().map(|issued| issued.issued_at)
    }

    #[must_use]
    pub fn result(&self) -> Option<&LevelResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.result.is_some()
    }

    #[must_use]
    pub fn progress(&self) -> LevelProgress {
        LevelProgress {
            total: QUESTIONS_PER_LEVEL,
            answered: self.questions_answered,
            remaining: QUESTIONS_PER_LEVEL.saturating_sub(self.questions_answered),
            is_complete: self.is_complete(),
        }
    }

    pub(crate) fn issue(&mut self, question: Question, issued_at: DateTime<Utc>) -> &Question {
        &self
            .current
            .insert(IssuedQuestion {
                question,
                issued_at,
            })
            .question
    }

    pub(crate) fn take_current(&mut self) -> Option<IssuedQuestion> {
        self.current.take()
    }

    /// Append a graded answer. Returns the completed result on the last question.
    pub(crate) fn record(
        &mut self,
        issued: IssuedQuestion,
        given: &str,
        is_correct: bool,
        answered_at: DateTime<Utc>,
    ) -> Option<LevelResult> {
        self.questions_answered += 1;
        if is_correct {
            self.correct_count += 1;
        }

        let elapsed_ms = answered_at
            .signed_duration_since(issued.issued_at)
            .num_milliseconds()
            .max(0);
        #[allow(clippy::cast_precision_loss)]
        let elapsed_secs = elapsed_ms as f64 / 1000.0;

        self.log.push(QuestionLogEntry {
            q_no: self.questions_answered,
            question: issued.question,
            given: given.to_string(),
            is_correct,
            elapsed_secs,
            answered_at,
        });

        if self.questions_answered >= QUESTIONS_PER_LEVEL {
            let result = LevelResult::from_counts(self.correct_count, self.questions_answered);
            self.result = Some(result);
            Some(result)
        } else {
            None
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
