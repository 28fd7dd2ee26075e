//! Seam between the level engine and whatever produces questions.

use crate::model::{Grade, Question, QuizMode};

/// Produces fresh questions for a grade and mode.
///
/// Implementations may use randomness but must not have other side effects.
/// Every returned question must carry a well-typed expected answer; for
/// multiple-choice questions the correct option must be accepted by that answer.
pub trait QuestionProvider: Send {
    fn next_question(&mut self, grade: Grade, mode: QuizMode) -> Question;
}

impl<F> QuestionProvider for F
where
    F: FnMut(Grade, QuizMode) -> Question + Send,
{
    fn next_question(&mut self, grade: Grade, mode: QuizMode) -> Question {
        self(grade, mode)
    }
}
