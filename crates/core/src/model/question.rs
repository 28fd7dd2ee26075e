use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::AnswerValue;

//
// ─── MODE & KIND ───────────────────────────────────────────────────────────────
//

/// Which family of questions the player asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizMode {
    #[default]
    MathQuiz,
    ShapeChallenge,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown quiz mode: {0}")]
pub struct ParseModeError(String);

impl FromStr for QuizMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "math" | "math_quiz" | "math-quiz" => Ok(Self::MathQuiz),
            "shape" | "shapes" | "shape_challenge" | "shape-challenge" => Ok(Self::ShapeChallenge),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MathQuiz => f.write_str("Math Quiz"),
            Self::ShapeChallenge => f.write_str("Shape Challenge"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Math,
    Shape,
}

//
// ─── SHAPE SKETCH ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Square,
    Rectangle,
    Circle,
    Triangle,
}

/// Pixel dimensions a renderer can use to draw the shape of a question.
///
/// The engine never reads this; it only travels with the question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeSketch {
    pub shape: ShapeKind,
    pub width_px: u32,
    pub height_px: u32,
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single generated question. Immutable once issued.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    kind: QuestionKind,
    topic: String,
    prompt: String,
    expected_answer: AnswerValue,
    choices: Vec<AnswerValue>,
    sketch: Option<ShapeSketch>,
}

impl Question {
    #[must_use]
    pub fn math(
        topic: impl Into<String>,
        prompt: impl Into<String>,
        expected_answer: AnswerValue,
    ) -> Self {
        Self {
            kind: QuestionKind::Math,
            topic: topic.into(),
            prompt: prompt.into(),
            expected_answer,
            choices: Vec::new(),
            sketch: None,
        }
    }

    #[must_use]
    pub fn shape(
        topic: impl Into<String>,
        prompt: impl Into<String>,
        expected_answer: AnswerValue,
        sketch: ShapeSketch,
    ) -> Self {
        Self {
            kind: QuestionKind::Shape,
            topic: topic.into(),
            prompt: prompt.into(),
            expected_answer,
            choices: Vec::new(),
            sketch: Some(sketch),
        }
    }

    /// Attach multiple-choice options, in display order.
    #[must_use]
    pub fn with_choices(mut self, choices: Vec<AnswerValue>) -> Self {
        self.choices = choices;
        self
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn expected_answer(&self) -> &AnswerValue {
        &self.expected_answer
    }

    /// Multiple-choice options, if this question offers any.
    #[must_use]
    pub fn choices(&self) -> Option<&[AnswerValue]> {
        if self.choices.is_empty() {
            None
        } else {
            Some(&self.choices)
        }
    }

    #[must_use]
    pub fn sketch(&self) -> Option<&ShapeSketch> {
        self.sketch.as_ref()
    }

    /// Grade a raw answer against this question's expected answer.
    #[must_use]
    pub fn is_correct(&self, raw: &str) -> bool {
        self.expected_answer.accepts(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_common_spellings() {
        assert_eq!("math".parse::<QuizMode>().unwrap(), QuizMode::MathQuiz);
        assert_eq!("Shape".parse::<QuizMode>().unwrap(), QuizMode::ShapeChallenge);
        assert!("trivia".parse::<QuizMode>().is_err());
    }

    #[test]
    fn choices_are_none_when_empty() {
        let q = Question::math("addition", "1 + 1 = ?", AnswerValue::Number(2.0));
        assert!(q.choices().is_none());
        assert_eq!(q.kind(), QuestionKind::Math);

        let sketch = ShapeSketch {
            shape: ShapeKind::Square,
            width_px: 60,
            height_px: 60,
        };
        let q = Question::shape("square_area", "area?", AnswerValue::Number(100.0), sketch)
            .with_choices(vec![AnswerValue::Number(100.0), AnswerValue::Number(90.0)]);
        assert_eq!(q.choices().map(<[_]>::len), Some(2));
        assert_eq!(q.sketch().map(|s| s.shape), Some(ShapeKind::Square));
    }

    #[test]
    fn correct_choice_is_accepted_by_its_label() {
        let q = Question::math("circle", "circumference?", AnswerValue::Number(31.4))
            .with_choices(vec![AnswerValue::Number(28.4), AnswerValue::Number(31.4)]);
        let labels: Vec<String> = q
            .choices()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert!(q.is_correct(&labels[1]));
        assert!(!q.is_correct(&labels[0]));
    }
}
