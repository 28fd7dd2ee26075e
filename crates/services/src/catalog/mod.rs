//! Randomised question catalog.
//!
//! Topics are drawn from a pool chosen by grade band; shape questions come
//! with four distinct multiple-choice options and a sketch description.

mod algebra;
mod arithmetic;
mod number_sense;
mod shapes;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use quiz_core::QuestionProvider;
use quiz_core::model::{Grade, Question, QuizMode};

/// Math topics the catalog knows how to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Comparison,
    Story,
    Fractions,
    MixedFractions,
    Lcm,
    Hcf,
    Percentage,
    Profit,
    Area,
    Perimeter,
    Function,
    Sets,
    Trig,
    Slope,
    Matrix,
}

impl Topic {
    /// Label recorded against missed questions.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Topic::Addition => "addition",
            Topic::Subtraction => "subtraction",
            Topic::Multiplication => "multiplication",
            Topic::Division => "division",
            Topic::Comparison => "comparison",
            Topic::Story => "story",
            Topic::Fractions => "fractions",
            Topic::MixedFractions => "fractions_mixed",
            Topic::Lcm => "lcm",
            Topic::Hcf => "hcf",
            Topic::Percentage => "percentage",
            Topic::Profit => "profit",
            Topic::Area => "area",
            Topic::Perimeter => "perimeter",
            Topic::Function => "function",
            Topic::Sets => "sets",
            Topic::Trig => "trig",
            Topic::Slope => "slope",
            Topic::Matrix => "matrix",
        }
    }

    /// Topic pool for a grade band.
    #[must_use]
    pub fn pool(grade: Grade) -> &'static [Topic] {
        match grade.value() {
            ..=4 => PRIMARY,
            5..=8 => MIDDLE,
            _ => UPPER,
        }
    }
}

const PRIMARY: &[Topic] = &[
    Topic::Addition,
    Topic::Subtraction,
    Topic::Multiplication,
    Topic::Division,
    Topic::Comparison,
    Topic::Story,
];

const MIDDLE: &[Topic] = &[
    Topic::Fractions,
    Topic::MixedFractions,
    Topic::Lcm,
    Topic::Hcf,
    Topic::Percentage,
    Topic::Profit,
    Topic::Area,
    Topic::Perimeter,
    Topic::Multiplication,
];

const UPPER: &[Topic] = &[
    Topic::Function,
    Topic::Sets,
    Topic::Trig,
    Topic::Slope,
    Topic::MixedFractions,
    Topic::Matrix,
];

/// Build one math question for `topic` at `grade`.
pub fn math_question<R: Rng + ?Sized>(rng: &mut R, topic: Topic, grade: Grade) -> Question {
    let g = u32::from(grade.value());
    match topic {
        Topic::Addition => arithmetic::addition(rng, g),
        Topic::Subtraction => arithmetic::subtraction(rng, g),
        Topic::Multiplication => arithmetic::multiplication(rng, g),
        Topic::Division => arithmetic::division(rng, g),
        Topic::Comparison => arithmetic::comparison(rng),
        Topic::Story => arithmetic::story(rng),
        Topic::Fractions => number_sense::fraction_sum(rng),
        Topic::MixedFractions => number_sense::mixed_number(rng),
        Topic::Lcm => number_sense::lcm(rng),
        Topic::Hcf => number_sense::hcf(rng),
        Topic::Percentage => number_sense::percentage(rng),
        Topic::Profit => number_sense::profit(rng),
        Topic::Area => number_sense::rectangle_area(rng),
        Topic::Perimeter => number_sense::rectangle_perimeter(rng),
        Topic::Function => algebra::linear_function(rng),
        Topic::Sets => algebra::set_membership(rng),
        Topic::Trig => algebra::trig_value(rng),
        Topic::Slope => algebra::slope(rng),
        Topic::Matrix => algebra::matrix_sum(rng),
    }
}

/// Default [`QuestionProvider`]: random topics from the grade's pool in
/// math mode, generated shapes in shape mode.
#[derive(Debug, Clone)]
pub struct CatalogProvider<R = StdRng> {
    rng: R,
}

impl CatalogProvider<StdRng> {
    /// Provider seeded from the operating system.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible provider; the same seed yields the same question sequence.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for CatalogProvider<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> CatalogProvider<R> {
    #[must_use]
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send> QuestionProvider for CatalogProvider<R> {
    fn next_question(&mut self, grade: Grade, mode: QuizMode) -> Question {
        match mode {
            QuizMode::MathQuiz => {
                let topic = Topic::pool(grade)
                    .choose(&mut self.rng)
                    .copied()
                    .unwrap_or(Topic::Addition);
                math_question(&mut self.rng, topic, grade)
            }
            QuizMode::ShapeChallenge => shapes::shape_question(&mut self.rng, grade),
        }
    }
}

/// Round to `places` decimals, half away from zero.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnswerValue, QuestionKind};

    fn canonical(answer: &AnswerValue) -> String {
        match answer {
            AnswerValue::FractionPair {
                simplified_fraction,
                ..
            } => simplified_fraction.clone(),
            other => other.to_string(),
        }
    }

    #[test]
    fn every_generated_question_accepts_its_own_answer() {
        let mut provider = CatalogProvider::seeded(7);
        for grade in Grade::all() {
            for mode in [QuizMode::MathQuiz, QuizMode::ShapeChallenge] {
                for _ in 0..50 {
                    let question = provider.next_question(grade, mode);
                    let answer = canonical(question.expected_answer());
                    assert!(
                        question.is_correct(&answer),
                        "{} rejected {answer:?}",
                        question.prompt()
                    );
                }
            }
        }
    }

    #[test]
    fn math_topics_come_from_the_grade_band() {
        let mut provider = CatalogProvider::seeded(11);
        for grade in Grade::all() {
            let labels: Vec<&str> = Topic::pool(grade).iter().map(|t| t.label()).collect();
            for _ in 0..40 {
                let question = provider.next_question(grade, QuizMode::MathQuiz);
                assert_eq!(question.kind(), QuestionKind::Math);
                assert!(labels.contains(&question.topic()), "{}", question.topic());
                assert!(question.choices().is_none());
            }
        }
    }

    #[test]
    fn same_seed_gives_same_sequence() {
        let grade = Grade::new(6).unwrap();
        let mut a = CatalogProvider::seeded(42);
        let mut b = CatalogProvider::seeded(42);
        for _ in 0..20 {
            assert_eq!(
                a.next_question(grade, QuizMode::MathQuiz),
                b.next_question(grade, QuizMode::MathQuiz)
            );
        }
    }

    #[test]
    fn grade_bands_split_at_four_and_eight() {
        let pool = |g| Topic::pool(Grade::new(g).unwrap());
        assert_eq!(pool(2), PRIMARY);
        assert_eq!(pool(4), PRIMARY);
        assert_eq!(pool(5), MIDDLE);
        assert_eq!(pool(8), MIDDLE);
        assert_eq!(pool(9), UPPER);
        assert_eq!(pool(10), UPPER);
    }

    #[test]
    fn round_to_keeps_requested_places() {
        assert!((round_to(31.400_000_000_000_002, 1) - 31.4).abs() < 1e-12);
        assert!((round_to(0.666_666, 3) - 0.667).abs() < 1e-12);
    }
}
