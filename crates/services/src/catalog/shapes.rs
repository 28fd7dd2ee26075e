//! Shape challenge: measure a drawn shape and pick from four options.

use rand::Rng;
use rand::seq::SliceRandom;

use quiz_core::model::{AnswerValue, Grade, Question, ShapeKind, ShapeSketch};
use quiz_core::rules::NUMBER_TOLERANCE;

use super::round_to;

const CHOICE_COUNT: usize = 4;
const PX_PER_UNIT: u32 = 10;
const PI_APPROX: f64 = 3.14;

pub(super) fn shape_question<R: Rng + ?Sized>(rng: &mut R, grade: Grade) -> Question {
    let g = u32::from(grade.value());
    let (kind, prompt, answer, (w, h)) = match rng.random_range(0..4u8) {
        0 => {
            let side = rng.random_range(3 + g..=6 + g);
            (
                ShapeKind::Square,
                format!("A square has side {side} units. What is its area?"),
                f64::from(side * side),
                (side, side),
            )
        }
        1 => {
            let l = rng.random_range(4 + g..=8 + g);
            let w = rng.random_range(2 + g..=5 + g);
            (
                ShapeKind::Rectangle,
                format!("A rectangle is {l} by {w} units. What is its perimeter?"),
                f64::from(2 * (l + w)),
                (l, w),
            )
        }
        2 => {
            let r = rng.random_range(3 + g..=6 + g);
            (
                ShapeKind::Circle,
                format!("A circle has radius {r} units. Circumference? (use 3.14, 1 decimal)"),
                round_to(2.0 * PI_APPROX * f64::from(r), 1),
                (2 * r, 2 * r),
            )
        }
        _ => {
            let base = rng.random_range(4 + g..=8 + g);
            let height = rng.random_range(3 + g..=7 + g);
            (
                ShapeKind::Triangle,
                format!("A triangle has base {base} and height {height}. Area? (1 decimal)"),
                round_to(0.5 * f64::from(base * height), 1),
                (base, height),
            )
        }
    };

    let sketch = ShapeSketch {
        shape: kind,
        width_px: w * PX_PER_UNIT,
        height_px: h * PX_PER_UNIT,
    };
    let choices = numeric_choices(rng, answer);
    Question::shape(
        shape_topic(kind),
        prompt,
        AnswerValue::Number(answer),
        sketch,
    )
    .with_choices(choices)
}

fn shape_topic(kind: ShapeKind) -> &'static str {
    match kind {
        ShapeKind::Square => "square_area",
        ShapeKind::Rectangle => "rectangle_perimeter",
        ShapeKind::Circle => "circle_circumference",
        ShapeKind::Triangle => "triangle_area",
    }
}

/// The answer plus three distractors, shuffled. No two options fall within
/// grading tolerance of each other.
fn numeric_choices<R: Rng + ?Sized>(rng: &mut R, answer: f64) -> Vec<AnswerValue> {
    let spread = ((answer.abs() * 0.15) as u32).max(1) + 3;
    let mut options = vec![answer];
    while options.len() < CHOICE_COUNT {
        let offset = f64::from(rng.random_range(1..=spread));
        let candidate = if rng.random_bool(0.5) {
            answer + offset
        } else {
            answer - offset
        };
        let candidate = round_to(candidate, 1);
        if options.iter().all(|o| (o - candidate).abs() > NUMBER_TOLERANCE) {
            options.push(candidate);
        }
    }
    options.shuffle(rng);
    options.into_iter().map(AnswerValue::Number).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn exactly_one_choice_is_accepted() {
        let mut rng = StdRng::seed_from_u64(12);
        for grade in Grade::all() {
            for _ in 0..50 {
                let q = shape_question(&mut rng, grade);
                let choices = q.choices().expect("shape questions carry choices");
                assert_eq!(choices.len(), CHOICE_COUNT);
                let accepted = choices
                    .iter()
                    .filter(|c| q.is_correct(&c.to_string()))
                    .count();
                assert_eq!(accepted, 1, "{}", q.prompt());
            }
        }
    }

    #[test]
    fn sketch_scales_with_dimensions() {
        let mut rng = StdRng::seed_from_u64(13);
        let grade = Grade::new(2).unwrap();
        for _ in 0..50 {
            let q = shape_question(&mut rng, grade);
            let sketch = q.sketch().expect("sketch");
            assert_eq!(sketch.width_px % PX_PER_UNIT, 0);
            if sketch.shape == ShapeKind::Square || sketch.shape == ShapeKind::Circle {
                assert_eq!(sketch.width_px, sketch.height_px);
            }
        }
    }

    #[test]
    fn distractors_are_distinct_for_small_answers() {
        let mut rng = StdRng::seed_from_u64(14);
        let options = numeric_choices(&mut rng, 1.0);
        assert_eq!(options.len(), CHOICE_COUNT);
        for (i, a) in options.iter().enumerate() {
            for b in &options[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
