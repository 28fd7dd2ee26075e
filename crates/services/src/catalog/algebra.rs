//! Upper-band topics.

use rand::Rng;
use rand::seq::IndexedRandom;

use quiz_core::model::{AnswerValue, Question};

use super::round_to;

const TRIG_TABLE: &[(u32, f64)] = &[(30, 0.5), (45, 0.707), (60, 0.866)];

pub(super) fn linear_function<R: Rng + ?Sized>(rng: &mut R) -> Question {
    let a = rng.random_range(1..=5u32);
    let b = rng.random_range(0..=10u32);
    let x = rng.random_range(1..=10u32);
    Question::math(
        "function",
        format!("If f(x) = {a}x + {b}, find f({x})"),
        AnswerValue::Number(f64::from(a * x + b)),
    )
}

/// Half of the candidates are drawn from the set, half from outside it.
pub(super) fn set_membership<R: Rng + ?Sized>(rng: &mut R) -> Question {
    let universe: Vec<u32> = (1..20).collect();
    let mut members: Vec<u32> = universe.choose_multiple(rng, 5).copied().collect();
    members.sort_unstable();

    let outsiders: Vec<u32> = universe
        .iter()
        .copied()
        .filter(|n| !members.contains(n))
        .collect();
    let from_inside = rng.random_bool(0.5);
    let pool = if from_inside { &members } else { &outsiders };
    let x = pool.choose(rng).copied().unwrap_or(members[0]);
    let answer = if members.contains(&x) { "yes" } else { "no" };

    let listed = members
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    Question::math(
        "sets",
        format!("Is {x} in the set {{{listed}}}? (yes/no)"),
        AnswerValue::text(answer),
    )
}

pub(super) fn trig_value<R: Rng + ?Sized>(rng: &mut R) -> Question {
    let (angle, value) = TRIG_TABLE.choose(rng).copied().unwrap_or((30, 0.5));
    Question::math(
        "trig",
        format!("sin({angle}°) ≈ ? (3 decimals)"),
        AnswerValue::Number(value),
    )
}

/// Slope through two points with distinct x coordinates.
pub(super) fn slope<R: Rng + ?Sized>(rng: &mut R) -> Question {
    let x1 = rng.random_range(0..=5i32);
    let y1 = rng.random_range(0..=5i32);
    let x2 = x1 + rng.random_range(1..=6i32);
    let y2 = y1 + rng.random_range(-3..=6i32);
    let m = round_to(f64::from(y2 - y1) / f64::from(x2 - x1), 3);
    Question::math(
        "slope",
        format!("Slope between ({x1},{y1}) and ({x2},{y2}) = ? (3 decimals)"),
        AnswerValue::Number(m),
    )
}

/// Sum of two random 2x2 matrices, answered as `[[a,b],[c,d]]`.
pub(super) fn matrix_sum<R: Rng + ?Sized>(rng: &mut R) -> Question {
    let mut matrix = || -> [u32; 4] { std::array::from_fn(|_| rng.random_range(0..=5u32)) };
    let (l, r) = (matrix(), matrix());
    let sum: [u32; 4] = std::array::from_fn(|i| l[i] + r[i]);
    Question::math(
        "matrix",
        format!(
            "Add matrices [[{},{}],[{},{}]] + [[{},{}],[{},{}]] = ?  (format [[a,b],[c,d]])",
            l[0], l[1], l[2], l[3], r[0], r[1], r[2], r[3]
        ),
        AnswerValue::text(format!("[[{},{}],[{},{}]]", sum[0], sum[1], sum[2], sum[3])),
    )
}
