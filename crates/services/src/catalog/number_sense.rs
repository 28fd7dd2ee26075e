//! Middle-band topics: fractions, factors, percentages and rectangles.

use rand::Rng;
use rand::seq::IndexedRandom;

use quiz_core::model::{AnswerValue, Question};

use super::round_to;

const PERCENT_STEPS: &[u32] = &[5, 10, 15, 20, 25];
const PROFIT_STEPS: &[u32] = &[5, 10, 15, 20, 25, 30];

pub(crate) fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn lcm_of(a: u32, b: u32) -> u32 {
    a / gcd(a, b) * b
}

/// Sum of two like fractions, answered in simplest form or as a decimal.
pub(super) fn fraction_sum<R: Rng + ?Sized>(rng: &mut R) -> Question {
    let den = rng.random_range(2..=8u32);
    let a = rng.random_range(1..den);
    let b = rng.random_range(1..den);
    let num = a + b;
    let g = gcd(num, den);
    let (n, d) = (num / g, den / g);
    let simplified = if d == 1 {
        n.to_string()
    } else {
        format!("{n}/{d}")
    };
    Question::math(
        "fractions",
        format!("{a}/{den} + {b}/{den} = ?  (simplest form)"),
        AnswerValue::fraction(simplified, round_to(f64::from(num) / f64::from(den), 3)),
    )
}

/// Improper fraction to mixed number, e.g. `"2 1/3"`.
pub(super) fn mixed_number<R: Rng + ?Sized>(rng: &mut R) -> Question {
    let num = rng.random_range(5..=20u32);
    let den = rng.random_range(2..=8u32);
    let (whole, rem) = (num / den, num % den);
    let answer = match (whole, rem) {
        (w, 0) => w.to_string(),
        (0, r) => format!("{r}/{den}"),
        (w, r) => format!("{w} {r}/{den}"),
    };
    Question::math(
        "fractions_mixed",
        format!("Write {num}/{den} as a mixed number (e.g. 2 1/3)"),
        AnswerValue::text(answer),
    )
}

pub(super) fn lcm<R: Rng + ?Sized>(rng: &mut R) -> Question {
    let a = rng.random_range(2..=20u32);
    let b = rng.random_range(2..=20u32);
    Question::math(
        "lcm",
        format!("LCM of {a} and {b} = ?"),
        AnswerValue::Number(f64::from(lcm_of(a, b))),
    )
}

pub(super) fn hcf<R: Rng + ?Sized>(rng: &mut R) -> Question {
    let a = rng.random_range(2..=50u32);
    let b = rng.random_range(2..=50u32);
    Question::math(
        "hcf",
        format!("HCF of {a} and {b} = ?"),
        AnswerValue::Number(f64::from(gcd(a, b))),
    )
}

pub(super) fn percentage<R: Rng + ?Sized>(rng: &mut R) -> Question {
    let base = rng.random_range(10..=200u32);
    let pct = PERCENT_STEPS.choose(rng).copied().unwrap_or(10);
    Question::math(
        "percentage",
        format!("{pct}% of {base} = ?"),
        AnswerValue::Number(round_to(f64::from(base * pct) / 100.0, 2)),
    )
}

pub(super) fn profit<R: Rng + ?Sized>(rng: &mut R) -> Question {
    let cost = rng.random_range(50..=500u32);
    let pct = PROFIT_STEPS.choose(rng).copied().unwrap_or(10);
    let selling = round_to(f64::from(cost) * (1.0 + f64::from(pct) / 100.0), 2);
    Question::math(
        "profit",
        format!("Cost price {cost}, profit {pct}%. Selling price = ?"),
        AnswerValue::Number(selling),
    )
}

pub(super) fn rectangle_area<R: Rng + ?Sized>(rng: &mut R) -> Question {
    let l = rng.random_range(2..=20u32);
    let w = rng.random_range(1..=15u32);
    Question::math(
        "area",
        format!("Area of a rectangle with l={l}, w={w} = ?"),
        AnswerValue::Number(f64::from(l * w)),
    )
}

pub(super) fn rectangle_perimeter<R: Rng + ?Sized>(rng: &mut R) -> Question {
    let l = rng.random_range(2..=20u32);
    let w = rng.random_range(2..=20u32);
    Question::math(
        "perimeter",
        format!("Perimeter of a rectangle with l={l}, w={w} = ?"),
        AnswerValue::Number(f64::from(2 * (l + w))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn gcd_and_lcm() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(7, 13), 1);
        assert_eq!(lcm_of(4, 6), 12);
        assert_eq!(lcm_of(20, 20), 20);
    }

    #[test]
    fn fraction_sum_is_in_lowest_terms() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let q = fraction_sum(&mut rng);
            let AnswerValue::FractionPair {
                simplified_fraction,
                decimal_approx,
            } = q.expected_answer()
            else {
                panic!("fraction expected");
            };
            if let Some((n, d)) = simplified_fraction.split_once('/') {
                let (n, d): (u32, u32) = (n.parse().unwrap(), d.parse().unwrap());
                assert_eq!(gcd(n, d), 1);
                assert!((f64::from(n) / f64::from(d) - decimal_approx).abs() < 0.001);
            }
            assert!(q.is_correct(&decimal_approx.to_string()));
        }
    }

    #[test]
    fn mixed_number_formats() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut seen_mixed = false;
        for _ in 0..200 {
            let q = mixed_number(&mut rng);
            let AnswerValue::ExactText(answer) = q.expected_answer() else {
                panic!("text expected");
            };
            assert!(!answer.starts_with("0 "));
            seen_mixed |= answer.contains(' ');
        }
        assert!(seen_mixed);
    }
}
