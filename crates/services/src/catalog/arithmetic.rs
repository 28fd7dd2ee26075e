//! Primary-band topics: the four operations, comparison and a word problem.

use rand::Rng;

use quiz_core::model::{AnswerValue, Question};

pub(super) fn addition<R: Rng + ?Sized>(rng: &mut R, grade: u32) -> Question {
    let a = rng.random_range(1..=10 * grade);
    let b = rng.random_range(1..=10 * grade);
    Question::math(
        "addition",
        format!("{a} + {b} = ?"),
        AnswerValue::Number(f64::from(a + b)),
    )
}

pub(super) fn subtraction<R: Rng + ?Sized>(rng: &mut R, grade: u32) -> Question {
    let a = rng.random_range(1..=10 * grade);
    let b = rng.random_range(1..=a);
    Question::math(
        "subtraction",
        format!("{a} - {b} = ?"),
        AnswerValue::Number(f64::from(a - b)),
    )
}

pub(super) fn multiplication<R: Rng + ?Sized>(rng: &mut R, grade: u32) -> Question {
    let a = rng.random_range(1..=(grade + 2).max(3));
    let b = rng.random_range(1..=12);
    Question::math(
        "multiplication",
        format!("{a} × {b} = ?"),
        AnswerValue::Number(f64::from(a * b)),
    )
}

/// Always divides evenly.
pub(super) fn division<R: Rng + ?Sized>(rng: &mut R, grade: u32) -> Question {
    let divisor = rng.random_range(1..=(grade + 6).min(12));
    let quotient = rng.random_range(1..=12);
    let dividend = divisor * quotient;
    Question::math(
        "division",
        format!("{dividend} ÷ {divisor} = ?"),
        AnswerValue::Number(f64::from(quotient)),
    )
}

pub(super) fn comparison<R: Rng + ?Sized>(rng: &mut R) -> Question {
    let a: u32 = rng.random_range(0..=20);
    let b: u32 = rng.random_range(0..=20);
    let sign = match a.cmp(&b) {
        std::cmp::Ordering::Greater => ">",
        std::cmp::Ordering::Less => "<",
        std::cmp::Ordering::Equal => "=",
    };
    Question::math(
        "comparison",
        format!("Fill the sign: {a} ? {b}  (use >, < or =)"),
        AnswerValue::text(sign),
    )
}

pub(super) fn story<R: Rng + ?Sized>(rng: &mut R) -> Question {
    let had = rng.random_range(5..=30u32);
    let gave = rng.random_range(1..=10u32);
    Question::math(
        "story",
        format!("Ali had {had} apples. He gave {gave} apples to Ahmed. How many apples are left?"),
        AnswerValue::Number(f64::from(had) - f64::from(gave)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn division_is_exact_and_divisor_capped() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let q = division(&mut rng, 10);
            let (dividend, divisor) = q
                .prompt()
                .trim_end_matches(" = ?")
                .split_once(" ÷ ")
                .map(|(a, b)| (a.parse::<u32>().unwrap(), b.parse::<u32>().unwrap()))
                .unwrap();
            assert!(divisor <= 12);
            assert_eq!(dividend % divisor, 0);
            assert_eq!(q.expected_answer().as_number(), Some(f64::from(dividend / divisor)));
        }
    }

    #[test]
    fn subtraction_never_goes_negative() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let q = subtraction(&mut rng, 2);
            assert!(q.expected_answer().as_number().unwrap() >= 0.0);
        }
    }

    #[test]
    fn comparison_answer_matches_operands() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..100 {
            let q = comparison(&mut rng);
            let operands = q
                .prompt()
                .trim_start_matches("Fill the sign: ")
                .split("  ")
                .next()
                .unwrap()
                .to_owned();
            let (a, b) = operands.split_once(" ? ").unwrap();
            let (a, b): (u32, u32) = (a.parse().unwrap(), b.parse().unwrap());
            let expected = if a > b { ">" } else if a < b { "<" } else { "=" };
            assert!(q.is_correct(expected));
        }
    }
}
