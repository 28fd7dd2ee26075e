use std::fmt;

use crate::rules::{FRACTION_DECIMAL_TOLERANCE, NUMBER_TOLERANCE};

//
// ─── ANSWER VALUE ──────────────────────────────────────────────────────────────
//

/// The expected answer of a question.
///
/// Each variant carries its own comparison rule; see [`AnswerValue::accepts`].
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerValue {
    /// Numeric answer, accepted within [`NUMBER_TOLERANCE`].
    Number(f64),
    /// Free text, compared trimmed and case-insensitively.
    ExactText(String),
    /// A fraction that may be answered as `"a/b"` or as a decimal.
    FractionPair {
        simplified_fraction: String,
        decimal_approx: f64,
    },
}

impl AnswerValue {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::ExactText(value.into())
    }

    #[must_use]
    pub fn fraction(simplified_fraction: impl Into<String>, decimal_approx: f64) -> Self {
        Self::FractionPair {
            simplified_fraction: simplified_fraction.into(),
            decimal_approx,
        }
    }

    /// Decide whether a raw, user-typed answer matches this value.
    ///
    /// Never fails: input that cannot be read as the expected type is simply
    /// not correct.
    ///
    /// ```
    /// # use quiz_core::model::AnswerValue;
    /// assert!(AnswerValue::Number(10.0).accepts("10.4"));
    /// assert!(!AnswerValue::Number(10.0).accepts("10.6"));
    /// assert!(AnswerValue::fraction("3/4", 0.75).accepts("0.76"));
    /// assert!(AnswerValue::text("yes").accepts("YES "));
    /// ```
    #[must_use]
    pub fn accepts(&self, raw: &str) -> bool {
        match self {
            Self::Number(expected) => {
                parse_number(raw).is_some_and(|given| within(given, *expected, NUMBER_TOLERANCE))
            }
            Self::ExactText(expected) => {
                raw.trim().to_lowercase() == expected.trim().to_lowercase()
            }
            Self::FractionPair {
                simplified_fraction,
                decimal_approx,
            } => {
                // The fraction spelling is matched verbatim; only whitespace is ignored.
                raw.trim() == simplified_fraction
                    || parse_number(raw).is_some_and(|given| {
                        within(given, *decimal_approx, FRACTION_DECIMAL_TOLERANCE)
                    })
            }
        }
    }

    /// Numeric value for number-like answers.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::FractionPair { decimal_approx, .. } => Some(*decimal_approx),
            Self::ExactText(_) => None,
        }
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::ExactText(text) => f.write_str(text),
            Self::FractionPair {
                simplified_fraction,
                decimal_approx,
            } => write!(f, "{simplified_fraction} ({decimal_approx})"),
        }
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn within(given: f64, expected: f64, tolerance: f64) -> bool {
    (given - expected).abs() <= tolerance
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_tolerance_boundary() {
        let expected = AnswerValue::Number(10.0);
        assert!(expected.accepts("10"));
        assert!(expected.accepts("10.4"));
        assert!(expected.accepts("9.5"));
        assert!(expected.accepts("10.5"));
        assert!(!expected.accepts("10.6"));
        assert!(!expected.accepts("9.4"));
    }

    #[test]
    fn number_ignores_surrounding_whitespace() {
        assert!(AnswerValue::Number(42.0).accepts("  42\n"));
    }

    #[test]
    fn number_rejects_unparseable_input() {
        let expected = AnswerValue::Number(3.0);
        assert!(!expected.accepts(""));
        assert!(!expected.accepts("three"));
        assert!(!expected.accepts("3/1"));
        assert!(!expected.accepts("NaN"));
        assert!(!expected.accepts("inf"));
    }

    #[test]
    fn fraction_accepts_fraction_or_close_decimal() {
        let expected = AnswerValue::fraction("3/4", 0.75);
        assert!(expected.accepts("3/4"));
        assert!(expected.accepts(" 3/4 "));
        assert!(expected.accepts("0.75"));
        assert!(expected.accepts("0.76"));
        assert!(!expected.accepts("0.90"));
        assert!(!expected.accepts("6/8"));
        assert!(!expected.accepts(""));
    }

    #[test]
    fn text_is_trimmed_and_case_insensitive() {
        let expected = AnswerValue::text("yes");
        assert!(expected.accepts("YES "));
        assert!(expected.accepts("Yes"));
        assert!(!expected.accepts("y"));
        assert!(!expected.accepts(""));
    }

    #[test]
    fn text_compares_symbols_literally() {
        let expected = AnswerValue::text(">");
        assert!(expected.accepts(" > "));
        assert!(!expected.accepts("<"));
    }

    #[test]
    fn display_renders_expected_answer() {
        assert_eq!(AnswerValue::Number(12.0).to_string(), "12");
        assert_eq!(AnswerValue::Number(31.4).to_string(), "31.4");
        assert_eq!(AnswerValue::fraction("5/4", 1.25).to_string(), "5/4 (1.25)");
        assert_eq!(AnswerValue::text("2 1/3").to_string(), "2 1/3");
    }

    #[test]
    fn as_number_covers_numeric_variants() {
        assert_eq!(AnswerValue::Number(2.5).as_number(), Some(2.5));
        assert_eq!(AnswerValue::fraction("1/2", 0.5).as_number(), Some(0.5));
        assert_eq!(AnswerValue::text("no").as_number(), None);
    }
}
