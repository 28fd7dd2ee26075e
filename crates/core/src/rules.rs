//! Fixed game rules shared by the engine, the catalog and the front end.

/// Number of questions that make up one level.
pub const QUESTIONS_PER_LEVEL: u32 = 10;

/// Number of levels available in every grade.
pub const LEVELS_PER_GRADE: u8 = 20;

/// Minimum percent (inclusive) needed to pass a level.
pub const PASS_PERCENT: u8 = 70;

/// Graded answers kept in the session-wide history.
pub const HISTORY_LIMIT: usize = 100;

/// Points awarded for each correct answer.
pub const SCORE_PER_CORRECT: u32 = 10;

pub const MIN_GRADE: u8 = 2;
pub const MAX_GRADE: u8 = 10;

/// Accepted distance between a numeric answer and the expected number.
///
/// Wide on purpose: children often round, and `10.4` for `10` counts.
pub const NUMBER_TOLERANCE: f64 = 0.5;

/// Accepted distance between a decimal answer and a fraction's decimal value.
pub const FRACTION_DECIMAL_TOLERANCE: f64 = 0.05;

/// Default per-question time limit, in seconds.
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 45;
pub const MIN_TIME_LIMIT_SECS: u32 = 10;
pub const MAX_TIME_LIMIT_SECS: u32 = 120;
