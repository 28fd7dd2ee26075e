use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::rules::{LEVELS_PER_GRADE, MAX_GRADE, MIN_GRADE};

/// Raised when a grade or level number falls outside its playable range.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RangeError {
    #[error("grade must be between 2 and 10, got {0}")]
    Grade(u8),

    #[error("level must be between 1 and 20, got {0}")]
    Level(u8),

    #[error("failed to parse {kind} from {raw:?}")]
    Parse { kind: &'static str, raw: String },
}

/// School grade selecting the topic pool (2..=10).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Grade(u8);

impl Grade {
    pub const MIN: Self = Self(MIN_GRADE);
    pub const MAX: Self = Self(MAX_GRADE);

    /// Creates a validated `Grade`.
    ///
    /// # Errors
    ///
    /// Returns `RangeError::Grade` if `value` is outside 2..=10.
    pub fn new(value: u8) -> Result<Self, RangeError> {
        if (MIN_GRADE..=MAX_GRADE).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RangeError::Grade(value))
        }
    }

    #[must_use]
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Iterates every playable grade in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (MIN_GRADE..=MAX_GRADE).map(Self)
    }
}

impl Default for Grade {
    fn default() -> Self {
        Self(3)
    }
}

/// Level index within a grade (1..=20).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    pub const FIRST: Self = Self(1);
    pub const LAST: Self = Self(LEVELS_PER_GRADE);

    /// Creates a validated `Level`.
    ///
    /// # Errors
    ///
    /// Returns `RangeError::Level` if `value` is outside 1..=20.
    pub fn new(value: u8) -> Result<Self, RangeError> {
        if (1..=LEVELS_PER_GRADE).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RangeError::Level(value))
        }
    }

    #[must_use]
    pub fn value(&self) -> u8 {
        self.0
    }

    /// The following level, or `None` for the last level of a grade.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        if self.is_last() {
            None
        } else {
            Some(Self(self.0 + 1))
        }
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.0 >= LEVELS_PER_GRADE
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::FIRST
    }
}

/// Identifies one attempt at a level, grouping its per-question records.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttemptId(Uuid);

impl AttemptId {
    #[must_use]
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

// ─── Conversions ───────────────────────────────────────────────────────────────

impl TryFrom<u8> for Grade {
    type Error = RangeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> Self {
        grade.0
    }
}

impl TryFrom<u8> for Level {
    type Error = RangeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

// ─── Debug / Display ───────────────────────────────────────────────────────────

impl fmt::Debug for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grade({})", self.0)
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Level({})", self.0)
    }
}

impl fmt::Debug for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttemptId({})", self.0)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── FromStr ───────────────────────────────────────────────────────────────────

impl FromStr for Grade {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().parse::<u8>().map_err(|_| RangeError::Parse {
            kind: "Grade",
            raw: s.to_string(),
        })?;
        Self::new(value)
    }
}

impl FromStr for Level {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().parse::<u8>().map_err(|_| RangeError::Parse {
            kind: "Level",
            raw: s.to_string(),
        })?;
        Self::new(value)
    }
}

impl FromStr for AttemptId {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| RangeError::Parse {
                kind: "AttemptId",
                raw: s.to_string(),
            })
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
