use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rules::{DEFAULT_TIME_LIMIT_SECS, MAX_TIME_LIMIT_SECS, MIN_TIME_LIMIT_SECS};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("time limit must be between 10 and 120 seconds, got {0}")]
    InvalidTimeLimit(u32),
}

/// Player-adjustable quiz settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSettings {
    time_limit_secs: u32,
}

impl QuizSettings {
    /// Creates custom settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidTimeLimit` outside 10..=120 seconds.
    pub fn new(time_limit_secs: u32) -> Result<Self, SettingsError> {
        if !(MIN_TIME_LIMIT_SECS..=MAX_TIME_LIMIT_SECS).contains(&time_limit_secs) {
            return Err(SettingsError::InvalidTimeLimit(time_limit_secs));
        }
        Ok(Self { time_limit_secs })
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    #[must_use]
    pub fn time_limit(&self) -> Duration {
        Duration::seconds(i64::from(self.time_limit_secs))
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_time_limit_is_45_seconds() {
        assert_eq!(QuizSettings::default().time_limit_secs(), 45);
        assert_eq!(QuizSettings::default().time_limit(), Duration::seconds(45));
    }

    #[test]
    fn time_limit_range_is_validated() {
        assert!(QuizSettings::new(10).is_ok());
        assert!(QuizSettings::new(120).is_ok());
        assert_eq!(QuizSettings::new(9), Err(SettingsError::InvalidTimeLimit(9)));
        assert!(QuizSettings::new(121).is_err());
    }
}
