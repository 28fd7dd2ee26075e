use thiserror::Error;

use crate::model::{
    LevelResultError, LockedLevelError, ParseModeError, PlayerNameError, RangeError,
    SettingsError,
};

/// Errors from level engine operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineError {
    #[error(transparent)]
    Locked(#[from] LockedLevelError),

    #[error("no level has been started")]
    NoActiveLevel,

    #[error("level is already complete")]
    LevelComplete,

    #[error("level is still in progress")]
    LevelInProgress,

    #[error("level was not passed; the next level stays locked")]
    NotPassed,
}

/// Umbrella error for the core crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    PlayerName(#[from] PlayerNameError),
    #[error(transparent)]
    Mode(#[from] ParseModeError),
    #[error(transparent)]
    LevelResult(#[from] LevelResultError),
}
