//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::EngineError;
use quiz_core::model::LockedLevelError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `QuizLoopService` and `LeaderboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<LockedLevelError> for QuizError {
    fn from(err: LockedLevelError) -> Self {
        Self::Engine(EngineError::Locked(err))
    }
}

/// Errors emitted by `ProgressTransferService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressTransferError {
    #[error("invalid progress file: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
