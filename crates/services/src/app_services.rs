use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::leaderboard_service::LeaderboardService;
use crate::progress_transfer::ProgressTransferService;
use crate::quiz_loop::QuizLoopService;

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    quiz_loop: Arc<QuizLoopService>,
    leaderboard: Arc<LeaderboardService>,
    progress_transfer: Arc<ProgressTransferService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock))
    }

    /// Build services over volatile in-memory storage.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        let quiz_loop = Arc::new(QuizLoopService::new(
            clock,
            Arc::clone(&storage.progress),
            Arc::clone(&storage.leaderboard),
        ));
        let leaderboard = Arc::new(LeaderboardService::new(Arc::clone(&storage.leaderboard)));
        let progress_transfer =
            Arc::new(ProgressTransferService::new(Arc::clone(&storage.progress)));
        Self {
            quiz_loop,
            leaderboard,
            progress_transfer,
        }
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }

    #[must_use]
    pub fn leaderboard(&self) -> Arc<LeaderboardService> {
        Arc::clone(&self.leaderboard)
    }

    #[must_use]
    pub fn progress_transfer(&self) -> Arc<ProgressTransferService> {
        Arc::clone(&self.progress_transfer)
    }
}
