use std::sync::Arc;

use quiz_core::model::PlayerName;
use storage::repository::{LeaderboardRepository, LeaderboardRow};

use crate::error::QuizError;

/// Default number of rows shown by a leaderboard listing.
pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 50;

/// Read side of the per-question leaderboard log.
#[derive(Clone)]
pub struct LeaderboardService {
    leaderboard: Arc<dyn LeaderboardRepository>,
}

impl LeaderboardService {
    #[must_use]
    pub fn new(leaderboard: Arc<dyn LeaderboardRepository>) -> Self {
        Self { leaderboard }
    }

    /// Most recent rows, newest first, optionally for one player.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if rows cannot be read.
    pub async fn recent(
        &self,
        player: Option<&PlayerName>,
        limit: u32,
    ) -> Result<Vec<LeaderboardRow>, QuizError> {
        Ok(self.leaderboard.recent_rows(player, limit).await?)
    }

    /// Rows that closed a level, i.e. the ones carrying a level percentage.
    ///
    /// `limit` counts completed levels, not raw rows.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if rows cannot be read.
    pub async fn completed_levels(
        &self,
        player: Option<&PlayerName>,
        limit: u32,
    ) -> Result<Vec<LeaderboardRow>, QuizError> {
        let rows = self.leaderboard.recent_rows(player, u32::MAX).await?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .filter(|row| row.percent_level.is_some())
            .take(limit)
            .collect())
    }
}
