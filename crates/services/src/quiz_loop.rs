use std::sync::Arc;

use quiz_core::model::{PlayerName, ProgressStore, QuestionLogEntry, QuizSettings, SessionState};
use quiz_core::{EngineError, LevelEngine, QuestionOutcome, QuestionProvider};
use storage::repository::{LeaderboardRepository, LeaderboardRow, ProgressRepository};

use crate::Clock;
use crate::error::QuizError;

/// Result of answering a single question through the service.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizAnswerResult {
    /// The graded submission as it was logged.
    pub entry: QuestionLogEntry,
    pub outcome: QuestionOutcome,
    /// Id of the appended leaderboard row, `None` if the append failed.
    pub leaderboard_id: Option<i64>,
    /// `true` once the finished level's progress reached storage.
    pub progress_saved: bool,
}

impl QuizAnswerResult {
    #[must_use]
    pub fn is_level_complete(&self) -> bool {
        matches!(self.outcome, QuestionOutcome::LevelComplete(_))
    }
}

/// Drives a [`LevelEngine`] and persists what it produces.
///
/// Storage is best effort: a failed load starts from empty progress and
/// failed writes are logged, so play never stops because of the database.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
    leaderboard: Arc<dyn LeaderboardRepository>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        progress: Arc<dyn ProgressRepository>,
        leaderboard: Arc<dyn LeaderboardRepository>,
    ) -> Self {
        Self {
            clock,
            progress,
            leaderboard,
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Session state for `player`, seeded with their stored progress.
    pub async fn load_state(&self, player: PlayerName) -> SessionState {
        let progress = match self.progress.load_progress(&player).await {
            Ok(Some(progress)) => progress,
            Ok(None) => ProgressStore::new(),
            Err(err) => {
                tracing::warn!(player = %player, error = %err, "failed to load progress, starting fresh");
                ProgressStore::new()
            }
        };
        SessionState::new(player, progress)
    }

    /// Build an engine for `player` on this service's clock.
    pub async fn open_engine(
        &self,
        player: PlayerName,
        settings: QuizSettings,
        provider: impl QuestionProvider + 'static,
    ) -> LevelEngine {
        let state = self.load_state(player).await.with_settings(settings);
        LevelEngine::new(state, provider).with_clock(self.clock)
    }

    /// Grade `raw`, append it to the leaderboard and save progress when the
    /// level finishes.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Engine` if there is nothing to answer. Storage
    /// failures are logged and reported through the result flags instead.
    pub async fn submit(
        &self,
        engine: &mut LevelEngine,
        raw: &str,
    ) -> Result<QuizAnswerResult, QuizError> {
        let outcome = engine.submit(raw)?;
        let writes = PendingWrites::capture(engine, &outcome)?;
        self.persist(writes, outcome).await
    }

    /// Submit an empty answer for a question whose timer ran out.
    ///
    /// # Errors
    ///
    /// Same as [`QuizLoopService::submit`].
    pub async fn submit_timeout(
        &self,
        engine: &mut LevelEngine,
    ) -> Result<QuizAnswerResult, QuizError> {
        let outcome = engine.submit_timeout()?;
        let writes = PendingWrites::capture(engine, &outcome)?;
        self.persist(writes, outcome).await
    }

    /// Save the session's progress right now.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if the write fails.
    pub async fn save_progress(&self, state: &SessionState) -> Result<(), QuizError> {
        self.progress
            .save_progress(state.player(), state.progress())
            .await?;
        Ok(())
    }

    async fn persist(
        &self,
        writes: PendingWrites,
        outcome: QuestionOutcome,
    ) -> Result<QuizAnswerResult, QuizError> {
        let PendingWrites {
            player,
            entry,
            row,
            finished,
        } = writes;

        let leaderboard_id = match self.leaderboard.append_row(&row).await {
            Ok(id) => Some(id),
            Err(err) => {
                tracing::warn!(error = %err, q_no = row.q_no, "failed to append leaderboard row");
                None
            }
        };

        let progress_saved = match finished {
            Some(progress) => match self.progress.save_progress(&player, &progress).await {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(player = %player, error = %err, "failed to save progress");
                    false
                }
            },
            None => false,
        };

        Ok(QuizAnswerResult {
            entry,
            outcome,
            leaderboard_id,
            progress_saved,
        })
    }
}

/// Owned copies of what a submission has to write, taken before any await.
struct PendingWrites {
    player: PlayerName,
    entry: QuestionLogEntry,
    row: LeaderboardRow,
    finished: Option<ProgressStore>,
}

impl PendingWrites {
    fn capture(engine: &LevelEngine, outcome: &QuestionOutcome) -> Result<Self, EngineError> {
        let session = engine.level_session().ok_or(EngineError::NoActiveLevel)?;
        let entry = session
            .last_entry()
            .cloned()
            .ok_or(EngineError::NoActiveLevel)?;
        let player = engine.state().player().clone();
        let row = LeaderboardRow::from_entry(&player, session, &entry);
        let finished = matches!(outcome, QuestionOutcome::LevelComplete(_))
            .then(|| engine.state().progress().clone());
        Ok(Self {
            player,
            entry,
            row,
            finished,
        })
    }
}
