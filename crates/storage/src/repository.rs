use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{
    AttemptId, Grade, Level, LevelSession, PlayerName, ProgressStore, QuestionLogEntry,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── LEADERBOARD ROW ───────────────────────────────────────────────────────────
//

/// Persisted shape of one graded question, appended to the leaderboard log.
///
/// `percent_level` is only set on the row of the question that finished the level.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardRow {
    pub recorded_at: DateTime<Utc>,
    pub player: String,
    pub grade: Grade,
    pub level: Level,
    pub attempt_id: AttemptId,
    pub q_no: u32,
    pub question: String,
    pub given: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub time_taken_secs: f64,
    pub percent_level: Option<u8>,
}

impl LeaderboardRow {
    #[must_use]
    pub fn from_entry(player: &PlayerName, session: &LevelSession, entry: &QuestionLogEntry) -> Self {
        let percent_level = session
            .result()
            .filter(|_| entry.q_no == session.questions_answered())
            .map(quiz_core::model::LevelResult::percent);
        Self {
            recorded_at: entry.answered_at,
            player: player.as_str().to_owned(),
            grade: session.grade(),
            level: session.level(),
            attempt_id: session.attempt_id(),
            q_no: entry.q_no,
            question: entry.question.prompt().to_owned(),
            given: entry.given.clone(),
            correct_answer: entry.question.expected_answer().to_string(),
            is_correct: entry.is_correct,
            time_taken_secs: entry.elapsed_secs,
            percent_level,
        }
    }
}

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

/// Repository contract for per-player level progress.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Load the saved progress of a player.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read. A player with no
    /// saved progress yields `Ok(None)`.
    async fn load_progress(&self, player: &PlayerName) -> Result<Option<ProgressStore>, StorageError>;

    /// Persist the full progress snapshot of a player.
    ///
    /// Stored results are replaced; stored unlock ceilings are never lowered.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save_progress(
        &self,
        player: &PlayerName,
        progress: &ProgressStore,
    ) -> Result<(), StorageError>;
}

/// Append-only log of graded questions.
#[async_trait]
pub trait LeaderboardRepository: Send + Sync {
    /// Append a row and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn append_row(&self, row: &LeaderboardRow) -> Result<i64, StorageError>;

    /// Most recent rows first, optionally for a single player.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if rows cannot be read.
    async fn recent_rows(
        &self,
        player: Option<&PlayerName>,
        limit: u32,
    ) -> Result<Vec<LeaderboardRow>, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    progress: Arc<Mutex<HashMap<String, ProgressStore>>>,
    leaderboard: Arc<Mutex<Vec<LeaderboardRow>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_progress(&self, player: &PlayerName) -> Result<Option<ProgressStore>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(player.as_str()).cloned())
    }

    async fn save_progress(
        &self,
        player: &PlayerName,
        progress: &ProgressStore,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .entry(player.as_str().to_owned())
            .or_default()
            .overlay(progress);
        Ok(())
    }
}

#[async_trait]
impl LeaderboardRepository for InMemoryRepository {
    async fn append_row(&self, row: &LeaderboardRow) -> Result<i64, StorageError> {
        let mut guard = self
            .leaderboard
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.push(row.clone());
        i64::try_from(guard.len()).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    async fn recent_rows(
        &self,
        player: Option<&PlayerName>,
        limit: u32,
    ) -> Result<Vec<LeaderboardRow>, StorageError> {
        let guard = self
            .leaderboard
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(guard
            .iter()
            .rev()
            .filter(|row| player.is_none_or(|p| row.player == p.as_str()))
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub leaderboard: Arc<dyn LeaderboardRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let leaderboard: Arc<dyn LeaderboardRepository> = Arc::new(repo);
        Self {
            progress,
            leaderboard,
        }
    }
}
