//! JSON export and import of a player's progress.
//!
//! The file holds two maps, `level_unlocked` (grade to ceiling) and
//! `level_progress` (grade to level to result). Importing merges into what is
//! already stored: ceilings never go down and existing results are kept.

use std::sync::Arc;

use quiz_core::model::{PlayerName, ProgressStore};
use storage::repository::ProgressRepository;

use crate::error::ProgressTransferError;

/// Pretty-printed JSON for `progress`.
///
/// # Errors
///
/// Returns `ProgressTransferError::Json` if serialization fails.
pub fn to_json(progress: &ProgressStore) -> Result<String, ProgressTransferError> {
    Ok(serde_json::to_string_pretty(progress)?)
}

/// Parse and validate an exported progress file.
///
/// # Errors
///
/// Returns `ProgressTransferError::Json` for malformed JSON, out-of-range
/// grades or levels, and inconsistent level results.
pub fn from_json(raw: &str) -> Result<ProgressStore, ProgressTransferError> {
    Ok(serde_json::from_str(raw)?)
}

#[derive(Clone)]
pub struct ProgressTransferService {
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressTransferService {
    #[must_use]
    pub fn new(progress: Arc<dyn ProgressRepository>) -> Self {
        Self { progress }
    }

    /// Stored progress of `player` as JSON. A player with nothing stored
    /// exports empty maps.
    ///
    /// # Errors
    ///
    /// Returns `ProgressTransferError` if loading or serialization fails.
    pub async fn export_json(&self, player: &PlayerName) -> Result<String, ProgressTransferError> {
        let progress = self
            .progress
            .load_progress(player)
            .await?
            .unwrap_or_default();
        to_json(&progress)
    }

    /// Merge an exported file into the stored progress of `player`.
    ///
    /// Returns the merged progress, which is also saved.
    ///
    /// # Errors
    ///
    /// Returns `ProgressTransferError::Json` for an invalid file (nothing is
    /// written) and `ProgressTransferError::Storage` if loading or saving fails.
    pub async fn import_json(
        &self,
        player: &PlayerName,
        raw: &str,
    ) -> Result<ProgressStore, ProgressTransferError> {
        let imported = from_json(raw)?;
        let mut merged = self
            .progress
            .load_progress(player)
            .await?
            .unwrap_or_default();
        merged.merge_from(&imported);
        self.progress.save_progress(player, &merged).await?;
        tracing::info!(player = %player, "progress imported");
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Grade, Level, LevelResult};
    use storage::repository::InMemoryRepository;

    fn grade(g: u8) -> Grade {
        Grade::new(g).unwrap()
    }

    fn level(l: u8) -> Level {
        Level::new(l).unwrap()
    }

    #[test]
    fn json_uses_level_maps() {
        let mut progress = ProgressStore::new();
        progress.record_result(grade(3), level(1), LevelResult::from_counts(8, 10));

        let json = to_json(&progress).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["level_unlocked"]["3"], 2);
        assert_eq!(value["level_progress"]["3"]["1"]["percent"], 80);
        assert_eq!(value["level_progress"]["3"]["1"]["passed"], true);
        assert_eq!(from_json(&json).unwrap(), progress);
    }

    #[test]
    fn from_json_rejects_out_of_range_grade() {
        let raw = r#"{"level_unlocked": {"11": 2}, "level_progress": {}}"#;
        assert!(matches!(from_json(raw), Err(ProgressTransferError::Json(_))));
    }

    #[test]
    fn from_json_accepts_missing_maps() {
        assert!(from_json("{}").unwrap().is_empty());
    }

    #[tokio::test]
    async fn import_merges_without_lowering_ceilings() {
        let repo = Arc::new(InMemoryRepository::new());
        let player = PlayerName::new("Sara").unwrap();

        let mut stored = ProgressStore::new();
        stored.raise_ceiling(grade(4), level(6));
        stored.record_result(grade(4), level(5), LevelResult::from_counts(9, 10));
        repo.save_progress(&player, &stored).await.unwrap();

        let mut incoming = ProgressStore::new();
        incoming.raise_ceiling(grade(4), level(3));
        incoming.raise_ceiling(grade(7), level(2));
        incoming.record_result(grade(4), level(5), LevelResult::from_counts(7, 10));
        incoming.record_result(grade(4), level(2), LevelResult::from_counts(10, 10));

        let service = ProgressTransferService::new(repo.clone());
        let merged = service
            .import_json(&player, &to_json(&incoming).unwrap())
            .await
            .unwrap();

        assert_eq!(merged.unlocked_ceiling(grade(4)), level(6));
        assert_eq!(merged.unlocked_ceiling(grade(7)), level(2));
        assert_eq!(
            merged.result(grade(4), level(5)).map(LevelResult::correct_count),
            Some(9)
        );
        assert!(merged.result(grade(4), level(2)).is_some());
        assert_eq!(repo.load_progress(&player).await.unwrap(), Some(merged));
    }

    #[tokio::test]
    async fn invalid_import_writes_nothing() {
        let repo = Arc::new(InMemoryRepository::new());
        let player = PlayerName::new("Omar").unwrap();
        let service = ProgressTransferService::new(repo.clone());

        let err = service.import_json(&player, "not json").await.unwrap_err();
        assert!(matches!(err, ProgressTransferError::Json(_)));
        assert_eq!(repo.load_progress(&player).await.unwrap(), None);
    }

    #[tokio::test]
    async fn export_of_unknown_player_is_empty() {
        let service = ProgressTransferService::new(Arc::new(InMemoryRepository::new()));
        let json = service
            .export_json(&PlayerName::new("Nobody").unwrap())
            .await
            .unwrap();
        assert!(from_json(&json).unwrap().is_empty());
    }
}
