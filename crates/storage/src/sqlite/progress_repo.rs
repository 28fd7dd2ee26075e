use async_trait::async_trait;
use quiz_core::model::{PlayerName, ProgressStore};
use sqlx::Row;

use super::{
    SqliteRepository,
    mapping::{grade_from_i64, level_from_i64, map_result_row, ser},
};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load_progress(&self, player: &PlayerName) -> Result<Option<ProgressStore>, StorageError> {
        let unlock_rows = sqlx::query(
            r"
                SELECT grade, ceiling
                FROM level_unlocks
                WHERE player = ?1
            ",
        )
        .bind(player.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let result_rows = sqlx::query(
            r"
                SELECT grade, level, correct_count, total, percent, passed
                FROM level_results
                WHERE player = ?1
                ORDER BY grade, level
            ",
        )
        .bind(player.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if unlock_rows.is_empty() && result_rows.is_empty() {
            return Ok(None);
        }

        let mut progress = ProgressStore::new();
        for row in &unlock_rows {
            let grade = grade_from_i64(row.try_get("grade").map_err(ser)?)?;
            let ceiling = level_from_i64(row.try_get("ceiling").map_err(ser)?)?;
            progress.raise_ceiling(grade, ceiling);
        }
        for row in &result_rows {
            let (grade, level, result) = map_result_row(row)?;
            progress.restore_result(grade, level, result);
        }
        Ok(Some(progress))
    }

    async fn save_progress(
        &self,
        player: &PlayerName,
        progress: &ProgressStore,
    ) -> Result<(), StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        for grade in progress.grades() {
            sqlx::query(
                r"
                    INSERT INTO level_unlocks (player, grade, ceiling)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT(player, grade) DO UPDATE SET
                        ceiling = MAX(level_unlocks.ceiling, excluded.ceiling)
                ",
            )
            .bind(player.as_str())
            .bind(i64::from(grade.value()))
            .bind(i64::from(progress.unlocked_ceiling(grade).value()))
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

            for (level, result) in progress.results_for(grade) {
                sqlx::query(
                    r"
                        INSERT INTO level_results (
                            player, grade, level, correct_count, total, percent, passed
                        )
                        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                        ON CONFLICT(player, grade, level) DO UPDATE SET
                            correct_count = excluded.correct_count,
                            total = excluded.total,
                            percent = excluded.percent,
                            passed = excluded.passed
                    ",
                )
                .bind(player.as_str())
                .bind(i64::from(grade.value()))
                .bind(i64::from(level.value()))
                .bind(i64::from(result.correct_count()))
                .bind(i64::from(result.total()))
                .bind(i64::from(result.percent()))
                .bind(result.passed())
                .execute(&mut *tx)
                .await
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}
