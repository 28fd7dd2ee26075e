use async_trait::async_trait;
use quiz_core::model::PlayerName;

use super::{SqliteRepository, mapping::map_leaderboard_row};
use crate::repository::{LeaderboardRepository, LeaderboardRow, StorageError};

#[async_trait]
impl LeaderboardRepository for SqliteRepository {
    async fn append_row(&self, row: &LeaderboardRow) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO leaderboard (
                    recorded_at, player, grade, level, attempt_id, q_no,
                    question, given, correct_answer, is_correct, time_taken, percent_level
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ",
        )
        .bind(row.recorded_at)
        .bind(&row.player)
        .bind(i64::from(row.grade.value()))
        .bind(i64::from(row.level.value()))
        .bind(row.attempt_id.to_string())
        .bind(i64::from(row.q_no))
        .bind(&row.question)
        .bind(&row.given)
        .bind(&row.correct_answer)
        .bind(row.is_correct)
        .bind(row.time_taken_secs)
        .bind(row.percent_level.map(i64::from))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.last_insert_rowid())
    }

    async fn recent_rows(
        &self,
        player: Option<&PlayerName>,
        limit: u32,
    ) -> Result<Vec<LeaderboardRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    recorded_at, player, grade, level, attempt_id, q_no,
                    question, given, correct_answer, is_correct, time_taken, percent_level
                FROM leaderboard
                WHERE ?1 IS NULL OR player = ?1
                ORDER BY id DESC
                LIMIT ?2
            ",
        )
        .bind(player.map(PlayerName::as_str))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_leaderboard_row(&row)?);
        }
        Ok(out)
    }
}
