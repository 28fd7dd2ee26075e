use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs the schema migrations that have not been applied yet.
///
/// Version 1 creates unlock ceilings, level results and the leaderboard log.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS level_unlocks (
                    player TEXT NOT NULL,
                    grade INTEGER NOT NULL CHECK (grade BETWEEN 2 AND 10),
                    ceiling INTEGER NOT NULL CHECK (ceiling BETWEEN 1 AND 20),
                    PRIMARY KEY (player, grade)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS level_results (
                    player TEXT NOT NULL,
                    grade INTEGER NOT NULL CHECK (grade BETWEEN 2 AND 10),
                    level INTEGER NOT NULL CHECK (level BETWEEN 1 AND 20),
                    correct_count INTEGER NOT NULL CHECK (correct_count >= 0),
                    total INTEGER NOT NULL CHECK (total >= 0),
                    percent INTEGER NOT NULL CHECK (percent BETWEEN 0 AND 100),
                    passed INTEGER NOT NULL,
                    PRIMARY KEY (player, grade, level)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS leaderboard (
                    id INTEGER PRIMARY KEY,
                    recorded_at TEXT NOT NULL,
                    player TEXT NOT NULL,
                    grade INTEGER NOT NULL,
                    level INTEGER NOT NULL,
                    attempt_id TEXT NOT NULL,
                    q_no INTEGER NOT NULL CHECK (q_no >= 1),
                    question TEXT NOT NULL,
                    given TEXT NOT NULL,
                    correct_answer TEXT NOT NULL,
                    is_correct INTEGER NOT NULL,
                    time_taken REAL NOT NULL,
                    percent_level INTEGER
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_leaderboard_player_recorded
                    ON leaderboard (player, recorded_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
