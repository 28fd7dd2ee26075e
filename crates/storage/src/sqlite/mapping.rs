use quiz_core::model::{AttemptId, Grade, Level, LevelResult};
use sqlx::Row;

use crate::repository::{LeaderboardRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn u8_from_i64(field: &'static str, v: i64) -> Result<u8, StorageError> {
    u8::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn grade_from_i64(v: i64) -> Result<Grade, StorageError> {
    Grade::new(u8_from_i64("grade", v)?).map_err(ser)
}

pub(crate) fn level_from_i64(v: i64) -> Result<Level, StorageError> {
    Level::new(u8_from_i64("level", v)?).map_err(ser)
}

pub(crate) fn map_result_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<(Grade, Level, LevelResult), StorageError> {
    let grade = grade_from_i64(row.try_get("grade").map_err(ser)?)?;
    let level = level_from_i64(row.try_get("level").map_err(ser)?)?;
    let correct = u32_from_i64("correct_count", row.try_get("correct_count").map_err(ser)?)?;
    let total = u32_from_i64("total", row.try_get("total").map_err(ser)?)?;
    let percent = u8_from_i64("percent", row.try_get("percent").map_err(ser)?)?;
    let passed: bool = row.try_get("passed").map_err(ser)?;

    let result = LevelResult::from_persisted(correct, total, percent, passed).map_err(ser)?;
    Ok((grade, level, result))
}

pub(crate) fn map_leaderboard_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<LeaderboardRow, StorageError> {
    let attempt_id: String = row.try_get("attempt_id").map_err(ser)?;
    let percent_level: Option<i64> = row.try_get("percent_level").map_err(ser)?;

    Ok(LeaderboardRow {
        recorded_at: row.try_get("recorded_at").map_err(ser)?,
        player: row.try_get("player").map_err(ser)?,
        grade: grade_from_i64(row.try_get("grade").map_err(ser)?)?,
        level: level_from_i64(row.try_get("level").map_err(ser)?)?,
        attempt_id: attempt_id.parse::<AttemptId>().map_err(ser)?,
        q_no: u32_from_i64("q_no", row.try_get("q_no").map_err(ser)?)?,
        question: row.try_get("question").map_err(ser)?,
        given: row.try_get("given").map_err(ser)?,
        correct_answer: row.try_get("correct_answer").map_err(ser)?,
        is_correct: row.try_get("is_correct").map_err(ser)?,
        time_taken_secs: row.try_get("time_taken").map_err(ser)?,
        percent_level: percent_level
            .map(|v| u8_from_i64("percent_level", v))
            .transpose()?,
    })
}
