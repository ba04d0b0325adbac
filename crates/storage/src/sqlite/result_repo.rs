use learn_core::model::{QuizResult, Score, UserId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::SqliteRepository;
use super::mapping::{conn, id_i64, quiz_id_from_i64, ser, u32_from_i64, user_id_from_str};
use crate::repository::{QuizResultRow, ResultRepository, StorageError};

fn map_result_row(row: &SqliteRow) -> Result<QuizResultRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    let user_id = user_id_from_str(&row.try_get::<String, _>("user_id").map_err(ser)?)?;
    let quiz_id = quiz_id_from_i64(row.try_get::<i64, _>("quiz_id").map_err(ser)?)?;
    let score = Score::try_from(row.try_get::<i64, _>("score").map_err(ser)?).map_err(ser)?;
    let time_taken_seconds = row
        .try_get::<Option<i64>, _>("time_taken")
        .map_err(ser)?
        .map(|v| u32_from_i64("time_taken", v))
        .transpose()?;
    let completed_at = row.try_get("completed_at").map_err(ser)?;

    Ok(QuizResultRow::new(
        id,
        QuizResult {
            user_id,
            quiz_id,
            score,
            time_taken_seconds,
            completed_at,
        },
    ))
}

#[async_trait::async_trait]
impl ResultRepository for SqliteRepository {
    async fn insert_result(&self, result: &QuizResult) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO user_quiz_results (user_id, quiz_id, score, time_taken, completed_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(result.user_id.to_string())
        .bind(id_i64("quiz_id", result.quiz_id.value())?)
        .bind(i64::from(result.score))
        .bind(result.time_taken_seconds.map(i64::from))
        .bind(result.completed_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.last_insert_rowid())
    }

    async fn list_results(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<QuizResultRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, user_id, quiz_id, score, time_taken, completed_at
                FROM user_quiz_results
                WHERE user_id = ?1
                ORDER BY completed_at DESC, id DESC
                LIMIT ?2
            ",
        )
        .bind(user_id.to_string())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_result_row).collect()
    }
}
