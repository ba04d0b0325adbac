use learn_core::model::{QuestionRecord, Quiz, QuizId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::SqliteRepository;
use super::mapping::{
    conn, id_i64, question_id_from_i64, quiz_id_from_i64, ser, u32_from_i64,
};
use crate::repository::{QuizRepository, StorageError};

fn map_quiz_row(row: &SqliteRow) -> Result<Quiz, StorageError> {
    let id = quiz_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let title: String = row.try_get("title").map_err(ser)?;
    let duration_minutes = row
        .try_get::<Option<i64>, _>("duration_minutes")
        .map_err(ser)?
        .map(|v| u32_from_i64("duration_minutes", v))
        .transpose()?;
    Ok(Quiz::new(id, title, duration_minutes))
}

fn map_question_row(row: &SqliteRow) -> Result<QuestionRecord, StorageError> {
    let options = row
        .try_get::<Option<String>, _>("options")
        .map_err(ser)?
        .map(|raw| serde_json::from_str::<Vec<String>>(&raw))
        .transpose()
        .map_err(ser)?;

    Ok(QuestionRecord {
        id: question_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        quiz_id: quiz_id_from_i64(row.try_get::<i64, _>("quiz_id").map_err(ser)?)?,
        question_text: row.try_get("question_text").map_err(ser)?,
        options,
        option_a: row.try_get("option_a").map_err(ser)?,
        option_b: row.try_get("option_b").map_err(ser)?,
        option_c: row.try_get("option_c").map_err(ser)?,
        option_d: row.try_get("option_d").map_err(ser)?,
        correct_option: row.try_get("correct_option").map_err(ser)?,
        correct_answer: row.try_get("correct_answer").map_err(ser)?,
    })
}

#[async_trait::async_trait]
impl QuizRepository for SqliteRepository {
    async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, title, duration_minutes
                FROM quizzes
                WHERE id = ?1
            ",
        )
        .bind(id_i64("quiz_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_quiz_row).transpose()
    }

    async fn list_questions(&self, quiz_id: QuizId) -> Result<Vec<QuestionRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    id, quiz_id, question_text, options,
                    option_a, option_b, option_c, option_d,
                    correct_option, correct_answer
                FROM questions
                WHERE quiz_id = ?1
                ORDER BY id ASC
            ",
        )
        .bind(id_i64("quiz_id", quiz_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_question_row).collect()
    }

    async fn upsert_quiz(&self, quiz: &Quiz) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO quizzes (id, title, duration_minutes)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    duration_minutes = excluded.duration_minutes
            ",
        )
        .bind(id_i64("quiz_id", quiz.id.value())?)
        .bind(quiz.title.as_str())
        .bind(quiz.duration_minutes.map(i64::from))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn upsert_question(&self, question: &QuestionRecord) -> Result<(), StorageError> {
        let options = question
            .options
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(ser)?;

        sqlx::query(
            r"
                INSERT INTO questions (
                    id, quiz_id, question_text, options,
                    option_a, option_b, option_c, option_d,
                    correct_option, correct_answer
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                ON CONFLICT(id) DO UPDATE SET
                    quiz_id = excluded.quiz_id,
                    question_text = excluded.question_text,
                    options = excluded.options,
                    option_a = excluded.option_a,
                    option_b = excluded.option_b,
                    option_c = excluded.option_c,
                    option_d = excluded.option_d,
                    correct_option = excluded.correct_option,
                    correct_answer = excluded.correct_answer
            ",
        )
        .bind(id_i64("question_id", question.id.value())?)
        .bind(id_i64("quiz_id", question.quiz_id.value())?)
        .bind(question.question_text.as_str())
        .bind(options)
        .bind(question.option_a.as_deref())
        .bind(question.option_b.as_deref())
        .bind(question.option_c.as_deref())
        .bind(question.option_d.as_deref())
        .bind(question.correct_option.as_deref())
        .bind(question.correct_answer.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => StorageError::NotFound,
            other => conn(other),
        })?;

        Ok(())
    }
}
