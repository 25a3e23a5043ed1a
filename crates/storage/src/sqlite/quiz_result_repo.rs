use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use tracker_core::model::{LessonId, QuizResult};

use super::SqliteRepository;
use super::mapping::{conn, lesson_from_text, ser, u8_from_i64};
use crate::repository::{QuizResultRepository, StorageError};

fn map_result_row(row: &sqlx::sqlite::SqliteRow) -> Result<QuizResult, StorageError> {
    let score: f64 = row.try_get("score").map_err(ser)?;
    let out_of: f64 = row.try_get("out_of").map_err(ser)?;
    let taken_at: DateTime<Utc> = row.try_get("taken_at").map_err(ser)?;
    QuizResult::from_persisted(score, out_of, taken_at).map_err(ser)
}

#[async_trait]
impl QuizResultRepository for SqliteRepository {
    async fn append_result(
        &self,
        lesson: &LessonId,
        result: &QuizResult,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO quiz_results (lesson_id, score, out_of, taken_at)
                VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(lesson.as_str())
        .bind(result.score())
        .bind(result.out_of())
        .bind(result.date())
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn list_results(&self, lesson: &LessonId) -> Result<Vec<QuizResult>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT score, out_of, taken_at
                FROM quiz_results
                WHERE lesson_id = ?1
                ORDER BY id ASC
            ",
        )
        .bind(lesson.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_result_row).collect()
    }

    async fn list_lessons(&self) -> Result<Vec<LessonId>, StorageError> {
        let ids: Vec<String> = sqlx::query_scalar(
            r"
                SELECT DISTINCT lesson_id FROM quiz_results
                ORDER BY lesson_id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        ids.into_iter().map(lesson_from_text).collect()
    }

    async fn get_mastery(&self, lesson: &LessonId) -> Result<Option<u8>, StorageError> {
        let raw: Option<i64> =
            sqlx::query_scalar("SELECT mastery FROM lesson_mastery WHERE lesson_id = ?1")
                .bind(lesson.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(conn)?;
        raw.map(|v| u8_from_i64("mastery", v)).transpose()
    }

    async fn save_mastery(&self, lesson: &LessonId, mastery: u8) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO lesson_mastery (lesson_id, mastery)
                VALUES (?1, ?2)
                ON CONFLICT(lesson_id) DO UPDATE SET mastery = excluded.mastery
            ",
        )
        .bind(lesson.as_str())
        .bind(i64::from(mastery))
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }
}
