use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs the schema migrations that have not been applied yet.
///
/// Version 1 creates the streak, quiz result, mastery, study hours, and quiz
/// schedule tables.
#[allow(clippy::too_many_lines)]
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
                CREATE TABLE IF NOT EXISTS streak_state (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    streak INTEGER NOT NULL CHECK (streak >= 0),
                    highest_streak INTEGER NOT NULL CHECK (highest_streak >= 0),
                    last_study_date TEXT,
                    last_rollover TEXT
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS quiz_results (
                    id INTEGER PRIMARY KEY,
                    lesson_id TEXT NOT NULL,
                    score REAL NOT NULL CHECK (score >= 0),
                    out_of REAL NOT NULL,
                    taken_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS lesson_mastery (
                    lesson_id TEXT PRIMARY KEY,
                    mastery INTEGER NOT NULL CHECK (mastery BETWEEN 0 AND 100)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS study_hours (
                    hours_date TEXT NOT NULL,
                    subject TEXT NOT NULL,
                    hours INTEGER NOT NULL CHECK (hours >= 0),
                    PRIMARY KEY (hours_date, subject)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS quiz_schedule (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    start_week INTEGER NOT NULL CHECK (start_week >= 1),
                    end_week INTEGER NOT NULL CHECK (end_week >= start_week)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS quiz_schedule_slots (
                    week INTEGER NOT NULL CHECK (week >= 1),
                    weekday INTEGER NOT NULL CHECK (weekday BETWEEN 0 AND 6),
                    subject TEXT NOT NULL,
                    PRIMARY KEY (week, weekday)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_quiz_results_lesson
                    ON quiz_results (lesson_id, id);
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
