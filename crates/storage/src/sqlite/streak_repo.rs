use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::Row;
use tracker_core::streak::StreakState;

use super::SqliteRepository;
use super::mapping::{conn, day_from_text, day_to_text, ser, u32_from_i64};
use crate::repository::{StorageError, StreakRepository};

#[async_trait]
impl StreakRepository for SqliteRepository {
    async fn get_streak(&self) -> Result<StreakState, StorageError> {
        let row = sqlx::query(
            r"
            SELECT streak, highest_streak, last_study_date
            FROM streak_state
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(StreakState::default());
        };

        let streak = u32_from_i64("streak", row.try_get::<i64, _>("streak").map_err(ser)?)?;
        let highest = u32_from_i64(
            "highest_streak",
            row.try_get::<i64, _>("highest_streak").map_err(ser)?,
        )?;
        let last_study_date =
            day_from_text(row.try_get::<Option<String>, _>("last_study_date").map_err(ser)?)?;

        Ok(StreakState::from_persisted(streak, highest, last_study_date))
    }

    async fn save_streak(&self, state: &StreakState) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO streak_state (id, streak, highest_streak, last_study_date)
            VALUES (1, ?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                streak = excluded.streak,
                highest_streak = excluded.highest_streak,
                last_study_date = excluded.last_study_date
            ",
        )
        .bind(i64::from(state.streak()))
        .bind(i64::from(state.highest_streak()))
        .bind(day_to_text(state.last_study_date()))
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn last_rollover(&self) -> Result<Option<NaiveDate>, StorageError> {
        let raw: Option<Option<String>> =
            sqlx::query_scalar("SELECT last_rollover FROM streak_state WHERE id = 1")
                .fetch_optional(&self.pool)
                .await
                .map_err(conn)?;
        day_from_text(raw.flatten())
    }

    async fn set_last_rollover(&self, day: NaiveDate) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO streak_state (id, streak, highest_streak, last_rollover)
            VALUES (1, 0, 0, ?1)
            ON CONFLICT(id) DO UPDATE SET last_rollover = excluded.last_rollover
            ",
        )
        .bind(day_to_text(Some(day)))
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }
}
