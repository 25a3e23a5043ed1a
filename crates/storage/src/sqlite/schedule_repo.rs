use async_trait::async_trait;
use sqlx::Row;
use tracker_core::schedule::{QuizSchedule, ScheduleSlot};

use super::SqliteRepository;
use super::mapping::{conn, ser, u8_from_i64};
use crate::repository::{QuizScheduleRepository, StorageError};

#[async_trait]
impl QuizScheduleRepository for SqliteRepository {
    async fn get_schedule(&self) -> Result<Option<QuizSchedule>, StorageError> {
        let header = sqlx::query("SELECT start_week, end_week FROM quiz_schedule WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        let Some(header) = header else {
            return Ok(None);
        };
        let start_week = u8_from_i64(
            "start_week",
            header.try_get::<i64, _>("start_week").map_err(ser)?,
        )?;
        let end_week = u8_from_i64("end_week", header.try_get::<i64, _>("end_week").map_err(ser)?)?;

        let rows = sqlx::query(
            r"
            SELECT week, weekday, subject
            FROM quiz_schedule_slots
            ORDER BY week ASC, weekday ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut slots = Vec::with_capacity(rows.len());
        for row in &rows {
            let week = u8_from_i64("week", row.try_get::<i64, _>("week").map_err(ser)?)?;
            let day = u8_from_i64("weekday", row.try_get::<i64, _>("weekday").map_err(ser)?)?;
            let slot = ScheduleSlot::from_persisted(week, day).map_err(ser)?;
            let subject: String = row.try_get("subject").map_err(ser)?;
            slots.push((slot, subject));
        }

        Ok(Some(QuizSchedule::from_persisted(start_week, end_week, slots)))
    }

    async fn save_schedule(&self, schedule: &QuizSchedule) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query(
            r"
            INSERT INTO quiz_schedule (id, start_week, end_week)
            VALUES (1, ?1, ?2)
            ON CONFLICT(id) DO UPDATE SET
                start_week = excluded.start_week,
                end_week = excluded.end_week
            ",
        )
        .bind(i64::from(schedule.start_week()))
        .bind(i64::from(schedule.end_week()))
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        sqlx::query("DELETE FROM quiz_schedule_slots")
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for (slot, subject) in schedule.slots() {
            sqlx::query(
                r"
                INSERT INTO quiz_schedule_slots (week, weekday, subject)
                VALUES (?1, ?2, ?3)
                ",
            )
            .bind(i64::from(slot.week()))
            .bind(i64::from(slot.day_index()))
            .bind(subject)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
