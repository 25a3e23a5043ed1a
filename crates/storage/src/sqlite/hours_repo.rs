use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::Row;
use tracker_core::hours::HoursEntry;

use super::SqliteRepository;
use super::mapping::{conn, day_from_text, day_to_text, ser, u32_from_i64};
use crate::repository::{DailyHoursRepository, StorageError};

fn map_hours_row(row: &sqlx::sqlite::SqliteRow) -> Result<HoursEntry, StorageError> {
    let date = day_from_text(Some(row.try_get::<String, _>("hours_date").map_err(ser)?))?
        .ok_or_else(|| StorageError::Serialization("missing hours_date".into()))?;
    let subject: String = row.try_get("subject").map_err(ser)?;
    let hours = u32_from_i64("hours", row.try_get::<i64, _>("hours").map_err(ser)?)?;
    Ok(HoursEntry {
        date,
        subject,
        hours,
    })
}

#[async_trait]
impl DailyHoursRepository for SqliteRepository {
    async fn get_hours(
        &self,
        day: NaiveDate,
        subject: &str,
    ) -> Result<Option<HoursEntry>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT hours_date, subject, hours
            FROM study_hours
            WHERE hours_date = ?1 AND subject = ?2
            ",
        )
        .bind(day_to_text(Some(day)))
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_hours_row).transpose()
    }

    async fn save_hours(&self, entry: &HoursEntry) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO study_hours (hours_date, subject, hours)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(hours_date, subject) DO UPDATE SET
                hours = excluded.hours
            ",
        )
        .bind(day_to_text(Some(entry.date)))
        .bind(&entry.subject)
        .bind(i64::from(entry.hours))
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn list_hours(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<HoursEntry>, StorageError> {
        // Day keys are zero-padded, so text order is date order.
        let rows = sqlx::query(
            r"
            SELECT hours_date, subject, hours
            FROM study_hours
            WHERE hours_date BETWEEN ?1 AND ?2
            ORDER BY hours_date ASC, subject ASC
            ",
        )
        .bind(day_to_text(Some(from)))
        .bind(day_to_text(Some(to)))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_hours_row).collect()
    }
}
