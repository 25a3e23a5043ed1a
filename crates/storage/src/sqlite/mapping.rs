use chrono::NaiveDate;
use tracker_core::calendar;
use tracker_core::model::LessonId;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn u8_from_i64(field: &'static str, v: i64) -> Result<u8, StorageError> {
    u8::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

/// Days are stored as `YYYY-MM-DD` keys.
pub(crate) fn day_to_text(day: Option<NaiveDate>) -> Option<String> {
    day.map(calendar::date_key)
}

pub(crate) fn day_from_text(raw: Option<String>) -> Result<Option<NaiveDate>, StorageError> {
    raw.as_deref()
        .map(calendar::parse_date_key)
        .transpose()
        .map_err(ser)
}

pub(crate) fn lesson_from_text(raw: String) -> Result<LessonId, StorageError> {
    LessonId::new(raw).map_err(ser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_text_uses_date_keys() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(day_to_text(Some(day)).as_deref(), Some("2024-03-07"));
        assert_eq!(day_from_text(Some("2024-03-07".into())).unwrap(), Some(day));
        assert_eq!(day_from_text(None).unwrap(), None);
    }

    #[test]
    fn garbage_day_is_a_serialization_error() {
        let err = day_from_text(Some("yesterday".into())).unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[test]
    fn negative_counters_are_rejected() {
        assert!(u32_from_i64("streak", -1).is_err());
        assert_eq!(u8_from_i64("mastery", 100).unwrap(), 100);
        assert!(u8_from_i64("mastery", 300).is_err());
    }
}
