//! Calendar-day helpers shared by the streak, term, schedule, and hours logic.
//!
//! Every date in the engine is a `NaiveDate`: a calendar day with no time
//! component. Instants are converted to days with [`local_day`] using the
//! configured UTC offset, never the host time zone.

use chrono::{DateTime, Datelike, Days, FixedOffset, Months, NaiveDate, Utc, Weekday};
use thiserror::Error;

/// Persistence format for calendar days (`YYYY-MM-DD`).
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CalendarError {
    #[error("invalid date key: {raw:?}")]
    InvalidDateKey { raw: String },

    #[error("invalid weekday: {raw:?}")]
    InvalidWeekday { raw: String },
}

/// Formats a day as its storage key, e.g. `2024-03-07`.
#[must_use]
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Parses a storage key produced by [`date_key`].
///
/// # Errors
///
/// Returns `CalendarError::InvalidDateKey` if the value is not a `YYYY-MM-DD` date.
pub fn parse_date_key(raw: &str) -> Result<NaiveDate, CalendarError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_KEY_FORMAT).map_err(|_| {
        CalendarError::InvalidDateKey {
            raw: raw.to_owned(),
        }
    })
}

/// Weekday number with Sunday as 0 and Saturday as 6.
#[must_use]
pub fn weekday_index(day: Weekday) -> u8 {
    match day {
        Weekday::Sun => 0,
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
    }
}

/// Inverse of [`weekday_index`].
#[must_use]
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

/// Weekday number of a calendar day (Sunday = 0).
#[must_use]
pub fn day_index(date: NaiveDate) -> u8 {
    weekday_index(date.weekday())
}

/// Parses a weekday from a short name, full name, or Sunday-based index.
///
/// # Errors
///
/// Returns `CalendarError::InvalidWeekday` for anything else.
pub fn parse_weekday(raw: &str) -> Result<Weekday, CalendarError> {
    let normalized = raw.trim().to_ascii_lowercase();
    let parsed = match normalized.as_str() {
        "sun" | "sunday" | "0" => Some(Weekday::Sun),
        "mon" | "monday" | "1" => Some(Weekday::Mon),
        "tue" | "tues" | "tuesday" | "2" => Some(Weekday::Tue),
        "wed" | "wednesday" | "3" => Some(Weekday::Wed),
        "thu" | "thur" | "thurs" | "thursday" | "4" => Some(Weekday::Thu),
        "fri" | "friday" | "5" => Some(Weekday::Fri),
        "sat" | "saturday" | "6" => Some(Weekday::Sat),
        _ => None,
    };
    parsed.ok_or_else(|| CalendarError::InvalidWeekday {
        raw: raw.to_owned(),
    })
}

/// Signed number of calendar days from `from` to `to`.
#[must_use]
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// Days strictly between `from` and `to`, in order. Empty when `to <= from + 1`.
pub fn days_strictly_between(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    from.iter_days().skip(1).take_while(move |day| *day < to)
}

/// The day before `date`, saturating at the earliest representable day.
#[must_use]
pub fn previous_day(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(date)
}

/// Sunday on or before `date`; weeks run Sunday..=Saturday.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(day_index(date))))
        .unwrap_or(date)
}

/// First and last day of the month containing `date`.
#[must_use]
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(date);
    (first, last)
}

/// Calendar day of `instant` as seen at `offset`.
#[must_use]
pub fn local_day(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}
