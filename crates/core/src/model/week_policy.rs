use chrono::{NaiveDate, Weekday};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::calendar::{self, CalendarError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WeekPolicyError {
    #[error("a week needs at least one study day")]
    NoStudyDays,

    #[error(transparent)]
    Weekday(#[from] CalendarError),
}

/// Which weekdays are study days and which are rest days.
///
/// The default is a Sunday–Thursday school week with Friday and Saturday as
/// rest days. Skipping a rest day never breaks a streak; skipping a study day
/// always does.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct WeekPolicy {
    // Indexed by `calendar::weekday_index` (Sunday = 0).
    rest: [bool; 7],
}

impl WeekPolicy {
    /// Build a policy from its rest days. Duplicates are ignored.
    ///
    /// # Errors
    ///
    /// Returns `WeekPolicyError::NoStudyDays` if every weekday is a rest day.
    pub fn new(rest_days: impl IntoIterator<Item = Weekday>) -> Result<Self, WeekPolicyError> {
        let mut rest = [false; 7];
        for day in rest_days {
            rest[usize::from(calendar::weekday_index(day))] = true;
        }
        if rest.iter().all(|is_rest| *is_rest) {
            return Err(WeekPolicyError::NoStudyDays);
        }
        Ok(Self { rest })
    }

    /// A policy where every day is a study day.
    #[must_use]
    pub fn every_day() -> Self {
        Self { rest: [false; 7] }
    }

    #[must_use]
    pub fn is_rest_day(&self, day: Weekday) -> bool {
        self.rest[usize::from(calendar::weekday_index(day))]
    }

    #[must_use]
    pub fn is_study_day(&self, day: Weekday) -> bool {
        !self.is_rest_day(day)
    }

    #[must_use]
    pub fn is_rest_date(&self, date: NaiveDate) -> bool {
        self.rest[usize::from(calendar::day_index(date))]
    }

    #[must_use]
    pub fn rest_day_count(&self) -> usize {
        self.rest.iter().filter(|is_rest| **is_rest).count()
    }

    /// Rest days in Sunday-first order.
    #[must_use]
    pub fn rest_days(&self) -> Vec<Weekday> {
        self.days_where(true)
    }

    /// Study days in Sunday-first order.
    #[must_use]
    pub fn study_days(&self) -> Vec<Weekday> {
        self.days_where(false)
    }

    fn days_where(&self, rest: bool) -> Vec<Weekday> {
        (0..7_u8)
            .filter(|index| self.rest[usize::from(*index)] == rest)
            .filter_map(calendar::weekday_from_index)
            .collect()
    }
}

impl Default for WeekPolicy {
    fn default() -> Self {
        let mut rest = [false; 7];
        rest[usize::from(calendar::weekday_index(Weekday::Fri))] = true;
        rest[usize::from(calendar::weekday_index(Weekday::Sat))] = true;
        Self { rest }
    }
}

impl fmt::Debug for WeekPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeekPolicy")
            .field("rest_days", &self.rest_days())
            .finish()
    }
}

/// Parses a comma-separated list of rest days, e.g. `fri,sat`.
///
/// An empty string yields a policy with no rest days.
impl FromStr for WeekPolicy {
    type Err = WeekPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let days = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(calendar::parse_weekday)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(days)
    }
}
