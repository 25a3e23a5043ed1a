//! Term quiz schedule: which subject is quizzed on which study day of which week.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar;
use crate::model::WeekPolicy;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScheduleError {
    #[error("week {week} is outside the term (1..={total_weeks})")]
    WeekOutOfRange { week: u8, total_weeks: u8 },

    #[error("{day} is a rest day")]
    RestDay { day: Weekday },

    #[error("invalid weekday index {index} in stored slot")]
    InvalidSlotDay { index: u8 },
}

/// A cell in the schedule grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScheduleSlot {
    week: u8,
    // Sunday-based index so slots order by week then weekday.
    day: u8,
}

impl ScheduleSlot {
    #[must_use]
    pub fn new(week: u8, weekday: Weekday) -> Self {
        Self {
            week,
            day: calendar::weekday_index(weekday),
        }
    }

    /// Rebuild a slot from its stored weekday index.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleError::InvalidSlotDay` if `day` is not in `0..7`.
    pub fn from_persisted(week: u8, day: u8) -> Result<Self, ScheduleError> {
        calendar::weekday_from_index(day)
            .map(|weekday| Self::new(week, weekday))
            .ok_or(ScheduleError::InvalidSlotDay { index: day })
    }

    #[must_use]
    pub fn week(&self) -> u8 {
        self.week
    }

    #[must_use]
    pub fn day_index(&self) -> u8 {
        self.day
    }

    #[must_use]
    pub fn weekday(&self) -> Weekday {
        calendar::weekday_from_index(self.day).unwrap_or(Weekday::Sun)
    }
}

/// Clamp a requested week range into the term: `start` to `[1, total]`,
/// `end` to `[start, total]`. Missing bounds default to the full term.
#[must_use]
pub fn normalize_range(start: Option<u8>, end: Option<u8>, total_weeks: u8) -> (u8, u8) {
    let total = total_weeks.max(1);
    let start = start.unwrap_or(1).clamp(1, total);
    let end = end.unwrap_or(total).clamp(start, total);
    (start, end)
}

/// Subjects assigned to study days across a range of term weeks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSchedule {
    start_week: u8,
    end_week: u8,
    slots: BTreeMap<ScheduleSlot, String>,
}

impl QuizSchedule {
    /// An empty schedule covering the whole term.
    #[must_use]
    pub fn new(total_weeks: u8) -> Self {
        let (start_week, end_week) = normalize_range(None, None, total_weeks);
        Self {
            start_week,
            end_week,
            slots: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn from_persisted(
        start_week: u8,
        end_week: u8,
        slots: impl IntoIterator<Item = (ScheduleSlot, String)>,
    ) -> Self {
        Self {
            start_week,
            end_week,
            slots: slots.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn start_week(&self) -> u8 {
        self.start_week
    }

    #[must_use]
    pub fn end_week(&self) -> u8 {
        self.end_week
    }

    pub fn slots(&self) -> impl Iterator<Item = (&ScheduleSlot, &str)> {
        self.slots.iter().map(|(slot, subject)| (slot, subject.as_str()))
    }

    pub fn set_range(&mut self, start: Option<u8>, end: Option<u8>, total_weeks: u8) {
        let (start_week, end_week) = normalize_range(start, end, total_weeks);
        self.start_week = start_week;
        self.end_week = end_week;
    }

    /// Put `subject` on `weekday` of `week`. A blank subject clears the slot.
    ///
    /// # Errors
    ///
    /// - `WeekOutOfRange` if `week` is not within the term
    /// - `RestDay` if `weekday` is not a study day under `policy`
    pub fn assign(
        &mut self,
        week: u8,
        weekday: Weekday,
        subject: &str,
        policy: &WeekPolicy,
        total_weeks: u8,
    ) -> Result<(), ScheduleError> {
        if week == 0 || week > total_weeks {
            return Err(ScheduleError::WeekOutOfRange { week, total_weeks });
        }
        if policy.is_rest_day(weekday) {
            return Err(ScheduleError::RestDay { day: weekday });
        }

        let slot = ScheduleSlot::new(week, weekday);
        let subject = subject.trim();
        if subject.is_empty() {
            self.slots.remove(&slot);
        } else {
            self.slots.insert(slot, subject.to_owned());
        }
        Ok(())
    }

    /// Subject quizzed on `date`, which falls in term week `week`.
    #[must_use]
    pub fn quiz_for(&self, week: u8, date: NaiveDate) -> Option<&str> {
        if week < self.start_week || week > self.end_week {
            return None;
        }
        self.slots
            .get(&ScheduleSlot::new(week, date.weekday()))
            .map(String::as_str)
    }
}
