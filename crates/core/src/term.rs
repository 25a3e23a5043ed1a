use chrono::NaiveDate;
use thiserror::Error;

use crate::calendar;
use crate::model::WeekPolicy;

/// Weeks in a term unless configured otherwise.
pub const DEFAULT_TERM_WEEKS: u8 = 11;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TermError {
    #[error("a term needs at least one week, got {provided}")]
    InvalidTotalWeeks { provided: u8 },
}

/// An active school term: its first day and its length in weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermCalendar {
    start: NaiveDate,
    total_weeks: u8,
}

impl TermCalendar {
    /// # Errors
    ///
    /// Returns `TermError::InvalidTotalWeeks` if `total_weeks` is zero.
    pub fn new(start: NaiveDate, total_weeks: u8) -> Result<Self, TermError> {
        if total_weeks == 0 {
            return Err(TermError::InvalidTotalWeeks {
                provided: total_weeks,
            });
        }
        Ok(Self { start, total_weeks })
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub fn total_weeks(&self) -> u8 {
        self.total_weeks
    }

    /// One-based term week containing `date`, clamped to `[1, total_weeks]`.
    ///
    /// Rest days belong to the study week they follow: a rest date is counted
    /// as the most recent study day before it, so Friday and Saturday stay in
    /// the week that ended on Thursday even when the term started mid-week.
    #[must_use]
    pub fn week_of(&self, date: NaiveDate, policy: &WeekPolicy) -> u8 {
        let date = last_study_day(date, policy);
        let days = calendar::days_between(self.start, date);
        if days < 0 {
            return 1;
        }
        let week = days / 7 + 1;
        u8::try_from(week).map_or(self.total_weeks, |week| week.min(self.total_weeks))
    }
}

/// `date` itself, or the closest earlier study day if `date` is a rest day.
fn last_study_day(date: NaiveDate, policy: &WeekPolicy) -> NaiveDate {
    let mut day = date;
    // A policy keeps at least one study day, so six steps always suffice.
    for _ in 0..6 {
        if !policy.is_rest_date(day) {
            break;
        }
        day = calendar::previous_day(day);
    }
    day
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn counts_weeks_from_start() {
        // Sunday 2024-01-07.
        let term = TermCalendar::new(day(1, 7), DEFAULT_TERM_WEEKS).unwrap();
        let policy = WeekPolicy::default();
        assert_eq!(term.week_of(day(1, 7), &policy), 1);
        assert_eq!(term.week_of(day(1, 13), &policy), 1);
        assert_eq!(term.week_of(day(1, 14), &policy), 2);
        assert_eq!(term.week_of(day(2, 29), &policy), 8);
    }

    #[test]
    fn rest_days_stay_in_the_week_they_follow() {
        // Term starts Friday 2024-03-08; the first full week ends Thursday 03-14.
        let term = TermCalendar::new(day(3, 8), DEFAULT_TERM_WEEKS).unwrap();
        let policy = WeekPolicy::default();
        assert_eq!(term.week_of(day(3, 14), &policy), 1);
        assert_eq!(term.week_of(day(3, 15), &policy), 1);
        assert_eq!(term.week_of(day(3, 16), &policy), 1);
        assert_eq!(term.week_of(day(3, 17), &policy), 2);
        // Every day counts when there are no rest days.
        assert_eq!(term.week_of(day(3, 15), &WeekPolicy::every_day()), 2);
    }

    #[test]
    fn rest_days_follow_the_configured_policy() {
        // Saturday and Sunday off: Sunday 03-10 still belongs to week 1.
        let term = TermCalendar::new(day(3, 3), DEFAULT_TERM_WEEKS).unwrap();
        let policy = WeekPolicy::new([Weekday::Sat, Weekday::Sun]).unwrap();
        assert_eq!(term.week_of(day(3, 10), &policy), 1);
        assert_eq!(term.week_of(day(3, 11), &policy), 2);
    }

    #[test]
    fn clamps_outside_the_term() {
        let term = TermCalendar::new(day(1, 7), DEFAULT_TERM_WEEKS).unwrap();
        let policy = WeekPolicy::default();
        assert_eq!(term.week_of(day(1, 1), &policy), 1);
        assert_eq!(term.week_of(day(6, 1), &policy), 11);
        assert_eq!(
            term.week_of(NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(), &policy),
            11
        );
    }

    #[test]
    fn rejects_empty_term() {
        assert_eq!(
            TermCalendar::new(day(1, 7), 0).unwrap_err(),
            TermError::InvalidTotalWeeks { provided: 0 }
        );
    }
}
