//! Study-hour history: hours logged per day and subject, with week and
//! month totals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar;

/// Bucket for hours logged without a subject.
pub const GENERAL_SUBJECT: &str = "General";

/// Trimmed subject name; blank means [`GENERAL_SUBJECT`].
#[must_use]
pub fn normalize_subject(subject: Option<&str>) -> String {
    match subject.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_owned(),
        _ => GENERAL_SUBJECT.to_owned(),
    }
}

/// Hours logged for one subject on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursEntry {
    pub date: NaiveDate,
    pub subject: String,
    pub hours: u32,
}

impl HoursEntry {
    #[must_use]
    pub fn new(date: NaiveDate, subject: Option<&str>) -> Self {
        Self {
            date,
            subject: normalize_subject(subject),
            hours: 0,
        }
    }

    #[must_use]
    pub fn add_hour(self) -> Self {
        Self {
            hours: self.hours.saturating_add(1),
            ..self
        }
    }
}

/// A span of days hours are totalled over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoursPeriod {
    Today,
    /// Sunday through Saturday around today.
    Week,
    Month,
}

impl HoursPeriod {
    /// Inclusive first and last day of the period containing `today`.
    #[must_use]
    pub fn bounds(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Self::Today => (today, today),
            Self::Week => {
                let start = calendar::week_start(today);
                let end = start
                    .checked_add_days(chrono::Days::new(6))
                    .unwrap_or(start);
                (start, end)
            }
            Self::Month => calendar::month_bounds(today),
        }
    }
}

/// Sum of hours in `entries` that fall within `period` around `today`.
#[must_use]
pub fn total_hours(entries: &[HoursEntry], period: HoursPeriod, today: NaiveDate) -> u32 {
    let (from, to) = period.bounds(today);
    entries
        .iter()
        .filter(|entry| entry.date >= from && entry.date <= to)
        .fold(0u32, |sum, entry| sum.saturating_add(entry.hours))
}

/// Hours per subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectHours {
    pub subject: String,
    pub hours: u32,
}

/// Per-subject totals within `period`, most studied first, ties by name.
#[must_use]
pub fn hours_by_subject(
    entries: &[HoursEntry],
    period: HoursPeriod,
    today: NaiveDate,
) -> Vec<SubjectHours> {
    let (from, to) = period.bounds(today);
    let mut totals = std::collections::BTreeMap::<&str, u32>::new();
    for entry in entries.iter().filter(|e| e.date >= from && e.date <= to) {
        let total = totals.entry(entry.subject.as_str()).or_default();
        *total = total.saturating_add(entry.hours);
    }

    let mut out: Vec<SubjectHours> = totals
        .into_iter()
        .map(|(subject, hours)| SubjectHours {
            subject: subject.to_owned(),
            hours,
        })
        .collect();
    out.sort_by(|a, b| b.hours.cmp(&a.hours).then_with(|| a.subject.cmp(&b.subject)));
    out
}

/// Today, this week and this month at a glance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HoursSummary {
    pub today: u32,
    pub week: u32,
    pub month: u32,
}

impl HoursSummary {
    #[must_use]
    pub fn from_entries(entries: &[HoursEntry], today: NaiveDate) -> Self {
        Self {
            today: total_hours(entries, HoursPeriod::Today, today),
            week: total_hours(entries, HoursPeriod::Week, today),
            month: total_hours(entries, HoursPeriod::Month, today),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn entry(m: u32, d: u32, subject: &str, hours: u32) -> HoursEntry {
        HoursEntry {
            date: day(m, d),
            subject: subject.to_owned(),
            hours,
        }
    }

    #[test]
    fn blank_subject_is_general() {
        assert_eq!(normalize_subject(None), GENERAL_SUBJECT);
        assert_eq!(normalize_subject(Some("  ")), GENERAL_SUBJECT);
        assert_eq!(normalize_subject(Some(" Physics ")), "Physics");

        let logged = HoursEntry::new(day(3, 4), Some("Physics")).add_hour().add_hour();
        assert_eq!(logged.hours, 2);
        assert_eq!(logged.subject, "Physics");
    }

    #[test]
    fn week_runs_sunday_to_saturday() {
        // Saturday 2024-03-02 belongs to the previous week; Sunday 03-10 to the next.
        let entries = vec![
            entry(3, 2, "Math", 4),
            entry(3, 3, "Math", 1),
            entry(3, 6, "Physics", 2),
            entry(3, 9, "Math", 3),
            entry(3, 10, "Math", 5),
        ];
        assert_eq!(total_hours(&entries, HoursPeriod::Week, day(3, 6)), 6);
        assert_eq!(total_hours(&entries, HoursPeriod::Week, day(3, 3)), 6);
        assert_eq!(total_hours(&entries, HoursPeriod::Week, day(3, 9)), 6);
        assert_eq!(total_hours(&entries, HoursPeriod::Week, day(3, 10)), 5);
        assert_eq!(total_hours(&entries, HoursPeriod::Today, day(3, 6)), 2);
    }

    #[test]
    fn week_spanning_months_counts_both_sides() {
        // Week of Sunday 2024-03-31 runs into April.
        let entries = vec![entry(3, 31, "Math", 2), entry(4, 2, "Math", 1)];
        assert_eq!(total_hours(&entries, HoursPeriod::Week, day(4, 2)), 3);
        assert_eq!(total_hours(&entries, HoursPeriod::Month, day(4, 2)), 1);
        assert_eq!(total_hours(&entries, HoursPeriod::Month, day(3, 31)), 2);
    }

    #[test]
    fn month_includes_first_and_last_day_only() {
        let entries = vec![
            entry(1, 31, "Math", 7),
            entry(2, 1, "Math", 1),
            entry(2, 29, "Biology", 2),
            entry(3, 1, "Math", 9),
        ];
        assert_eq!(total_hours(&entries, HoursPeriod::Month, day(2, 14)), 3);

        let summary = HoursSummary::from_entries(&entries, day(2, 29));
        assert_eq!(
            summary,
            HoursSummary {
                today: 2,
                week: 2,
                month: 3
            }
        );
    }

    #[test]
    fn subjects_are_ranked_by_hours() {
        let entries = vec![
            entry(3, 4, "Physics", 1),
            entry(3, 5, "Math", 2),
            entry(3, 6, "Physics", 2),
            entry(3, 6, "Biology", 3),
            entry(2, 28, "Math", 10),
        ];
        let ranked = hours_by_subject(&entries, HoursPeriod::Month, day(3, 6));
        let names: Vec<_> = ranked.iter().map(|s| (s.subject.as_str(), s.hours)).collect();
        assert_eq!(names, vec![("Biology", 3), ("Physics", 3), ("Math", 2)]);
    }
}
