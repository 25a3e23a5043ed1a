use std::sync::Arc;

use chrono::NaiveDate;
use storage::repository::DailyHoursRepository;
use tracing::debug;
use tracker_core::hours::{self, HoursEntry, HoursPeriod, HoursSummary, SubjectHours};
use tracker_core::streak::StreakUpdate;

use crate::error::HoursServiceError;
use crate::streak_service::StreakService;

/// Result of logging one study hour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoursUpdate {
    /// Today's entry for the subject the hour went to.
    pub entry: HoursEntry,
    /// All subjects, today.
    pub today_total: u32,
    pub streak: StreakUpdate,
}

/// Study hours by day and subject. Logging an hour also counts as studying today.
#[derive(Clone)]
pub struct HoursService {
    hours: Arc<dyn DailyHoursRepository>,
    streak: StreakService,
}

impl HoursService {
    #[must_use]
    pub fn new(hours: Arc<dyn DailyHoursRepository>, streak: StreakService) -> Self {
        Self { hours, streak }
    }

    /// Hours logged today across all subjects.
    ///
    /// # Errors
    ///
    /// Returns `HoursServiceError::Storage` if entries cannot be loaded.
    pub async fn today_hours(&self) -> Result<u32, HoursServiceError> {
        self.total(HoursPeriod::Today).await
    }

    /// Hours logged Sunday through Saturday of the current week.
    ///
    /// # Errors
    ///
    /// Returns `HoursServiceError::Storage` if entries cannot be loaded.
    pub async fn week_total(&self) -> Result<u32, HoursServiceError> {
        self.total(HoursPeriod::Week).await
    }

    /// Hours logged in the current calendar month.
    ///
    /// # Errors
    ///
    /// Returns `HoursServiceError::Storage` if entries cannot be loaded.
    pub async fn month_total(&self) -> Result<u32, HoursServiceError> {
        self.total(HoursPeriod::Month).await
    }

    /// Today, week and month totals from one read.
    ///
    /// # Errors
    ///
    /// Returns `HoursServiceError::Storage` if entries cannot be loaded.
    pub async fn summary(&self) -> Result<HoursSummary, HoursServiceError> {
        let today = self.streak.today();
        let entries = self.entries_around(today).await?;
        Ok(HoursSummary::from_entries(&entries, today))
    }

    /// Per-subject totals for the current month, most studied first.
    ///
    /// # Errors
    ///
    /// Returns `HoursServiceError::Storage` if entries cannot be loaded.
    pub async fn subject_hours(&self) -> Result<Vec<SubjectHours>, HoursServiceError> {
        let today = self.streak.today();
        let (from, to) = HoursPeriod::Month.bounds(today);
        let entries = self.hours.list_hours(from, to).await?;
        Ok(hours::hours_by_subject(&entries, HoursPeriod::Month, today))
    }

    /// Add one hour to today's entry for `subject` ("General" when absent)
    /// and record a study session.
    ///
    /// # Errors
    ///
    /// Returns `HoursServiceError` if the entry or streak cannot be persisted.
    pub async fn add_hour(&self, subject: Option<&str>) -> Result<HoursUpdate, HoursServiceError> {
        let today = self.streak.today();
        let subject = hours::normalize_subject(subject);
        let entry = self
            .hours
            .get_hours(today, &subject)
            .await?
            .unwrap_or_else(|| HoursEntry::new(today, Some(&subject)))
            .add_hour();
        self.hours.save_hours(&entry).await?;
        debug!(%today, subject = %entry.subject, hours = entry.hours, "study hour logged");

        let today_total = self.today_hours().await?;
        let streak = self.streak.record_study_session().await?;
        Ok(HoursUpdate {
            entry,
            today_total,
            streak,
        })
    }

    async fn total(&self, period: HoursPeriod) -> Result<u32, HoursServiceError> {
        let today = self.streak.today();
        let (from, to) = period.bounds(today);
        let entries = self.hours.list_hours(from, to).await?;
        Ok(hours::total_hours(&entries, period, today))
    }

    /// Entries covering both this week and this month.
    async fn entries_around(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<HoursEntry>, HoursServiceError> {
        let (week_from, week_to) = HoursPeriod::Week.bounds(today);
        let (month_from, month_to) = HoursPeriod::Month.bounds(today);
        let entries = self
            .hours
            .list_hours(week_from.min(month_from), week_to.max(month_to))
            .await?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Offset, TimeZone, Utc};
    use storage::repository::InMemoryRepository;
    use tracker_core::Clock;
    use tracker_core::model::WeekPolicy;
    use tracker_core::streak::StreakAction;

    fn service(clock: Clock, repo: &InMemoryRepository) -> HoursService {
        let streak = StreakService::new(
            clock,
            Utc.fix(),
            WeekPolicy::default(),
            Arc::new(repo.clone()),
        );
        HoursService::new(Arc::new(repo.clone()), streak)
    }

    fn clock_on(m: u32, d: u32) -> Clock {
        Clock::fixed(Utc.with_ymd_and_hms(2024, m, d, 8, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn hours_count_up_and_restart_next_day() {
        let repo = InMemoryRepository::new();
        // Monday 2024-03-04.
        let mut clock = clock_on(3, 4);

        let svc = service(clock, &repo);
        assert_eq!(svc.today_hours().await.unwrap(), 0);
        let first = svc.add_hour(None).await.unwrap();
        assert_eq!(first.entry.hours, 1);
        assert_eq!(first.entry.subject, "General");
        assert_eq!(first.streak.state.streak(), 1);

        let second = svc.add_hour(Some("Physics")).await.unwrap();
        assert_eq!(second.entry.hours, 1);
        assert_eq!(second.today_total, 2);
        assert_eq!(second.streak.action, StreakAction::Noop);
        assert_eq!(svc.today_hours().await.unwrap(), 2);

        clock.advance(Duration::days(1));
        let svc = service(clock, &repo);
        assert_eq!(svc.today_hours().await.unwrap(), 0);
        let next = svc.add_hour(Some("Physics")).await.unwrap();
        assert_eq!(next.entry.hours, 1);
        assert_eq!(next.streak.action, StreakAction::Extend);
        assert_eq!(next.streak.state.streak(), 2);

        // Earlier days are kept, not overwritten.
        assert_eq!(svc.week_total().await.unwrap(), 3);
        assert_eq!(
            repo.get_hours(clock_on(3, 4).today(Utc.fix()), "General")
                .await
                .unwrap()
                .map(|e| e.hours),
            Some(1)
        );
    }

    #[tokio::test]
    async fn week_total_resets_on_sunday() {
        let repo = InMemoryRepository::new();
        // Saturday 2024-03-09, then Sunday 2024-03-10.
        let mut clock = clock_on(3, 9);
        let svc = service(clock, &repo);
        svc.add_hour(None).await.unwrap();
        svc.add_hour(None).await.unwrap();
        assert_eq!(svc.week_total().await.unwrap(), 2);

        clock.advance(Duration::days(1));
        let svc = service(clock, &repo);
        assert_eq!(svc.week_total().await.unwrap(), 0);
        svc.add_hour(Some("Math")).await.unwrap();
        assert_eq!(svc.week_total().await.unwrap(), 1);
        assert_eq!(svc.month_total().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn month_total_resets_on_the_first() {
        let repo = InMemoryRepository::new();
        // Thursday 2024-02-29, then Friday 2024-03-01 in the same Sunday week.
        let mut clock = clock_on(2, 29);
        let svc = service(clock, &repo);
        svc.add_hour(Some("Biology")).await.unwrap();
        assert_eq!(svc.month_total().await.unwrap(), 1);

        clock.advance(Duration::days(1));
        let svc = service(clock, &repo);
        svc.add_hour(Some("Math")).await.unwrap();
        svc.add_hour(Some("Math")).await.unwrap();
        assert_eq!(
            svc.summary().await.unwrap(),
            HoursSummary {
                today: 2,
                week: 3,
                month: 2
            }
        );
        assert_eq!(svc.month_total().await.unwrap(), 2);

        let subjects = svc.subject_hours().await.unwrap();
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].subject, "Math");
        assert_eq!(subjects[0].hours, 2);
    }
}
