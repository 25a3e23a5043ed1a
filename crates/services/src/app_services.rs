use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use storage::repository::Storage;
use tracker_core::hours::SubjectHours;
use tracker_core::mastery::MasteryRecord;

use crate::Clock;
use crate::config::TrackerConfig;
use crate::error::AppServicesError;
use crate::hours_service::HoursService;
use crate::mastery_service::MasteryService;
use crate::schedule_service::ScheduleService;
use crate::streak_service::StreakService;

/// Snapshot of the tracker for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub today: NaiveDate,
    pub streak: u32,
    pub highest_streak: u32,
    pub last_study_date: Option<NaiveDate>,
    pub hours_today: u32,
    /// Sunday through Saturday.
    pub hours_week: u32,
    pub hours_month: u32,
    /// This month, most studied first.
    pub subject_hours: Vec<SubjectHours>,
    /// 0 when no term is active.
    pub term_week: u8,
    pub quiz_today: Option<String>,
    pub lessons: Vec<MasteryRecord>,
}

/// Assembles the tracker services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    streak: Arc<StreakService>,
    mastery: Arc<MasteryService>,
    hours: Arc<HoursService>,
    schedule: Arc<ScheduleService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage at `config.db_url`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(config: &TrackerConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.db_url).await?;
        Ok(Self::from_storage(&storage, config, clock))
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, config: &TrackerConfig, clock: Clock) -> Self {
        let streak = StreakService::new(
            clock,
            config.utc_offset,
            config.week_policy,
            Arc::clone(&storage.streaks),
        );
        let hours = HoursService::new(Arc::clone(&storage.hours), streak.clone());
        let mastery = MasteryService::new(clock, Arc::clone(&storage.quiz_results));
        let schedule = ScheduleService::new(clock, config, Arc::clone(&storage.schedules));

        Self {
            streak: Arc::new(streak),
            mastery: Arc::new(mastery),
            hours: Arc::new(hours),
            schedule: Arc::new(schedule),
        }
    }

    #[must_use]
    pub fn streak(&self) -> Arc<StreakService> {
        Arc::clone(&self.streak)
    }

    #[must_use]
    pub fn mastery(&self) -> Arc<MasteryService> {
        Arc::clone(&self.mastery)
    }

    #[must_use]
    pub fn hours(&self) -> Arc<HoursService> {
        Arc::clone(&self.hours)
    }

    #[must_use]
    pub fn schedule(&self) -> Arc<ScheduleService> {
        Arc::clone(&self.schedule)
    }

    /// Gather streak, hours, schedule and mastery into one report.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if any part cannot be loaded.
    pub async fn status(&self) -> Result<StatusReport, AppServicesError> {
        let state = self.streak.current().await?;
        let hours = self.hours.summary().await?;
        Ok(StatusReport {
            today: self.streak.today(),
            streak: state.streak(),
            highest_streak: state.highest_streak(),
            last_study_date: state.last_study_date(),
            hours_today: hours.today,
            hours_week: hours.week,
            hours_month: hours.month,
            subject_hours: self.hours.subject_hours().await?,
            term_week: self.schedule.current_week(),
            quiz_today: self.schedule.quiz_for_today().await?,
            lessons: self.mastery.overview().await?,
        })
    }
}
