use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, Weekday};
use storage::repository::QuizScheduleRepository;
use tracing::info;
use tracker_core::model::WeekPolicy;
use tracker_core::schedule::QuizSchedule;
use tracker_core::term::TermCalendar;

use crate::Clock;
use crate::config::TrackerConfig;
use crate::error::ScheduleServiceError;

/// Term quiz planner backed by the schedule repository.
#[derive(Clone)]
pub struct ScheduleService {
    clock: Clock,
    utc_offset: FixedOffset,
    policy: WeekPolicy,
    term_weeks: u8,
    term: Option<TermCalendar>,
    schedules: Arc<dyn QuizScheduleRepository>,
}

impl ScheduleService {
    #[must_use]
    pub fn new(
        clock: Clock,
        config: &TrackerConfig,
        schedules: Arc<dyn QuizScheduleRepository>,
    ) -> Self {
        Self {
            clock,
            utc_offset: config.utc_offset,
            policy: config.week_policy,
            term_weeks: config
                .term
                .map_or(config.term_weeks, |term| term.total_weeks()),
            term: config.term,
            schedules,
        }
    }

    fn today(&self) -> NaiveDate {
        self.clock.today(self.utc_offset)
    }

    /// The stored schedule, or an empty one spanning the whole term.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleServiceError::Storage` if the schedule cannot be loaded.
    pub async fn load(&self) -> Result<QuizSchedule, ScheduleServiceError> {
        Ok(self
            .schedules
            .get_schedule()
            .await?
            .unwrap_or_else(|| QuizSchedule::new(self.term_weeks)))
    }

    /// # Errors
    ///
    /// Returns `ScheduleServiceError::Storage` if the schedule cannot be saved.
    pub async fn set_range(
        &self,
        start: Option<u8>,
        end: Option<u8>,
    ) -> Result<QuizSchedule, ScheduleServiceError> {
        let mut schedule = self.load().await?;
        schedule.set_range(start, end, self.term_weeks);
        self.schedules.save_schedule(&schedule).await?;
        info!(
            start_week = schedule.start_week(),
            end_week = schedule.end_week(),
            "quiz weeks set"
        );
        Ok(schedule)
    }

    /// Put `subject` on `weekday` of `week`; a blank subject clears the slot.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleServiceError::Schedule` for a rest day or a week
    /// outside the term, or `ScheduleServiceError::Storage` on save failure.
    pub async fn assign(
        &self,
        week: u8,
        weekday: Weekday,
        subject: &str,
    ) -> Result<QuizSchedule, ScheduleServiceError> {
        let mut schedule = self.load().await?;
        schedule.assign(week, weekday, subject, &self.policy, self.term_weeks)?;
        self.schedules.save_schedule(&schedule).await?;
        info!(week, day = %weekday, subject = subject.trim(), "quiz slot updated");
        Ok(schedule)
    }

    /// Week of the running term for today; 0 when no term is active.
    /// Rest days count toward the study week before them.
    #[must_use]
    pub fn current_week(&self) -> u8 {
        self.term
            .map_or(0, |term| term.week_of(self.today(), &self.policy))
    }

    /// Subject scheduled for today, if any.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleServiceError::Storage` if the schedule cannot be loaded.
    pub async fn quiz_for_today(&self) -> Result<Option<String>, ScheduleServiceError> {
        let week = self.current_week();
        if week == 0 {
            return Ok(None);
        }
        let schedule = self.load().await?;
        Ok(schedule.quiz_for(week, self.today()).map(str::to_owned))
    }
}
