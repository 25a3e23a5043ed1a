use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracker_core::hours::HoursEntry;
use tracker_core::model::{LessonId, QuizResult};
use tracker_core::schedule::QuizSchedule;
use tracker_core::streak::StreakState;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Streak counters plus the last day boundary that was checked.
#[async_trait]
pub trait StreakRepository: Send + Sync {
    /// Load the streak counters, or the zero state if none were saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the stored state cannot be read.
    async fn get_streak(&self) -> Result<StreakState, StorageError>;

    /// Persist the streak counters.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be stored.
    async fn save_streak(&self, state: &StreakState) -> Result<(), StorageError>;

    /// The `yesterday` of the most recent rollover check, if any ran.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the stored value cannot be read.
    async fn last_rollover(&self) -> Result<Option<NaiveDate>, StorageError>;

    /// Remember that the rollover for `day` has been evaluated.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set_last_rollover(&self, day: NaiveDate) -> Result<(), StorageError>;
}

/// Append-only quiz attempts per lesson, plus the last computed mastery.
#[async_trait]
pub trait QuizResultRepository: Send + Sync {
    /// Append one attempt for `lesson`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the attempt cannot be stored.
    async fn append_result(&self, lesson: &LessonId, result: &QuizResult)
    -> Result<(), StorageError>;

    /// All attempts for `lesson`, oldest first. Empty if none were recorded.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if rows cannot be read or decoded.
    async fn list_results(&self, lesson: &LessonId) -> Result<Vec<QuizResult>, StorageError>;

    /// Lessons with at least one attempt, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if rows cannot be read or decoded.
    async fn list_lessons(&self) -> Result<Vec<LessonId>, StorageError>;

    /// Last mastery stored for `lesson`.
    ///
    /// This is a cache of the value computed from the attempt history and is
    /// only written after an attempt was appended. Callers treat it as the
    /// fallback for a lesson with no attempts; a value stored without any
    /// attempt behind it is not a lower bound for the next computation.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be read.
    async fn get_mastery(&self, lesson: &LessonId) -> Result<Option<u8>, StorageError>;

    /// Store the latest mastery for `lesson`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn save_mastery(&self, lesson: &LessonId, mastery: u8) -> Result<(), StorageError>;
}

/// Study hours keyed by day and subject.
#[async_trait]
pub trait DailyHoursRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the stored entry cannot be read.
    async fn get_hours(
        &self,
        day: NaiveDate,
        subject: &str,
    ) -> Result<Option<HoursEntry>, StorageError>;

    /// Insert or replace the entry for its day and subject.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the entry cannot be stored.
    async fn save_hours(&self, entry: &HoursEntry) -> Result<(), StorageError>;

    /// Entries dated `from..=to`, ordered by day then subject.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if rows cannot be read or decoded.
    async fn list_hours(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<HoursEntry>, StorageError>;
}

#[async_trait]
pub trait QuizScheduleRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the schedule cannot be read or decoded.
    async fn get_schedule(&self) -> Result<Option<QuizSchedule>, StorageError>;

    /// Replace the stored schedule.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the schedule cannot be stored.
    async fn save_schedule(&self, schedule: &QuizSchedule) -> Result<(), StorageError>;
}

#[derive(Default)]
struct StreakSlot {
    state: StreakState,
    last_rollover: Option<NaiveDate>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    streak: Arc<Mutex<StreakSlot>>,
    results: Arc<Mutex<BTreeMap<LessonId, Vec<QuizResult>>>>,
    mastery: Arc<Mutex<HashMap<LessonId, u8>>>,
    hours: Arc<Mutex<BTreeMap<(NaiveDate, String), u32>>>,
    schedule: Arc<Mutex<Option<QuizSchedule>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl StreakRepository for InMemoryRepository {
    async fn get_streak(&self) -> Result<StreakState, StorageError> {
        let guard = self.streak.lock().map_err(poisoned)?;
        Ok(guard.state)
    }

    async fn save_streak(&self, state: &StreakState) -> Result<(), StorageError> {
        let mut guard = self.streak.lock().map_err(poisoned)?;
        guard.state = *state;
        Ok(())
    }

    async fn last_rollover(&self) -> Result<Option<NaiveDate>, StorageError> {
        let guard = self.streak.lock().map_err(poisoned)?;
        Ok(guard.last_rollover)
    }

    async fn set_last_rollover(&self, day: NaiveDate) -> Result<(), StorageError> {
        let mut guard = self.streak.lock().map_err(poisoned)?;
        guard.last_rollover = Some(day);
        Ok(())
    }
}

#[async_trait]
impl QuizResultRepository for InMemoryRepository {
    async fn append_result(
        &self,
        lesson: &LessonId,
        result: &QuizResult,
    ) -> Result<(), StorageError> {
        let mut guard = self.results.lock().map_err(poisoned)?;
        guard.entry(lesson.clone()).or_default().push(result.clone());
        Ok(())
    }

    async fn list_results(&self, lesson: &LessonId) -> Result<Vec<QuizResult>, StorageError> {
        let guard = self.results.lock().map_err(poisoned)?;
        Ok(guard.get(lesson).cloned().unwrap_or_default())
    }

    async fn list_lessons(&self) -> Result<Vec<LessonId>, StorageError> {
        let guard = self.results.lock().map_err(poisoned)?;
        Ok(guard
            .iter()
            .filter(|(_, results)| !results.is_empty())
            .map(|(lesson, _)| lesson.clone())
            .collect())
    }

    async fn get_mastery(&self, lesson: &LessonId) -> Result<Option<u8>, StorageError> {
        let guard = self.mastery.lock().map_err(poisoned)?;
        Ok(guard.get(lesson).copied())
    }

    async fn save_mastery(&self, lesson: &LessonId, mastery: u8) -> Result<(), StorageError> {
        let mut guard = self.mastery.lock().map_err(poisoned)?;
        guard.insert(lesson.clone(), mastery);
        Ok(())
    }
}

#[async_trait]
impl DailyHoursRepository for InMemoryRepository {
    async fn get_hours(
        &self,
        day: NaiveDate,
        subject: &str,
    ) -> Result<Option<HoursEntry>, StorageError> {
        let guard = self.hours.lock().map_err(poisoned)?;
        Ok(guard
            .get(&(day, subject.to_owned()))
            .map(|&hours| HoursEntry {
                date: day,
                subject: subject.to_owned(),
                hours,
            }))
    }

    async fn save_hours(&self, entry: &HoursEntry) -> Result<(), StorageError> {
        let mut guard = self.hours.lock().map_err(poisoned)?;
        guard.insert((entry.date, entry.subject.clone()), entry.hours);
        Ok(())
    }

    async fn list_hours(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<HoursEntry>, StorageError> {
        let guard = self.hours.lock().map_err(poisoned)?;
        Ok(guard
            .iter()
            .filter(|((date, _), _)| *date >= from && *date <= to)
            .map(|((date, subject), &hours)| HoursEntry {
                date: *date,
                subject: subject.clone(),
                hours,
            })
            .collect())
    }
}

#[async_trait]
impl QuizScheduleRepository for InMemoryRepository {
    async fn get_schedule(&self) -> Result<Option<QuizSchedule>, StorageError> {
        let guard = self.schedule.lock().map_err(poisoned)?;
        Ok(guard.clone())
    }

    async fn save_schedule(&self, schedule: &QuizSchedule) -> Result<(), StorageError> {
        let mut guard = self.schedule.lock().map_err(poisoned)?;
        *guard = Some(schedule.clone());
        Ok(())
    }
}

/// Aggregates the tracker repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub streaks: Arc<dyn StreakRepository>,
    pub quiz_results: Arc<dyn QuizResultRepository>,
    pub hours: Arc<dyn DailyHoursRepository>,
    pub schedules: Arc<dyn QuizScheduleRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            streaks: Arc::new(repo.clone()),
            quiz_results: Arc::new(repo.clone()),
            hours: Arc::new(repo.clone()),
            schedules: Arc::new(repo),
        }
    }
}
