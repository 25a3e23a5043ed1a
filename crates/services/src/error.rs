//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use tracker_core::model::QuizError;
use tracker_core::schedule::ScheduleError;

/// Errors emitted by `StreakService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StreakServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `MasteryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MasteryServiceError {
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `HoursService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HoursServiceError {
    #[error(transparent)]
    Streak(#[from] StreakServiceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ScheduleService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScheduleServiceError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while reading `TrackerConfig`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid value for {key}: {raw:?}")]
    InvalidValue { key: &'static str, raw: String },
    #[error(transparent)]
    Core(#[from] tracker_core::Error),
}

/// Errors emitted while bootstrapping or querying app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Streak(#[from] StreakServiceError),
    #[error(transparent)]
    Mastery(#[from] MasteryServiceError),
    #[error(transparent)]
    Hours(#[from] HoursServiceError),
    #[error(transparent)]
    Schedule(#[from] ScheduleServiceError),
}
