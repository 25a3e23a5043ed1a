#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod hours_service;
pub mod mastery_service;
pub mod schedule_service;
pub mod streak_service;

pub use tracker_core::Clock;

pub use app_services::{AppServices, StatusReport};
pub use config::TrackerConfig;
pub use error::{
    AppServicesError, ConfigError, HoursServiceError, MasteryServiceError, ScheduleServiceError,
    StreakServiceError,
};
pub use hours_service::{HoursService, HoursUpdate};
pub use mastery_service::{MasteryService, QuizSubmission};
pub use schedule_service::ScheduleService;
pub use streak_service::StreakService;
