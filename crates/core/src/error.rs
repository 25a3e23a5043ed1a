use thiserror::Error;

use crate::calendar::CalendarError;
use crate::model::{LessonIdError, QuizError, WeekPolicyError};
use crate::schedule::ScheduleError;
use crate::term::TermError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    LessonId(#[from] LessonIdError),
    #[error(transparent)]
    WeekPolicy(#[from] WeekPolicyError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    Term(#[from] TermError),
}
