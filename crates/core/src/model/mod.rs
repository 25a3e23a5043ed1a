mod ids;
mod quiz;
mod week_policy;

pub use ids::{LessonId, LessonIdError};
pub use quiz::{QuizError, QuizResult};
pub use week_policy::{WeekPolicy, WeekPolicyError};
