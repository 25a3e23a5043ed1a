use std::sync::Arc;

use serde::Serialize;
use storage::repository::QuizResultRepository;
use tracing::{debug, info};
use tracker_core::mastery::{MasteryChange, MasteryRecord, MasteryStats, compute_mastery};
use tracker_core::model::{LessonId, QuizResult};

use crate::Clock;
use crate::error::MasteryServiceError;

/// Outcome of submitting one quiz attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizSubmission {
    pub lesson_id: LessonId,
    pub result: QuizResult,
    #[serde(skip)]
    pub change: MasteryChange,
    pub mastery: u8,
}

impl QuizSubmission {
    #[must_use]
    pub fn reached_complete(&self) -> bool {
        self.change.reached_complete()
    }
}

/// Records quiz attempts and keeps per-lesson mastery current.
#[derive(Clone)]
pub struct MasteryService {
    clock: Clock,
    results: Arc<dyn QuizResultRepository>,
}

impl MasteryService {
    #[must_use]
    pub fn new(clock: Clock, results: Arc<dyn QuizResultRepository>) -> Self {
        Self { clock, results }
    }

    /// Validate and store a quiz attempt, then recompute the lesson's mastery.
    ///
    /// Nothing is written when the attempt is rejected.
    ///
    /// # Errors
    ///
    /// Returns `MasteryServiceError::Quiz` for an invalid score or denominator,
    /// or `MasteryServiceError::Storage` if persistence fails.
    pub async fn submit_quiz(
        &self,
        lesson: &LessonId,
        score: f64,
        out_of: f64,
    ) -> Result<QuizSubmission, MasteryServiceError> {
        let existing = self.results.list_results(lesson).await?;
        let previous = self.stored_or_computed(lesson, &existing).await?;

        let result = QuizResult::new(score, out_of, self.clock.now())?;
        let mut results = existing;
        results.push(result.clone());
        let mastery = compute_mastery(&results, previous);

        self.results.append_result(lesson, &result).await?;
        self.results.save_mastery(lesson, mastery).await?;

        let change = MasteryChange::new(previous, mastery);
        if change.reached_complete() {
            info!(lesson = %lesson, "lesson mastered");
        } else {
            debug!(lesson = %lesson, previous, mastery, "mastery updated");
        }

        Ok(QuizSubmission {
            lesson_id: lesson.clone(),
            result,
            change,
            mastery,
        })
    }

    /// Current mastery for `lesson`; 0 for an unknown lesson.
    ///
    /// # Errors
    ///
    /// Returns `MasteryServiceError::Storage` if the lesson cannot be loaded.
    pub async fn mastery(&self, lesson: &LessonId) -> Result<u8, MasteryServiceError> {
        let results = self.results.list_results(lesson).await?;
        self.stored_or_computed(lesson, &results).await
    }

    /// # Errors
    ///
    /// Returns `MasteryServiceError::Storage` if the lesson cannot be loaded.
    pub async fn stats(&self, lesson: &LessonId) -> Result<MasteryStats, MasteryServiceError> {
        let results = self.results.list_results(lesson).await?;
        let fallback = self.results.get_mastery(lesson).await?.unwrap_or(0);
        Ok(MasteryStats::from_results(&results, fallback))
    }

    /// Mastery of every lesson with at least one attempt, ordered by lesson id.
    ///
    /// # Errors
    ///
    /// Returns `MasteryServiceError::Storage` if lessons cannot be loaded.
    pub async fn overview(&self) -> Result<Vec<MasteryRecord>, MasteryServiceError> {
        let lessons = self.results.list_lessons().await?;
        let mut records = Vec::with_capacity(lessons.len());
        for lesson_id in lessons {
            let mastery = self.mastery(&lesson_id).await?;
            records.push(MasteryRecord { lesson_id, mastery });
        }
        Ok(records)
    }

    async fn stored_or_computed(
        &self,
        lesson: &LessonId,
        results: &[QuizResult],
    ) -> Result<u8, MasteryServiceError> {
        let fallback = self.results.get_mastery(lesson).await?.unwrap_or(0);
        Ok(compute_mastery(results, fallback))
    }
}
