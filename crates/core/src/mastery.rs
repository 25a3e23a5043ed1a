use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{LessonId, QuizError, QuizResult};

/// Highest mastery a lesson can reach.
pub const MAX_MASTERY: u8 = 100;

/// Roll quiz attempts up into a mastery score in `[0, 100]`.
///
/// Mastery is cumulative: the per-attempt percentages are summed and divided
/// by ten, so ten perfect attempts are needed to reach 100. With no attempts
/// the caller's `fallback` (usually the previously stored value) is returned
/// so missing data never wipes an earlier score.
///
/// `fallback` should be a value this function produced earlier for the same
/// lesson. Mastery is monotone only along one attempt history; a fallback
/// with no attempts behind it is not a floor for the first computed value.
///
/// # Examples
///
/// ```
/// # use tracker_core::mastery::compute_mastery;
/// # use tracker_core::model::QuizResult;
/// let now = chrono::Utc::now();
/// let results = vec![
///     QuizResult::new(8.0, 10.0, now)?,
///     QuizResult::new(9.0, 10.0, now)?,
///     QuizResult::new(10.0, 10.0, now)?,
/// ];
/// assert_eq!(compute_mastery(&results, 0), 27);
/// # Ok::<(), tracker_core::model::QuizError>(())
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn compute_mastery(results: &[QuizResult], fallback: u8) -> u8 {
    if results.is_empty() {
        return fallback.min(MAX_MASTERY);
    }
    let sum: f64 = results.iter().map(QuizResult::percent).sum();
    (sum / 10.0).floor().clamp(0.0, f64::from(MAX_MASTERY)) as u8
}

/// Append a new attempt, returning the extended list.
///
/// # Errors
///
/// Returns `QuizError` if the score or denominator is invalid; see [`QuizResult::new`].
pub fn record_quiz_result(
    existing: &[QuizResult],
    score: f64,
    out_of: f64,
    now: DateTime<Utc>,
) -> Result<Vec<QuizResult>, QuizError> {
    let result = QuizResult::new(score, out_of, now)?;
    let mut next = Vec::with_capacity(existing.len() + 1);
    next.extend_from_slice(existing);
    next.push(result);
    Ok(next)
}

//
// ─── TIERS ─────────────────────────────────────────────────────────────────────
//

/// Display tier for a mastery score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MasteryTier {
    None,
    Partial,
    Complete,
}

impl MasteryTier {
    #[must_use]
    pub fn from_mastery(mastery: u8) -> Self {
        match mastery {
            0 => Self::None,
            m if m >= MAX_MASTERY => Self::Complete,
            _ => Self::Partial,
        }
    }
}

/// Mastery before and after an attempt was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasteryChange {
    pub previous: u8,
    pub current: u8,
}

impl MasteryChange {
    #[must_use]
    pub fn new(previous: u8, current: u8) -> Self {
        Self { previous, current }
    }

    #[must_use]
    pub fn previous_tier(&self) -> MasteryTier {
        MasteryTier::from_mastery(self.previous)
    }

    #[must_use]
    pub fn current_tier(&self) -> MasteryTier {
        MasteryTier::from_mastery(self.current)
    }

    /// True only on the transition into the complete tier.
    #[must_use]
    pub fn reached_complete(&self) -> bool {
        self.previous_tier() != MasteryTier::Complete
            && self.current_tier() == MasteryTier::Complete
    }
}

//
// ─── SUMMARIES ─────────────────────────────────────────────────────────────────
//

/// Mastery of one lesson, derived on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasteryRecord {
    pub lesson_id: LessonId,
    pub mastery: u8,
}

/// Aggregate quiz statistics for a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasteryStats {
    pub mastery: u8,
    pub quizzes_taken: usize,
    /// Mean attempt percentage, rounded; 0 when no quizzes were taken.
    pub average_percent: u8,
}

impl MasteryStats {
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn from_results(results: &[QuizResult], fallback: u8) -> Self {
        let quizzes_taken = results.len();
        let average_percent = if quizzes_taken == 0 {
            0
        } else {
            let sum: f64 = results.iter().map(QuizResult::percent).sum();
            (sum / quizzes_taken as f64).round().clamp(0.0, 100.0) as u8
        };
        Self {
            mastery: compute_mastery(results, fallback),
            quizzes_taken,
            average_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn result(score: f64, out_of: f64) -> QuizResult {
        QuizResult::new(score, out_of, fixed_now()).unwrap()
    }

    #[test]
    fn sums_percentages_then_divides_by_ten() {
        let results = vec![result(8.0, 10.0), result(9.0, 10.0), result(10.0, 10.0)];
        assert_eq!(compute_mastery(&results, 0), 27);
    }

    #[test]
    fn perfect_attempts_reach_the_boundary() {
        let nine = vec![result(100.0, 100.0); 9];
        assert_eq!(compute_mastery(&nine, 0), 90);

        let ten = vec![result(100.0, 100.0); 10];
        assert_eq!(compute_mastery(&ten, 0), 100);

        let twelve = vec![result(100.0, 100.0); 12];
        assert_eq!(compute_mastery(&twelve, 0), 100);
    }

    #[test]
    fn floors_fractional_totals() {
        // 2/3 = 66.67% -> 6.67 -> 6
        assert_eq!(compute_mastery(&[result(2.0, 3.0)], 0), 6);
    }

    #[test]
    fn empty_history_keeps_fallback() {
        assert_eq!(compute_mastery(&[], 42), 42);
        assert_eq!(compute_mastery(&[], 0), 0);
        assert_eq!(compute_mastery(&[], 250), 100);
    }

    #[test]
    fn zero_denominator_contributes_nothing() {
        let broken = QuizResult::from_persisted(5.0, 0.0, fixed_now()).unwrap();
        assert_eq!(compute_mastery(&[broken, result(10.0, 10.0)], 0), 10);
    }

    #[test]
    fn appending_never_lowers_mastery() {
        let scores = [0.0, 3.0, 10.0, 7.5, 0.0, 4.0, 10.0, 9.0, 1.0, 10.0, 6.0];
        let mut results: Vec<QuizResult> = Vec::new();
        let mut previous = 0;
        for score in scores {
            results = record_quiz_result(&results, score, 10.0, fixed_now()).unwrap();
            let current = compute_mastery(&results, 0);
            assert!(current >= previous, "{current} < {previous}");
            previous = current;
        }
    }

    #[test]
    fn record_appends_without_touching_input() {
        let existing = vec![result(5.0, 10.0)];
        let next = record_quiz_result(&existing, 10.0, 10.0, fixed_now()).unwrap();
        assert_eq!(existing.len(), 1);
        assert_eq!(next.len(), 2);
        assert_eq!(next[1].score(), 10.0);
        assert_eq!(compute_mastery(&existing, 0), 5);
        assert_eq!(compute_mastery(&next, 0), 15);
    }

    #[test]
    fn record_clamps_and_rejects() {
        let next = record_quiz_result(&[], -4.0, 10.0, fixed_now()).unwrap();
        assert_eq!(next[0].score(), 0.0);

        let err = record_quiz_result(&[], 4.0, 0.0, fixed_now()).unwrap_err();
        assert!(matches!(err, QuizError::InvalidOutOf { .. }));
    }

    #[test]
    fn tiers_follow_mastery() {
        assert_eq!(MasteryTier::from_mastery(0), MasteryTier::None);
        assert_eq!(MasteryTier::from_mastery(1), MasteryTier::Partial);
        assert_eq!(MasteryTier::from_mastery(99), MasteryTier::Partial);
        assert_eq!(MasteryTier::from_mastery(100), MasteryTier::Complete);
    }

    #[test]
    fn completion_fires_once_per_crossing() {
        assert!(MasteryChange::new(90, 100).reached_complete());
        assert!(MasteryChange::new(0, 100).reached_complete());
        assert!(!MasteryChange::new(100, 100).reached_complete());
        assert!(!MasteryChange::new(80, 90).reached_complete());
    }

    #[test]
    fn stats_report_average_attempt() {
        let results = vec![result(8.0, 10.0), result(9.0, 10.0), result(10.0, 10.0)];
        let stats = MasteryStats::from_results(&results, 0);
        assert_eq!(stats.mastery, 27);
        assert_eq!(stats.quizzes_taken, 3);
        assert_eq!(stats.average_percent, 90);

        let empty = MasteryStats::from_results(&[], 12);
        assert_eq!(empty.mastery, 12);
        assert_eq!(empty.average_percent, 0);
    }
}
