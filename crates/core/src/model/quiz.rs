use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors raised when recording a quiz attempt.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("{field} must be a finite number")]
    InvalidInput { field: &'static str },

    #[error("out_of must be positive, got {provided}")]
    InvalidOutOf { provided: f64 },
}

//
// ─── QUIZ RESULT ──────────────────────────────────────────────────────────────
//

/// One recorded quiz attempt for a lesson or chapter.
///
/// Attempts are immutable; a retake appends a new `QuizResult`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    score: f64,
    out_of: f64,
    date: DateTime<Utc>,
}

impl QuizResult {
    /// Validate a fresh submission.
    ///
    /// Negative scores are clamped to 0 and an `out_of` between 0 and 1 is
    /// raised to 1.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if either number is NaN or infinite
    /// - `InvalidOutOf` if `out_of <= 0`
    pub fn new(score: f64, out_of: f64, date: DateTime<Utc>) -> Result<Self, QuizError> {
        if !score.is_finite() {
            return Err(QuizError::InvalidInput { field: "score" });
        }
        if !out_of.is_finite() {
            return Err(QuizError::InvalidInput { field: "out_of" });
        }
        if out_of <= 0.0 {
            return Err(QuizError::InvalidOutOf { provided: out_of });
        }

        Ok(Self {
            score: score.max(0.0),
            out_of: out_of.max(1.0),
            date,
        })
    }

    /// Rehydrate an attempt from storage.
    ///
    /// Stored rows are taken as-is apart from the finiteness check; a
    /// non-positive `out_of` simply contributes nothing to mastery.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidInput` if either number is NaN or infinite.
    pub fn from_persisted(score: f64, out_of: f64, date: DateTime<Utc>) -> Result<Self, QuizError> {
        if !score.is_finite() {
            return Err(QuizError::InvalidInput { field: "score" });
        }
        if !out_of.is_finite() {
            return Err(QuizError::InvalidInput { field: "out_of" });
        }
        Ok(Self {
            score,
            out_of,
            date,
        })
    }

    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    #[must_use]
    pub fn out_of(&self) -> f64 {
        self.out_of
    }

    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Percentage for this attempt in `[0, 100]`; 0 when `out_of` is not positive.
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.out_of > 0.0 {
            (self.score * 100.0 / self.out_of).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn clamps_negative_score_and_small_out_of() {
        let result = QuizResult::new(-3.0, 0.5, fixed_now()).unwrap();
        assert_eq!(result.score(), 0.0);
        assert_eq!(result.out_of(), 1.0);
    }

    #[test]
    fn rejects_non_positive_out_of() {
        let err = QuizResult::new(5.0, 0.0, fixed_now()).unwrap_err();
        assert!(matches!(err, QuizError::InvalidOutOf { .. }));
        assert!(QuizResult::new(5.0, -10.0, fixed_now()).is_err());
    }

    #[test]
    fn rejects_non_finite_numbers() {
        let err = QuizResult::new(f64::NAN, 10.0, fixed_now()).unwrap_err();
        assert_eq!(err, QuizError::InvalidInput { field: "score" });
        let err = QuizResult::new(1.0, f64::INFINITY, fixed_now()).unwrap_err();
        assert_eq!(err, QuizError::InvalidInput { field: "out_of" });
    }

    #[test]
    fn percent_is_capped_and_safe_for_zero_denominator() {
        let over = QuizResult::new(12.0, 10.0, fixed_now()).unwrap();
        assert_eq!(over.percent(), 100.0);

        let seven = QuizResult::new(7.0, 10.0, fixed_now()).unwrap();
        assert_eq!(seven.percent(), 70.0);

        let broken = QuizResult::from_persisted(4.0, 0.0, fixed_now()).unwrap();
        assert_eq!(broken.percent(), 0.0);
    }
}
