use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::model::WeekPolicy;

//
// ─── DECISIONS ─────────────────────────────────────────────────────────────────
//

/// What recording a study session today does to the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreakAction {
    /// A session was already recorded today.
    Noop,
    /// The streak continues and grows by one.
    Extend,
    /// The chain is broken; the new session starts a streak of one.
    Reset,
}

/// Outcome of a day-boundary (or start-up) check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RolloverDecision {
    Hold,
    Reset,
}

//
// ─── EVALUATORS ────────────────────────────────────────────────────────────────
//

/// Decide how a study session on `today` affects a streak last extended on `last`.
///
/// A streak survives a gap only when every skipped day is a rest day under
/// `policy`. A gap of exactly one calendar day is always a continuation.
///
/// # Examples
///
/// ```
/// # use chrono::NaiveDate;
/// # use tracker_core::model::WeekPolicy;
/// # use tracker_core::streak::{evaluate_continuation, StreakAction};
/// let thursday = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
/// let sunday = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
/// let action = evaluate_continuation(Some(thursday), sunday, &WeekPolicy::default());
/// assert_eq!(action, StreakAction::Extend);
/// ```
#[must_use]
pub fn evaluate_continuation(
    last: Option<NaiveDate>,
    today: NaiveDate,
    policy: &WeekPolicy,
) -> StreakAction {
    let Some(last) = last else {
        return StreakAction::Reset;
    };

    let gap = calendar::days_between(last, today);
    match gap {
        0 => StreakAction::Noop,
        1 => StreakAction::Extend,
        gap if gap > 1 && only_rest_days_between(last, today, policy) => StreakAction::Extend,
        _ => StreakAction::Reset,
    }
}

/// Decide at a day boundary whether the streak must be zeroed because
/// `yesterday` was a study day without a recorded session.
///
/// Calling this again with the same inputs after a reset is harmless: a zero
/// streak always holds.
#[must_use]
pub fn evaluate_rollover_reset(
    last: Option<NaiveDate>,
    streak: u32,
    yesterday: NaiveDate,
    policy: &WeekPolicy,
) -> RolloverDecision {
    if streak == 0 || policy.is_rest_date(yesterday) {
        return RolloverDecision::Hold;
    }
    match last {
        Some(last) if last >= yesterday => RolloverDecision::Hold,
        _ => RolloverDecision::Reset,
    }
}

/// Catch-up check for when no boundary checks ran, e.g. the app was closed
/// over several days. The streak holds if studying `today` would still
/// continue it.
#[must_use]
pub fn evaluate_on_load(
    last: Option<NaiveDate>,
    streak: u32,
    today: NaiveDate,
    policy: &WeekPolicy,
) -> RolloverDecision {
    if streak == 0 {
        return RolloverDecision::Hold;
    }
    match evaluate_continuation(last, today, policy) {
        StreakAction::Reset => RolloverDecision::Reset,
        StreakAction::Noop | StreakAction::Extend => RolloverDecision::Hold,
    }
}

fn only_rest_days_between(last: NaiveDate, today: NaiveDate, policy: &WeekPolicy) -> bool {
    calendar::days_strictly_between(last, today).all(|day| policy.is_rest_date(day))
}

//
// ─── STREAK STATE ──────────────────────────────────────────────────────────────
//

/// Persisted streak counters.
///
/// `last_study_date` only ever records days with a real session; resets keep it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakState {
    streak: u32,
    highest_streak: u32,
    last_study_date: Option<NaiveDate>,
}

impl StreakState {
    /// Rehydrate counters from storage, lifting `highest_streak` to at least `streak`.
    #[must_use]
    pub fn from_persisted(
        streak: u32,
        highest_streak: u32,
        last_study_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            streak,
            highest_streak: highest_streak.max(streak),
            last_study_date,
        }
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn highest_streak(&self) -> u32 {
        self.highest_streak
    }

    #[must_use]
    pub fn last_study_date(&self) -> Option<NaiveDate> {
        self.last_study_date
    }

    /// Apply a study session on `today`.
    #[must_use]
    pub fn record_session(&self, today: NaiveDate, policy: &WeekPolicy) -> StreakUpdate {
        let action = evaluate_continuation(self.last_study_date, today, policy);
        let state = match action {
            StreakAction::Noop => *self,
            StreakAction::Extend | StreakAction::Reset => {
                let streak = if action == StreakAction::Extend {
                    self.streak.saturating_add(1)
                } else {
                    1
                };
                Self {
                    streak,
                    highest_streak: self.highest_streak.max(streak),
                    last_study_date: Some(today),
                }
            }
        };

        StreakUpdate {
            action,
            previous: *self,
            state,
        }
    }

    /// Zero the running streak, keeping the high-water mark and last study day.
    #[must_use]
    pub fn reset(&self) -> Self {
        Self { streak: 0, ..*self }
    }
}

/// Result of [`StreakState::record_session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakUpdate {
    pub action: StreakAction,
    pub previous: StreakState,
    pub state: StreakState,
}

impl StreakUpdate {
    /// True when this session set a new highest streak.
    #[must_use]
    pub fn new_high(&self) -> bool {
        self.state.highest_streak > self.previous.highest_streak
    }

    #[must_use]
    pub fn changed(&self) -> bool {
        self.state != self.previous
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
