use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate};
use storage::repository::StreakRepository;
use tracing::{debug, info};
use tracker_core::calendar;
use tracker_core::model::WeekPolicy;
use tracker_core::streak::{
    RolloverDecision, StreakAction, StreakState, StreakUpdate, evaluate_on_load,
    evaluate_rollover_reset,
};

use crate::Clock;
use crate::error::StreakServiceError;

/// Applies the streak rules to the persisted counters.
#[derive(Clone)]
pub struct StreakService {
    clock: Clock,
    utc_offset: FixedOffset,
    policy: WeekPolicy,
    streaks: Arc<dyn StreakRepository>,
}

impl StreakService {
    #[must_use]
    pub fn new(
        clock: Clock,
        utc_offset: FixedOffset,
        policy: WeekPolicy,
        streaks: Arc<dyn StreakRepository>,
    ) -> Self {
        Self {
            clock,
            utc_offset,
            policy,
            streaks,
        }
    }

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today(self.utc_offset)
    }

    #[must_use]
    pub fn policy(&self) -> &WeekPolicy {
        &self.policy
    }

    /// Current counters as stored.
    ///
    /// # Errors
    ///
    /// Returns `StreakServiceError::Storage` if the state cannot be loaded.
    pub async fn current(&self) -> Result<StreakState, StreakServiceError> {
        Ok(self.streaks.get_streak().await?)
    }

    /// Record that the user studied today.
    ///
    /// A second call on the same day is a no-op and writes nothing.
    ///
    /// # Errors
    ///
    /// Returns `StreakServiceError::Storage` if the state cannot be loaded or saved.
    pub async fn record_study_session(&self) -> Result<StreakUpdate, StreakServiceError> {
        let today = self.today();
        let state = self.streaks.get_streak().await?;
        let update = state.record_session(today, &self.policy);

        match update.action {
            StreakAction::Noop => {
                debug!(%today, "study session already recorded today");
                return Ok(update);
            }
            StreakAction::Extend => {
                info!(%today, streak = update.state.streak(), "streak extended");
            }
            StreakAction::Reset => {
                info!(
                    %today,
                    previous = state.streak(),
                    "streak restarted at 1"
                );
            }
        }
        if update.new_high() {
            info!(highest = update.state.highest_streak(), "new highest streak");
        }

        self.streaks.save_streak(&update.state).await?;
        Ok(update)
    }

    /// Day-boundary check for the day that just ended.
    ///
    /// Each boundary is evaluated once; repeated ticks for the same day hold.
    ///
    /// # Errors
    ///
    /// Returns `StreakServiceError::Storage` if the state cannot be loaded or saved.
    pub async fn handle_midnight_tick(&self) -> Result<RolloverDecision, StreakServiceError> {
        let yesterday = calendar::previous_day(self.today());
        if self.streaks.last_rollover().await? == Some(yesterday) {
            debug!(%yesterday, "rollover already evaluated");
            return Ok(RolloverDecision::Hold);
        }

        let state = self.streaks.get_streak().await?;
        let decision =
            evaluate_rollover_reset(state.last_study_date(), state.streak(), yesterday, &self.policy);

        if decision == RolloverDecision::Reset {
            info!(%yesterday, previous = state.streak(), "missed study day, streak reset");
            self.streaks.save_streak(&state.reset()).await?;
        } else {
            debug!(%yesterday, streak = state.streak(), "streak holds over boundary");
        }
        self.streaks.set_last_rollover(yesterday).await?;
        Ok(decision)
    }

    /// Start-up check covering any boundaries missed while the app was closed.
    ///
    /// # Errors
    ///
    /// Returns `StreakServiceError::Storage` if the state cannot be loaded or saved.
    pub async fn refresh_on_load(&self) -> Result<RolloverDecision, StreakServiceError> {
        let today = self.today();
        let state = self.streaks.get_streak().await?;
        let decision = evaluate_on_load(state.last_study_date(), state.streak(), today, &self.policy);

        if decision == RolloverDecision::Reset {
            info!(
                %today,
                last_study_date = ?state.last_study_date(),
                previous = state.streak(),
                "streak lapsed while away, reset"
            );
            self.streaks.save_streak(&state.reset()).await?;
        }
        Ok(decision)
    }
}
