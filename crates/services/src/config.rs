use std::env;

use chrono::{FixedOffset, Offset, Utc};
use tracker_core::calendar;
use tracker_core::model::WeekPolicy;
use tracker_core::term::{DEFAULT_TERM_WEEKS, TermCalendar};

use crate::error::ConfigError;

pub const DEFAULT_DB_URL: &str = "sqlite://tracker.sqlite3";

/// Runtime settings for the tracker services.
#[derive(Clone, Debug)]
pub struct TrackerConfig {
    pub db_url: String,
    /// Offset used to turn instants into calendar days.
    pub utc_offset: FixedOffset,
    pub week_policy: WeekPolicy,
    pub term_weeks: u8,
    /// `None` when no term is running.
    pub term: Option<TermCalendar>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            db_url: DEFAULT_DB_URL.into(),
            utc_offset: Utc.fix(),
            week_policy: WeekPolicy::default(),
            term_weeks: DEFAULT_TERM_WEEKS,
            term: None,
        }
    }
}

impl TrackerConfig {
    /// Read `TRACKER_*` variables from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup; unset or blank keys use defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(db_url) = get("TRACKER_DB_URL") {
            config.db_url = db_url.trim().to_owned();
        }

        if let Some(raw) = get("TRACKER_UTC_OFFSET_MINUTES") {
            let minutes: i32 = raw
                .trim()
                .parse()
                .map_err(|_| invalid("TRACKER_UTC_OFFSET_MINUTES", &raw))?;
            config.utc_offset = minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .ok_or_else(|| invalid("TRACKER_UTC_OFFSET_MINUTES", &raw))?;
        }

        // An explicitly empty value means "no rest days", so read it unfiltered.
        if let Some(raw) = lookup("TRACKER_REST_DAYS") {
            config.week_policy = raw
                .parse::<WeekPolicy>()
                .map_err(tracker_core::Error::from)?;
        }

        if let Some(raw) = get("TRACKER_TERM_WEEKS") {
            config.term_weeks = raw
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|weeks| *weeks > 0)
                .ok_or_else(|| invalid("TRACKER_TERM_WEEKS", &raw))?;
        }

        if let Some(raw) = get("TRACKER_TERM_START") {
            let start = calendar::parse_date_key(&raw).map_err(tracker_core::Error::from)?;
            let term =
                TermCalendar::new(start, config.term_weeks).map_err(tracker_core::Error::from)?;
            config.term = Some(term);
        }

        Ok(config)
    }
}

fn invalid(key: &'static str, raw: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        raw: raw.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Weekday};
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = TrackerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.db_url, DEFAULT_DB_URL);
        assert_eq!(config.utc_offset.local_minus_utc(), 0);
        assert_eq!(config.week_policy, WeekPolicy::default());
        assert_eq!(config.term_weeks, 11);
        assert!(config.term.is_none());
    }

    #[test]
    fn reads_all_variables() {
        let config = TrackerConfig::from_lookup(lookup(&[
            ("TRACKER_DB_URL", "sqlite::memory:"),
            ("TRACKER_UTC_OFFSET_MINUTES", "180"),
            ("TRACKER_REST_DAYS", "sat,sun"),
            ("TRACKER_TERM_WEEKS", "12"),
            ("TRACKER_TERM_START", "2024-01-07"),
        ]))
        .unwrap();

        assert_eq!(config.db_url, "sqlite::memory:");
        assert_eq!(config.utc_offset.local_minus_utc(), 180 * 60);
        assert!(config.week_policy.is_rest_day(Weekday::Sun));
        assert!(!config.week_policy.is_rest_day(Weekday::Fri));
        let term = config.term.unwrap();
        assert_eq!(term.start(), NaiveDate::from_ymd_opt(2024, 1, 7).unwrap());
        assert_eq!(term.total_weeks(), 12);
    }

    #[test]
    fn empty_rest_days_means_every_day_counts() {
        let config = TrackerConfig::from_lookup(lookup(&[("TRACKER_REST_DAYS", "")])).unwrap();
        assert_eq!(config.week_policy, WeekPolicy::every_day());
    }

    #[test]
    fn rejects_bad_values() {
        let err = TrackerConfig::from_lookup(lookup(&[("TRACKER_UTC_OFFSET_MINUTES", "east")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = TrackerConfig::from_lookup(lookup(&[("TRACKER_TERM_WEEKS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err =
            TrackerConfig::from_lookup(lookup(&[("TRACKER_REST_DAYS", "funday")])).unwrap_err();
        assert!(matches!(err, ConfigError::Core(_)));

        let err = TrackerConfig::from_lookup(lookup(&[("TRACKER_TERM_START", "next monday")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Core(_)));
    }
}
