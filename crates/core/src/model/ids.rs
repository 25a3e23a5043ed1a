use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for building a `LessonId` from user or storage input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonIdError {
    #[error("lesson id must not be empty")]
    Empty,
}

/// Identifier of a lesson or chapter that owns quiz results.
///
/// Ids are free-form strings chosen by the curriculum (e.g. `physics-ch3`),
/// trimmed and never empty.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LessonId(String);

impl LessonId {
    /// Creates a new `LessonId`.
    ///
    /// # Errors
    ///
    /// Returns `LessonIdError::Empty` if the trimmed value is empty.
    pub fn new(raw: impl Into<String>) -> Result<Self, LessonIdError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LessonIdError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LessonId({:?})", self.0)
    }
}

impl fmt::Display for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LessonId {
    type Err = LessonIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LessonId {
    type Error = LessonIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LessonId> for String {
    fn from(id: LessonId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lesson_id_is_trimmed() {
        let id: LessonId = "  physics-ch3 ".parse().unwrap();
        assert_eq!(id.as_str(), "physics-ch3");
        assert_eq!(id.to_string(), "physics-ch3");
    }

    #[test]
    fn blank_lesson_id_is_rejected() {
        assert_eq!("   ".parse::<LessonId>().unwrap_err(), LessonIdError::Empty);
        assert!(LessonId::new(String::new()).is_err());
    }
}
