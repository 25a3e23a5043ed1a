#![forbid(unsafe_code)]

pub mod calendar;
pub mod error;
pub mod hours;
pub mod mastery;
pub mod model;
pub mod schedule;
pub mod streak;
pub mod term;
pub mod time;

pub use error::Error;
pub use time::Clock;
