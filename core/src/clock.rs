//! Scheduling clock: owns the notion of "today".
//!
//! Attendance windows, the workload forecast and the attendance-marking
//! guard all read the date from here rather than from the system clock.

use chrono::{Datelike, Duration, Local, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedClock {
    /// Follow the local system date.
    System,
    /// Pin "today" to a fixed date (tests, replays).
    Fixed(NaiveDate),
}

impl SchedClock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Self::System => Local::now().date_naive(),
            Self::Fixed(date) => *date,
        }
    }
}

/// Sunday on or before `date`.
pub fn week_start_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}
