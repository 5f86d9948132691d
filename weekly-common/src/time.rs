//! Show windows and week anchors
//!
//! The station publishes its tracklist in fixed slots (three hours by
//! default). A weekly playlist covers Sunday 00:00 up to the next Sunday.

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Timelike};
use std::fmt;

/// Default length of one show slot
pub const DEFAULT_SHOW_HOURS: u32 = 3;

/// One show slot: `[start, start + hours)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShowWindow {
    start: NaiveDateTime,
    hours: u32,
}

impl ShowWindow {
    pub fn new(start: NaiveDateTime, hours: u32) -> Self {
        Self {
            start,
            hours: hours.max(1),
        }
    }

    /// The slot containing `at`, with the hour floored to a multiple of `hours`
    pub fn containing(at: NaiveDateTime, hours: u32) -> Self {
        let hours = hours.max(1);
        let hour = (at.hour() / hours) * hours;
        let time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
        Self::new(at.date().and_time(time), hours)
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.start + Duration::hours(i64::from(self.hours))
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    /// The slot immediately before this one
    pub fn previous(&self) -> Self {
        Self::new(self.start - Duration::hours(i64::from(self.hours)), self.hours)
    }

    /// The slot immediately after this one
    pub fn next(&self) -> Self {
        Self::new(self.end(), self.hours)
    }

    /// Sunday 00:00 of the week this slot starts in
    pub fn week_start(&self) -> NaiveDateTime {
        last_sunday(self.start)
    }
}

impl fmt::Display for ShowWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (+{}h)", self.start.format("%Y-%m-%d %H:%M"), self.hours)
    }
}

/// Midnight of the most recent Sunday on or before `at`
pub fn last_sunday(at: NaiveDateTime) -> NaiveDateTime {
    let date = at.date();
    let back = i64::from(date.weekday().num_days_from_sunday());
    (date - Duration::days(back)).and_time(NaiveTime::MIN)
}
