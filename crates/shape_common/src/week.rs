//! Calendar helpers: ISO week ids and week windows.
//!
//! The grace budget, weekly quests and the weekly plan all key off the ISO
//! week, so everything date-window related lives here.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// ISO week identifier, e.g. "2026-W35".
pub fn week_id(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as i64;
    date - Duration::days(offset)
}

/// Sunday of the week containing `date`.
pub fn week_end(date: NaiveDate) -> NaiveDate {
    week_start(date) + Duration::days(6)
}

pub fn yesterday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(1)
}
