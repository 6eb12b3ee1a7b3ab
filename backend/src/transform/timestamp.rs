//! Start timestamp parsing.
//!
//! Cleaned start timestamps look like `7/14/2024 09:30:00` (24-hour clock).
//! Anything that does not match becomes [`SessionDate::Unparseable`]; this
//! never fails.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};

use crate::models::SessionDate;

/// `month/day/year hour:minute:second`; single-digit fields are accepted.
pub const START_TIME_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Derive the session date from a cleaned start timestamp.
pub fn parse_session_date(start_time: &str) -> SessionDate {
    match NaiveDateTime::parse_from_str(start_time, START_TIME_FORMAT) {
        Ok(dt) => SessionDate::Day(dt.date()),
        Err(_) => SessionDate::Unparseable,
    }
}

/// English weekday name (proleptic Gregorian), independent of locale.
pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
