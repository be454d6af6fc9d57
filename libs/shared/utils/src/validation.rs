//! Shared field validators. Every cell routes its input checks through this
//! module instead of re-deriving patterns per call-site.

use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

use shared_models::AppError;

fn time_of_day_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([01]?[0-9]|2[0-3]):[0-5][0-9](:[0-5][0-9])?$").unwrap()
    })
}

/// Parse a wire time-of-day value. Accepts `HH:MM` and `HH:MM:SS`; anything
/// failing the pattern is a `Format` rejection before any comparison runs.
pub fn time_of_day(raw: &str) -> Result<NaiveTime, AppError> {
    if !time_of_day_pattern().is_match(raw) {
        return Err(AppError::Format(format!(
            "'{raw}' is not a valid time of day (expected HH:MM or HH:MM:SS)"
        )));
    }
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| AppError::Format(format!("'{raw}' is not a valid time of day")))
}

pub fn time_range(start: NaiveTime, end: NaiveTime) -> Result<(), AppError> {
    if start >= end {
        return Err(AppError::validation(format!(
            "start time {start} must be before end time {end}"
        )));
    }
    Ok(())
}

pub fn date_range(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if start >= end {
        return Err(AppError::validation(format!(
            "start date {start} must be before end date {end}"
        )));
    }
    Ok(())
}

pub fn positive_id(id: i64, field: &str) -> Result<(), AppError> {
    if id <= 0 {
        return Err(AppError::validation(format!(
            "{field} must be a positive identifier, got {id}"
        )));
    }
    Ok(())
}

/// Day of week is ISO-8601: 1 = Monday .. 7 = Sunday.
pub fn day_of_week(day: u8) -> Result<(), AppError> {
    if !(1..=7).contains(&day) {
        return Err(AppError::validation(format!(
            "day_of_week must be between 1 (Monday) and 7 (Sunday), got {day}"
        )));
    }
    Ok(())
}

pub fn non_empty(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Parse a state/kind tag against its enum. Used for every enum field that
/// crosses the boundary as a string.
pub fn state_tag<T: FromStr>(raw: &str, field: &str) -> Result<T, AppError> {
    raw.parse::<T>().map_err(|_| {
        AppError::validation(format!("{field} has no state named '{raw}'"))
    })
}
