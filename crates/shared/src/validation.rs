//! Common validation utilities.

use chrono::{NaiveDate, NaiveTime};
use validator::ValidationError;

/// Parses a 24h `HH:MM` time of day.
///
/// Single-digit hours and seconds components are rejected so that the stored
/// representation is always exactly five characters.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, ValidationError> {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return Err(time_format_error());
    }
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| time_format_error())
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    if value.len() != 10 {
        return Err(date_format_error());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| date_format_error())
}

/// Validates that a string is a 24h `HH:MM` time of day.
pub fn validate_time_of_day(value: &str) -> Result<(), ValidationError> {
    parse_time_of_day(value).map(|_| ())
}

/// Validates that a string is a `YYYY-MM-DD` calendar date.
pub fn validate_date(value: &str) -> Result<(), ValidationError> {
    parse_date(value).map(|_| ())
}

/// Validates that a duration in minutes is strictly positive.
pub fn validate_positive_minutes(minutes: u32) -> Result<(), ValidationError> {
    if minutes > 0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("minutes_range");
        err.message = Some("Duration must be at least one minute".into());
        Err(err)
    }
}

fn time_format_error() -> ValidationError {
    let mut err = ValidationError::new("time_format");
    err.message = Some("Time must use the 24h HH:MM format".into());
    err
}

fn date_format_error() -> ValidationError {
    let mut err = ValidationError::new("date_format");
    err.message = Some("Date must use the YYYY-MM-DD format".into());
    err
}
