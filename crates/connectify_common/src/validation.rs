//! Request boundary checks shared by the HTTP handlers.
//!
//! The engines accept any value; only the handlers reject malformed input.

use chrono::{NaiveDate, NaiveTime};
use std::ops::RangeInclusive;

use crate::error::{validation_error, ConnectifyError};
use crate::models::hhmm;

/// Accepted meeting durations in minutes.
pub const DURATION_RANGE: RangeInclusive<u32> = 15..=480;
/// Accepted number of suggested slots.
pub const SLOT_COUNT_RANGE: RangeInclusive<usize> = 1..=10;

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ConnectifyError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| validation_error(format!("Invalid {} format (YYYY-MM-DD): '{}'", field, raw)))
}

/// Parses an `HH:MM` wall-clock time.
pub fn parse_time(field: &str, raw: &str) -> Result<NaiveTime, ConnectifyError> {
    hhmm::parse(raw.trim())
        .map_err(|_| validation_error(format!("Invalid {} format (HH:MM): '{}'", field, raw)))
}

pub fn check_duration(duration_minutes: u32) -> Result<u32, ConnectifyError> {
    if DURATION_RANGE.contains(&duration_minutes) {
        Ok(duration_minutes)
    } else {
        Err(validation_error(format!(
            "duration must be between {} and {} minutes, got {}",
            DURATION_RANGE.start(),
            DURATION_RANGE.end(),
            duration_minutes
        )))
    }
}

pub fn check_slot_count(slot_count: usize) -> Result<usize, ConnectifyError> {
    if SLOT_COUNT_RANGE.contains(&slot_count) {
        Ok(slot_count)
    } else {
        Err(validation_error(format!(
            "slot_count must be between {} and {}, got {}",
            SLOT_COUNT_RANGE.start(),
            SLOT_COUNT_RANGE.end(),
            slot_count
        )))
    }
}

/// Rejects blank user ids and returns the trimmed value.
pub fn require_user_id(raw: &str) -> Result<&str, ConnectifyError> {
    let user_id = raw.trim();
    if user_id.is_empty() {
        Err(validation_error("user_id must not be empty"))
    } else {
        Ok(user_id)
    }
}
