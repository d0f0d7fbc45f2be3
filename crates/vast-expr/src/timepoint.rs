//! Time-point literal grammar: `now[+/-delta]`, `@<duration>`, or an
//! ISO-like `YYYY[-MM[-DD[+HH[:MM[:SS]]]]]` stamp.
//!
//! Mirrors `vast::detail::parser::time_point`'s three alternatives,
//! including its unusual `+` separator between the date and the
//! time-of-day (rather than the more common `T`).

use chrono::NaiveDate;

use crate::duration::parse_duration;
use crate::error::ExprError;

/// Formats tried in order from most to least specific, exactly mirroring
/// the original grammar's `fmt0`..`fmt4` alternatives.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d+%H:%M:%S", "%Y-%m-%d+%H:%M", "%Y-%m-%d+%H"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y-%m"];

/// Nanoseconds since the Unix epoch for the current instant.
pub fn now_ns() -> i64 {
    let since_epoch = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    since_epoch.as_nanos() as i64
}

/// Parses a time-point literal into nanoseconds since the Unix epoch.
pub fn parse_time_point(input: &str) -> Result<i64, ExprError> {
    let trimmed = input.trim();
    if let Some(rest) = trimmed.strip_prefix("now") {
        return parse_now(rest, input);
    }
    if let Some(rest) = trimmed.strip_prefix('@') {
        return parse_duration(rest);
    }
    parse_iso(trimmed, input)
}

fn parse_now(rest: &str, original: &str) -> Result<i64, ExprError> {
    let rest = rest.trim_start();
    if rest.is_empty() {
        return Ok(now_ns());
    }
    let delta = parse_duration(rest).map_err(|_| ExprError::InvalidTimePoint {
        text: original.to_string(),
    })?;
    Ok(now_ns() + delta)
}

fn parse_iso(input: &str, original: &str) -> Result<i64, ExprError> {
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(input, fmt) {
            return Ok(dt.and_utc().timestamp_nanos_opt().unwrap_or(0));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(input, fmt) {
            let dt = date
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| ExprError::InvalidTimePoint { text: original.to_string() })?;
            return Ok(dt.and_utc().timestamp_nanos_opt().unwrap_or(0));
        }
    }
    Err(ExprError::InvalidTimePoint { text: original.to_string() })
}
