//! Duration literal grammar: a sum of `<number><unit>` terms, e.g. `1h30m`.
//!
//! Mirrors the unit lexicon of VAST's original Boost.Spirit duration
//! grammar, trimmed to the alias set the query language actually exposes.
//! Month and year are calendar approximations (30 and 365 days), not
//! derived from any particular calendar — a duration literal has no
//! reference date to anchor a real calendar computation against.

use crate::error::ExprError;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

fn unit_nanos(unit: &str) -> Option<i64> {
    Some(match unit {
        "ns" | "n" => 1,
        "us" | "mu" | "u" | "musec" => 1_000,
        "ms" => 1_000_000,
        "s" | "sec" => 1_000_000_000,
        "m" | "min" => 60 * 1_000_000_000,
        "h" | "hour" => 3_600 * 1_000_000_000,
        "d" | "day" => 86_400 * 1_000_000_000,
        "w" | "W" | "week" => 7 * 86_400 * 1_000_000_000,
        "mo" | "M" | "month" => 30 * 86_400 * 1_000_000_000,
        "y" | "Y" | "year" => 365 * 86_400 * 1_000_000_000,
        _ => return None,
    })
}

/// Parses a duration literal into nanoseconds, positive or negative.
///
/// A leading `-` negates the whole sum, the way a user expects `-1h30m` to
/// mean `-(1h + 30m)` rather than `-1h + 30m`.
pub fn parse_duration(input: &str) -> Result<i64, ExprError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ExprError::EmptyDuration);
    }
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let mut total: i64 = 0;
    let mut rest = rest;
    let mut consumed_any = false;
    while !rest.is_empty() {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let (number, after_number) = take_number(rest)?;
        let after_number = after_number.trim_start();
        let (unit, after_unit) = take_unit(after_number, input)?;
        let nanos_per_unit = unit_nanos(unit).ok_or_else(|| ExprError::UnknownUnit {
            unit: unit.to_string(),
        })?;
        let term_ns = if number.contains('.') {
            let value: f64 = number
                .parse()
                .map_err(|_| ExprError::InvalidDuration { text: input.to_string() })?;
            (value * nanos_per_unit as f64 / NANOS_PER_SEC * NANOS_PER_SEC) as i64
        } else {
            let value: i64 = number
                .parse()
                .map_err(|_| ExprError::InvalidDuration { text: input.to_string() })?;
            value * nanos_per_unit
        };
        total += term_ns;
        consumed_any = true;
        rest = after_unit;
    }
    if !consumed_any {
        return Err(ExprError::InvalidDuration { text: input.to_string() });
    }
    Ok(if negative { -total } else { total })
}

fn take_number(s: &str) -> Result<(&str, &str), ExprError> {
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        if c.is_ascii_digit() {
            end = i + c.len_utf8();
        } else if c == '.' && !seen_dot {
            seen_dot = true;
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    if end == 0 {
        return Err(ExprError::InvalidDuration { text: s.to_string() });
    }
    Ok((&s[..end], &s[end..]))
}

fn take_unit<'a>(s: &'a str, original: &str) -> Result<(&'a str, &'a str), ExprError> {
    let mut end = 0;
    for (i, c) in s.char_indices() {
        if c.is_ascii_alphabetic() {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    if end == 0 {
        return Err(ExprError::InvalidDuration { text: original.to_string() });
    }
    Ok((&s[..end], &s[end..]))
}
