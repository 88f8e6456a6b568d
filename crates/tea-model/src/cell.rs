//! Cell serialization.
//!
//! Every cell travels as a string regardless of the column's declared value
//! type. The functions here turn raw stored values into that canonical text
//! and compare canonical cells in a type-aware way.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::{ModelError, ValueType};

/// A row is an ordered list of cells aligned with the response headers.
pub type Row = Vec<String>;

/// Cell text for "no value".
pub const EMPTY_CELL: &str = "";

const TIMESTAMP_SECONDS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TIMESTAMP_SECONDS_WIDTH: usize = "yyyy-MM-dd HH:mm:ss".len();

const RAW_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Render a stored value as cell text for a column of `value_type`.
///
/// Empty input stays empty. Values that cannot be read as the declared type
/// are rejected rather than passed through.
pub fn render_cell(value_type: ValueType, raw: &str) -> Result<String, ModelError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    let invalid = || ModelError::InvalidCellValue {
        value_type,
        value: raw.to_string(),
    };
    if value_type.is_integer() {
        let parsed = trimmed
            .parse::<i64>()
            .or_else(|_| parse_integral_float(trimmed))
            .map_err(|_| invalid())?;
        return Ok(parsed.to_string());
    }
    if value_type.is_numeric() {
        let parsed = trimmed.parse::<f64>().map_err(|_| invalid())?;
        if !parsed.is_finite() {
            return Err(invalid());
        }
        return Ok(format_number(parsed));
    }
    if value_type.is_boolean() {
        return parse_boolean(trimmed).map(format_boolean).ok_or_else(invalid);
    }
    if value_type.is_temporal() {
        return parse_timestamp(trimmed)
            .map(format_timestamp)
            .ok_or_else(invalid);
    }
    Ok(trimmed.to_string())
}

fn parse_integral_float(value: &str) -> Result<i64, ()> {
    let parsed = value.parse::<f64>().map_err(|_| ())?;
    if parsed.fract() == 0.0 && parsed.abs() < i64::MAX as f64 {
        Ok(parsed as i64)
    } else {
        Err(())
    }
}

/// Decimal text for a double: integral values keep one fractional digit.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

pub fn format_boolean(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

pub fn parse_boolean(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// `yyyy-MM-dd HH:mm:ss.SSS` with trailing zeros of the fraction removed,
/// keeping at least one digit: `2022-12-29 00:00:00.0`, `2017-01-20 10:44:02.77`.
pub fn format_timestamp(value: NaiveDateTime) -> String {
    let base = value.format(TIMESTAMP_SECONDS_FORMAT).to_string();
    let millis = value.nanosecond() / 1_000_000 % 1000;
    let fraction = format!("{millis:03}");
    let fraction = match fraction.trim_end_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };
    format!("{base}.{fraction}")
}

/// Parse a stored date or date-time value.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    for format in RAW_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(value, TIMESTAMP_SECONDS_FORMAT) {
        return Some(parsed);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Returns true if `cell` is a well-formed rendering for `value_type`.
pub fn is_well_formed(value_type: ValueType, cell: &str) -> bool {
    if cell.is_empty() {
        return true;
    }
    if value_type.is_integer() {
        return cell.parse::<i64>().is_ok();
    }
    if value_type.is_numeric() {
        return cell.parse::<f64>().is_ok_and(f64::is_finite);
    }
    if value_type.is_boolean() {
        return parse_boolean(cell).is_some();
    }
    if value_type.is_temporal() {
        return is_timestamp_cell(cell);
    }
    true
}

/// `yyyy-MM-dd HH:mm:ss` with an optional fraction of one to three digits.
fn is_timestamp_cell(cell: &str) -> bool {
    let (seconds, fraction) = match cell.split_once('.') {
        Some((seconds, fraction)) => (seconds, Some(fraction)),
        None => (cell, None),
    };
    let fraction_ok = fraction.is_none_or(|fraction| {
        (1..=3).contains(&fraction.len()) && fraction.bytes().all(|b| b.is_ascii_digit())
    });
    fraction_ok
        && seconds.len() == TIMESTAMP_SECONDS_WIDTH
        && NaiveDateTime::parse_from_str(seconds, TIMESTAMP_SECONDS_FORMAT).is_ok()
}

/// Compare two non-empty cells of the same column.
///
/// Numeric columns compare numerically, temporal columns chronologically and
/// everything else by text. Cells that do not parse fall back to text order.
pub fn compare_cells(value_type: ValueType, left: &str, right: &str) -> Ordering {
    if value_type.is_numeric()
        && let (Ok(a), Ok(b)) = (left.parse::<f64>(), right.parse::<f64>())
    {
        return a.total_cmp(&b);
    }
    if value_type.is_boolean()
        && let (Some(a), Some(b)) = (parse_boolean(left), parse_boolean(right))
    {
        return a.cmp(&b);
    }
    if value_type.is_temporal()
        && let (Some(a), Some(b)) = (parse_timestamp(left), parse_timestamp(right))
    {
        return a.cmp(&b);
    }
    left.cmp(right)
}
