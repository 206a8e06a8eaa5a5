//! Normalization of spreadsheet date and numeric cells.
//!
//! The export writes missing values as empty cells or the literal `NaN`/`NaT`
//! sentinels, and occasionally leaves free text in date columns. Both helpers
//! recover locally: dates collapse to `None`, numerics fall back to the
//! caller-supplied default. Zero is a valid numeric value, never a sentinel.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

fn is_missing(value: &str) -> bool {
    value.is_empty()
        || value.eq_ignore_ascii_case("nan")
        || value.eq_ignore_ascii_case("nat")
        || value.eq_ignore_ascii_case("null")
}

/// Parses an optional date cell. Sentinels and unparseable text yield `None`.
pub fn optional_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if is_missing(value) {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return Some(parsed);
        }
    }
    // Some exports carry full timestamps in date columns.
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(parsed.date());
        }
    }
    None
}

/// Parses a numeric cell, substituting `default` for missing or garbage input.
pub fn decimal_or(raw: &str, default: Decimal) -> Decimal {
    let value = raw.trim();
    if is_missing(value) {
        return default;
    }
    let cleaned = value.replace(',', "");
    cleaned.parse::<Decimal>().unwrap_or(default)
}

/// Shorthand for the common zero-default case used by the wide-column groups.
pub fn decimal_or_zero(raw: &str) -> Decimal {
    decimal_or(raw, Decimal::ZERO)
}

pub fn optional_decimal(raw: &str) -> Option<Decimal> {
    let value = raw.trim();
    if is_missing(value) {
        return None;
    }
    value.replace(',', "").parse::<Decimal>().ok()
}

pub fn optional_i64(raw: &str) -> Option<i64> {
    let value = raw.trim();
    if is_missing(value) {
        return None;
    }
    value
        .parse::<i64>()
        .ok()
        .or_else(|| value.parse::<f64>().ok().map(|f| f as i64))
}

pub fn optional_f64(raw: &str) -> Option<f64> {
    let value = raw.trim();
    if is_missing(value) {
        return None;
    }
    value.replace(',', "").parse::<f64>().ok()
}
