//! Best-effort conversion of sheet cells into typed values.
//!
//! A cell that does not hold what its column declares is never an error: numbers are retried with
//! a lenient parse and then fall back to zero. The nursery keeps working with a slightly wrong
//! sheet rather than refusing to open it.

use crate::model::Amount;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Parses a decimal cell. Tries a strict parse first, then the lenient `Amount` parse, then gives
/// up and returns zero.
pub(crate) fn decimal(value: &str) -> Decimal {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }
    if let Ok(d) = Decimal::from_str(trimmed) {
        return d;
    }
    match Amount::from_str(trimmed) {
        Ok(a) => a.value(),
        Err(e) => {
            debug!("Treating unparseable decimal cell '{value}' as zero: {e}");
            Decimal::ZERO
        }
    }
}

/// Parses a monetary cell, see `decimal`.
pub(crate) fn amount(value: &str) -> Amount {
    Amount::new(decimal(value))
}

/// Parses a non-negative integer cell. Integer-valued decimals such as `3.0` are accepted, anything
/// else becomes zero.
pub(crate) fn quantity(value: &str) -> u32 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return 0;
    }
    if let Ok(q) = trimmed.parse::<u32>() {
        return q;
    }
    let d = decimal(trimmed);
    if d.is_sign_negative() || d.fract() != Decimal::ZERO {
        debug!("Treating quantity cell '{value}' as zero");
        return 0;
    }
    d.to_u32().unwrap_or_default()
}

/// Parses a date cell in any of the layouts people or spreadsheet programs produce. Returns `None`
/// when nothing matches.
pub(crate) fn date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(trimmed, f).ok())
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(trimmed, f).ok())
                .map(|dt| dt.date())
        })
}
