//! Raw (start, end) validation.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;

/// Why a row produced no counted time.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowError {
    /// Start or end is missing.
    #[error("start or end is empty")]
    EmptyInput,

    /// A timestamp could not be parsed, or the row could not be computed.
    #[error("unrecognized timestamp")]
    FormatError,

    /// Start is not strictly before end.
    #[error("start is not before end")]
    InvertedOrder,
}

/// Datetime layouts accepted from spreadsheet cells.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
];

/// Date-only layouts, read as midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parses a single timestamp cell. Surrounding whitespace is ignored.
pub fn parse_instant(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .map(|date| date.and_time(chrono::NaiveTime::MIN))
        })
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.trim().is_empty())
}

/// Validates a raw pair into an ordered instant pair.
///
/// Missing values win over unparseable ones, which win over ordering.
pub fn normalize(
    raw_start: Option<&str>,
    raw_end: Option<&str>,
) -> Result<(NaiveDateTime, NaiveDateTime), RowError> {
    let (Some(raw_start), Some(raw_end)) = (present(raw_start), present(raw_end)) else {
        return Err(RowError::EmptyInput);
    };

    let (Some(start), Some(end)) = (parse_instant(raw_start), parse_instant(raw_end)) else {
        return Err(RowError::FormatError);
    };

    if start >= end {
        return Err(RowError::InvertedOrder);
    }

    Ok((start, end))
}
