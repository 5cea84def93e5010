//! Epoch timestamp normalization.
//!
//! History is keyed by the date and time-of-day a ping happened in the
//! local time zone of the process, not UTC, so the stored history reads
//! the way its owner lived it.

use chrono::{Local, TimeZone};

use crate::error::TimestampError;

/// Format of the date sub-key, e.g. `2023-11-14`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format of a time-of-day entry, e.g. `22-13-20`.
pub const TIME_FORMAT: &str = "%H-%M-%S";

/// A timestamp split into local date and time-of-day strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalStamp {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Time of day, `HH-MM-SS`.
    pub time: String,
}

/// Convert epoch seconds to a [`LocalStamp`] in the process's local time zone.
pub fn normalize(epoch_seconds: i64) -> Result<LocalStamp, TimestampError> {
    normalize_in(epoch_seconds, &Local)
}

/// Convert epoch seconds to a [`LocalStamp`] in an explicit time zone.
///
/// # Examples
///
/// ```
/// use chrono::FixedOffset;
/// use locbook_types::normalize_in;
///
/// let cet = FixedOffset::east_opt(3600).unwrap();
/// let stamp = normalize_in(1_700_000_000, &cet).unwrap();
/// assert_eq!(stamp.date, "2023-11-14");
/// assert_eq!(stamp.time, "23-13-20");
/// ```
pub fn normalize_in<Tz: TimeZone>(
    epoch_seconds: i64,
    tz: &Tz,
) -> Result<LocalStamp, TimestampError>
where
    Tz::Offset: core::fmt::Display,
{
    let dt = tz
        .timestamp_opt(epoch_seconds, 0)
        .single()
        .ok_or(TimestampError::OutOfRange(epoch_seconds))?;

    Ok(LocalStamp {
        date: dt.format(DATE_FORMAT).to_string(),
        time: dt.format(TIME_FORMAT).to_string(),
    })
}

/// Drop the millisecond part of an epoch-milliseconds value.
///
/// This truncates toward zero and never rounds: `1700000000999` maps to
/// `1700000000`, the same second as `1700000000123`.
#[must_use]
pub fn truncate_millis(millis: i64) -> i64 {
    millis / 1000
}
