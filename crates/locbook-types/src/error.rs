//! Error types for locbook-types.

use thiserror::Error;

/// Errors that can occur when decoding an inbound event or import record.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The payload is not valid JSON or lacks a required field.
    #[error("Malformed event: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A coordinate is not finite or outside its valid range.
    #[error("Coordinate out of range: {field} = {value}")]
    OutOfRange { field: &'static str, value: f64 },

    /// A millisecond timestamp could not be parsed as an integer.
    #[error("Invalid timestamp: {0:?}")]
    InvalidTimestamp(String),
}

/// Result type alias using locbook-types' DecodeError type.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Errors from converting an epoch timestamp to local time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TimestampError {
    /// The epoch value cannot be represented as a calendar date.
    #[error("Timestamp {0} is outside the representable range")]
    OutOfRange(i64),
}
