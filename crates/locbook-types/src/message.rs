//! Inbound message and import record types.
//!
//! Validation happens once, here, while decoding. Downstream code receives
//! typed values it never has to re-check.

use serde::Deserialize;

use crate::error::{DecodeError, DecodeResult};
use crate::timestamp::truncate_millis;

/// Fixed-point scale of `latitudeE7` / `longitudeE7` fields.
pub const E7_SCALE: f64 = 10_000_000.0;

/// An inbound OwnTracks message, discriminated by its `_type` field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "_type")]
pub enum Message {
    /// A location report; the only message that updates history.
    #[serde(rename = "location")]
    Location(LocationEvent),
    /// Any other message type (`transition`, `waypoint`, `lwt`, ...).
    #[serde(other)]
    Other,
}

impl Message {
    /// Decode and validate a raw JSON payload.
    ///
    /// # Examples
    ///
    /// ```
    /// use locbook_types::Message;
    ///
    /// let raw = br#"{"_type":"location","lon":13.4,"lat":52.5,"tst":1700000000,"tid":"ph"}"#;
    /// assert!(matches!(Message::decode(raw), Ok(Message::Location(_))));
    ///
    /// let raw = br#"{"_type":"transition","event":"enter"}"#;
    /// assert_eq!(Message::decode(raw).unwrap(), Message::Other);
    /// ```
    pub fn decode(raw: &[u8]) -> DecodeResult<Self> {
        let message: Message = serde_json::from_slice(raw)?;
        if let Message::Location(event) = &message {
            event.validate()?;
        }
        Ok(message)
    }
}

/// A location report from a tracking device.
///
/// Only the fields history needs are decoded; everything else the client
/// sends (accuracy, battery, ...) is ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocationEvent {
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
    /// Epoch seconds of the fix.
    pub tst: i64,
    /// Tracker id of the reporting device.
    pub tid: String,
}

impl LocationEvent {
    fn validate(&self) -> DecodeResult<()> {
        check_range("lon", self.lon, 180.0)?;
        check_range("lat", self.lat, 90.0)
    }
}

fn check_range(field: &'static str, value: f64, limit: f64) -> DecodeResult<()> {
    if value.is_finite() && value.abs() <= limit {
        Ok(())
    } else {
        Err(DecodeError::OutOfRange { field, value })
    }
}

/// One entry of the `locations` array in a Google location-history export.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    /// Longitude in degrees × 10^7.
    pub longitude_e7: i64,
    /// Latitude in degrees × 10^7.
    pub latitude_e7: i64,
    /// Epoch milliseconds, as a string in older exports or a number.
    pub timestamp_ms: TimestampMs,
}

impl LocationRecord {
    /// Longitude in degrees.
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude_e7 as f64 / E7_SCALE
    }

    /// Latitude in degrees.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude_e7 as f64 / E7_SCALE
    }

    /// Epoch seconds, with the milliseconds truncated away.
    pub fn epoch_seconds(&self) -> DecodeResult<i64> {
        self.timestamp_ms.millis().map(truncate_millis)
    }
}

/// Epoch milliseconds, which exports write either as text or as a number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TimestampMs {
    Number(i64),
    Text(String),
}

impl TimestampMs {
    /// The value as integer milliseconds.
    pub fn millis(&self) -> DecodeResult<i64> {
        match self {
            TimestampMs::Number(ms) => Ok(*ms),
            TimestampMs::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| DecodeError::InvalidTimestamp(text.clone())),
        }
    }
}
