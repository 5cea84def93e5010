//! Shared types for locbook.
//!
//! This crate holds the pieces every other locbook crate agrees on:
//!
//! - [`Bucket`]: a coordinate pair rounded to a fixed decimal precision,
//!   the spatial key of the location history
//! - [`LocalStamp`]: the `(date, time)` pair an epoch timestamp maps to in
//!   local time, the temporal sub-key
//! - [`Message`] / [`LocationEvent`]: inbound OwnTracks messages
//! - [`LocationRecord`]: one entry of a Google location-history export
//!
//! # Example
//!
//! ```
//! use locbook_types::{Bucket, normalize_in};
//! use chrono::FixedOffset;
//!
//! let bucket = Bucket::new(13.40495, 52.52003, 4);
//! assert_eq!(bucket.longitude(), 13.405);
//! assert_eq!(bucket.latitude(), 52.52);
//!
//! let utc = FixedOffset::east_opt(0).unwrap();
//! let stamp = normalize_in(1_700_000_000, &utc).unwrap();
//! assert_eq!(stamp.date, "2023-11-14");
//! assert_eq!(stamp.time, "22-13-20");
//! ```

pub mod bucket;
pub mod error;
pub mod message;
pub mod timestamp;

pub use bucket::{Bucket, bucket, round_to};
pub use error::{DecodeError, DecodeResult, TimestampError};
pub use message::{LocationEvent, LocationRecord, Message, TimestampMs};
pub use timestamp::{LocalStamp, normalize, normalize_in, truncate_millis};
