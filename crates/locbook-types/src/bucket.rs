//! Coordinate bucketing.
//!
//! A [`Bucket`] is a `(longitude, latitude)` pair rounded to a fixed number
//! of decimal places. Two raw points that round to the same bucket are
//! treated as the same physical location.
//!
//! # Rounding rule
//!
//! Each coordinate is multiplied by `10^precision`, rounded with
//! [`f64::round`] (half away from zero) and divided back. The scaled value
//! decides ties, so `13.40495` becomes `13.405` at precision 4 even though
//! its exact binary value sits just below the decimal midpoint.
//!
//! Only precisions of 4 or 5 are useful for phone data: beyond that, GPS
//! noise exceeds the resolution and every ping lands in its own bucket.

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

/// A coordinate pair rounded to a fixed decimal precision.
///
/// Buckets compare, hash and order by the bit patterns of their rounded
/// coordinates. Negative zero is folded into positive zero on construction
/// so that `-0.0` and `0.0` name the same bucket.
#[derive(Debug, Clone, Copy)]
pub struct Bucket {
    lon: f64,
    lat: f64,
}

impl Bucket {
    /// Round a raw coordinate pair to `precision` decimal places.
    ///
    /// # Examples
    ///
    /// ```
    /// use locbook_types::Bucket;
    ///
    /// let b = Bucket::new(13.40495, 52.52003, 4);
    /// assert_eq!((b.longitude(), b.latitude()), (13.405, 52.52));
    /// ```
    #[must_use]
    pub fn new(longitude: f64, latitude: f64, precision: u32) -> Self {
        Self::from_rounded(round_to(longitude, precision), round_to(latitude, precision))
    }

    /// Wrap coordinates that are already rounded, e.g. when reading a snapshot.
    #[must_use]
    pub fn from_rounded(longitude: f64, latitude: f64) -> Self {
        Self {
            lon: positive_zero(longitude),
            lat: positive_zero(latitude),
        }
    }

    /// Rounded longitude.
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.lon
    }

    /// Rounded latitude.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.lat
    }
}

/// Shorthand for [`Bucket::new`].
#[must_use]
pub fn bucket(longitude: f64, latitude: f64, precision: u32) -> Bucket {
    Bucket::new(longitude, latitude, precision)
}

/// Round `value` to `precision` decimal places, ties away from zero.
///
/// Values whose scaled form overflows are returned unchanged; they are
/// already coarser than the requested precision.
#[must_use]
pub fn round_to(value: f64, precision: u32) -> f64 {
    let scale = 10f64.powi(precision.min(i32::MAX as u32) as i32);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / scale
}

fn positive_zero(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

impl PartialEq for Bucket {
    fn eq(&self, other: &Self) -> bool {
        self.lon.to_bits() == other.lon.to_bits() && self.lat.to_bits() == other.lat.to_bits()
    }
}

impl Eq for Bucket {}

impl Hash for Bucket {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lon.to_bits().hash(state);
        self.lat.to_bits().hash(state);
    }
}

impl Ord for Bucket {
    fn cmp(&self, other: &Self) -> Ordering {
        self.lon
            .total_cmp(&other.lon)
            .then_with(|| self.lat.total_cmp(&other.lat))
    }
}

impl PartialOrd for Bucket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lon, self.lat)
    }
}
