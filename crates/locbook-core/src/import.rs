//! Streaming import of Google location-history exports.
//!
//! An export is one large JSON object whose `locations` key holds an array
//! of records:
//!
//! ```json
//! { "locations": [
//!     { "timestampMs": "1700000000123", "latitudeE7": 525200300, "longitudeE7": 134049500 }
//! ] }
//! ```
//!
//! The array is walked with a serde visitor over a buffered reader, handing
//! each record to a callback as soon as it is decoded. Only one record is
//! held in memory at a time; sibling keys are skipped without being
//! buffered. A stream cannot be resumed midway, only re-read from the start.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{Local, TimeZone};
use serde::de::{self, DeserializeSeed, IgnoredAny, MapAccess, SeqAccess, Visitor};
use tracing::{debug, info};

use locbook_store::HistoryStore;
use locbook_types::{Bucket, LocationRecord, normalize_in};

use crate::error::ImportError;

/// Key of the record array in an export.
pub const LOCATIONS_KEY: &str = "locations";

/// Result of reading one export file.
#[derive(Debug)]
pub struct ImportSummary {
    /// Number of records read.
    pub records: usize,
    /// The observations, staged in a store of their own.
    pub history: HistoryStore,
}

/// Read an export file into a fresh store, in local time.
pub fn import_file<P: AsRef<Path>>(path: P, precision: u32) -> Result<ImportSummary, ImportError> {
    let path = path.as_ref();
    info!("Importing from {}", path.display());

    let file = File::open(path).map_err(|e| ImportError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut history = HistoryStore::new();
    let records = import_reader(BufReader::new(file), precision, &mut history)?;

    info!("{} items imported from {}", records, path.display());
    Ok(ImportSummary { records, history })
}

/// Add every record from `reader` to `history`, in local time.
pub fn import_reader<R: Read>(
    reader: R,
    precision: u32,
    history: &mut HistoryStore,
) -> Result<usize, ImportError> {
    import_reader_in(reader, precision, &Local, history)
}

/// Add every record from `reader` to `history`, dating them in `tz`.
///
/// On error, `history` may already hold the records read before the failure.
pub fn import_reader_in<R, Tz>(
    reader: R,
    precision: u32,
    tz: &Tz,
    history: &mut HistoryStore,
) -> Result<usize, ImportError>
where
    R: Read,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    for_each_record(reader, |index, record| {
        let seconds = record
            .epoch_seconds()
            .map_err(|source| ImportError::InvalidRecord { index, source })?;
        let stamp =
            normalize_in(seconds, tz).map_err(|source| ImportError::Timestamp { index, source })?;
        let bucket = Bucket::new(record.longitude(), record.latitude(), precision);
        history.record(bucket, stamp);
        Ok(())
    })
}

/// Decode the `locations` array of an export, calling `on_record` for each
/// record with its zero-based index. Returns the number of records.
///
/// The first error returned by `on_record` stops the stream and is passed through.
pub fn for_each_record<R, F>(reader: R, mut on_record: F) -> Result<usize, ImportError>
where
    R: Read,
    F: FnMut(usize, LocationRecord) -> Result<(), ImportError>,
{
    let mut de = serde_json::Deserializer::from_reader(reader);
    let mut failure = None;

    let result = ExportSeed {
        on_record: &mut on_record,
        failure: &mut failure,
    }
    .deserialize(&mut de);

    match result {
        Ok(Some(count)) => {
            de.end().map_err(ImportError::Malformed)?;
            debug!("Streamed {} location records", count);
            Ok(count)
        }
        Ok(None) => Err(ImportError::MissingLocations),
        Err(e) => Err(failure.unwrap_or(ImportError::Malformed(e))),
    }
}

/// Visits the top-level object, streaming `locations` and skipping the rest.
struct ExportSeed<'a, F> {
    on_record: &'a mut F,
    failure: &'a mut Option<ImportError>,
}

impl<'de, F> DeserializeSeed<'de> for ExportSeed<'_, F>
where
    F: FnMut(usize, LocationRecord) -> Result<(), ImportError>,
{
    type Value = Option<usize>;

    fn deserialize<D: de::Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de, F> Visitor<'de> for ExportSeed<'_, F>
where
    F: FnMut(usize, LocationRecord) -> Result<(), ImportError>,
{
    type Value = Option<usize>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object with a `locations` array")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let ExportSeed { on_record, failure } = self;
        let mut count = None;

        while let Some(key) = map.next_key::<String>()? {
            if key == LOCATIONS_KEY && count.is_none() {
                count = Some(map.next_value_seed(RecordsSeed {
                    on_record: &mut *on_record,
                    failure: &mut *failure,
                })?);
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }

        Ok(count)
    }
}

/// Visits the `locations` array one element at a time.
struct RecordsSeed<'a, F> {
    on_record: &'a mut F,
    failure: &'a mut Option<ImportError>,
}

impl<'de, F> DeserializeSeed<'de> for RecordsSeed<'_, F>
where
    F: FnMut(usize, LocationRecord) -> Result<(), ImportError>,
{
    type Value = usize;

    fn deserialize<D: de::Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_seq(self)
    }
}

impl<'de, F> Visitor<'de> for RecordsSeed<'_, F>
where
    F: FnMut(usize, LocationRecord) -> Result<(), ImportError>,
{
    type Value = usize;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of location records")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut count = 0;
        while let Some(record) = seq.next_element::<LocationRecord>()? {
            if let Err(e) = (self.on_record)(count, record) {
                *self.failure = Some(e);
                return Err(de::Error::custom("import aborted"));
            }
            count += 1;
        }
        Ok(count)
    }
}
