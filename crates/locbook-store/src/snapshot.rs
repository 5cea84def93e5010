//! Snapshot file format.
//!
//! A snapshot is a gzip stream wrapping one JSON document:
//!
//! ```json
//! {
//!   "version": 1,
//!   "buckets": [
//!     { "lon": 13.405, "lat": 52.52, "dates": { "2023-11-14": ["22-13-20"] } }
//!   ]
//! }
//! ```
//!
//! Coordinates are written with the shortest representation that parses
//! back to the same `f64`, so a load of a snapshot yields exactly the store
//! that was written.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};

use locbook_types::Bucket;

use crate::error::{Error, Result};
use crate::store::{DateMap, HistoryStore};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotOut<'a> {
    version: u32,
    buckets: Vec<BucketOut<'a>>,
}

#[derive(Serialize)]
struct BucketOut<'a> {
    lon: f64,
    lat: f64,
    dates: &'a DateMap,
}

#[derive(Deserialize)]
struct SnapshotIn {
    version: u32,
    #[serde(default)]
    buckets: Vec<BucketIn>,
}

#[derive(Deserialize)]
struct BucketIn {
    lon: f64,
    lat: f64,
    dates: DateMap,
}

/// Serialize `store` to `path`, creating parent directories as needed.
pub(crate) fn write(store: &HistoryStore, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let doc = SnapshotOut {
        version: SNAPSHOT_VERSION,
        buckets: store
            .iter()
            .map(|(bucket, dates)| BucketOut {
                lon: bucket.longitude(),
                lat: bucket.latitude(),
                dates,
            })
            .collect(),
    };

    let write_err = |source: std::io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(write_err)?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    serde_json::to_writer(&mut encoder, &doc).map_err(|e| write_err(e.into()))?;
    let mut writer = encoder.finish().map_err(write_err)?;
    writer.flush().map_err(write_err)
}

/// Read the snapshot at `path`; `Ok(None)` if there is no file.
pub(crate) fn read(path: &Path) -> Result<Option<HistoryStore>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(Error::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let doc: SnapshotIn =
        serde_json::from_reader(GzDecoder::new(BufReader::new(file))).map_err(|e| {
            Error::Corrupt {
                path: path.to_path_buf(),
                source: e,
            }
        })?;

    if doc.version != SNAPSHOT_VERSION {
        return Err(Error::UnsupportedVersion {
            path: path.to_path_buf(),
            version: doc.version,
            expected: SNAPSHOT_VERSION,
        });
    }

    let mut store = HistoryStore::new();
    for entry in doc.buckets {
        let bucket = Bucket::from_rounded(entry.lon, entry.lat);
        if entry.dates.values().all(Vec::is_empty) {
            return Err(Error::Invalid {
                path: path.to_path_buf(),
                reason: format!("bucket {} has no observations", bucket),
            });
        }
        for (date, times) in entry.dates {
            for time in times {
                store.add(bucket, date.clone(), time);
            }
        }
    }

    Ok(Some(store))
}
