//! Main store implementation.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info};

use locbook_types::{Bucket, LocalStamp};

use crate::error::Result;
use crate::snapshot;

/// Times-of-day recorded at one bucket, keyed by local date.
pub type DateMap = BTreeMap<String, Vec<String>>;

/// In-memory location history: bucket → date → times-of-day.
///
/// Every bucket in the store holds at least one date with at least one
/// time entry. Iteration follows bucket order, so renders of the same
/// content are identical.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryStore {
    buckets: BTreeMap<Bucket, DateMap>,
}

impl HistoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a snapshot file.
    ///
    /// A missing file yields an empty store. Any other failure is returned:
    /// a history that cannot be read completely must not be used at all.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        info!("Loading history from {}", path.display());
        match snapshot::read(path)? {
            Some(store) => {
                info!(
                    "History size: {} points, {} observations",
                    store.size(),
                    store.observation_count()
                );
                Ok(store)
            }
            None => {
                info!("History not found, starting empty at {}", path.display());
                Ok(Self::new())
            }
        }
    }

    /// Write the whole store to `path`, replacing any previous snapshot.
    ///
    /// The file is overwritten in place; it is not valid while the write
    /// is in progress.
    pub fn snapshot<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        snapshot::write(self, path)?;
        debug!("Wrote snapshot of {} points to {}", self.size(), path.display());
        Ok(())
    }

    /// Record one observation, creating the bucket and date if absent.
    pub fn add(&mut self, bucket: Bucket, date: impl Into<String>, time: impl Into<String>) {
        self.buckets
            .entry(bucket)
            .or_default()
            .entry(date.into())
            .or_default()
            .push(time.into());
    }

    /// Record one observation from a normalized timestamp.
    pub fn record(&mut self, bucket: Bucket, stamp: LocalStamp) {
        self.add(bucket, stamp.date, stamp.time);
    }

    /// Append every observation of `other` to this store.
    ///
    /// Times for a shared `(bucket, date)` are appended after the existing ones.
    pub fn merge(&mut self, other: HistoryStore) {
        for (bucket, dates) in other.buckets {
            let target = self.buckets.entry(bucket).or_default();
            for (date, times) in dates {
                target.entry(date).or_default().extend(times);
            }
        }
    }

    /// Number of distinct buckets.
    pub fn size(&self) -> usize {
        self.buckets.len()
    }

    /// Whether no observation has been recorded.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of time entries across all buckets and dates.
    pub fn observation_count(&self) -> usize {
        self.buckets.values().map(count_times).sum()
    }

    /// Number of time entries recorded at `bucket`, zero if unknown.
    pub fn weight(&self, bucket: &Bucket) -> usize {
        self.buckets.get(bucket).map_or(0, count_times)
    }

    /// Dates and times recorded at `bucket`.
    pub fn get(&self, bucket: &Bucket) -> Option<&DateMap> {
        self.buckets.get(bucket)
    }

    /// Iterate over buckets in order.
    pub fn iter(&self) -> impl Iterator<Item = (&Bucket, &DateMap)> {
        self.buckets.iter()
    }
}

pub(crate) fn count_times(dates: &DateMap) -> usize {
    dates.values().map(Vec::len).sum()
}
