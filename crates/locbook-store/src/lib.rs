//! Location history persistence for locbook.
//!
//! The [`HistoryStore`] maps every coordinate [`Bucket`](locbook_types::Bucket)
//! to the local dates it was visited on, and every date to the list of
//! times-of-day a ping arrived, in arrival order. It lives in memory for the
//! whole process and is persisted by writing full snapshots.
//!
//! # Example
//!
//! ```no_run
//! use locbook_store::HistoryStore;
//! use locbook_types::Bucket;
//!
//! let mut store = HistoryStore::load("history.snapshot")?;
//! store.add(Bucket::new(13.40495, 52.52003, 4), "2023-11-14", "22-13-20");
//! store.snapshot("history.snapshot")?;
//! # Ok::<(), locbook_store::Error>(())
//! ```
//!
//! # Durability
//!
//! Snapshots overwrite the target file in place. A crash in the middle of a
//! write can leave a truncated file behind, which the next
//! [`HistoryStore::load`] reports as corrupt instead of starting from a
//! partial history.

mod error;
mod snapshot;
mod store;

pub use error::{Error, Result};
pub use snapshot::SNAPSHOT_VERSION;
pub use store::{DateMap, HistoryStore};

/// Snapshot file name used when no path is configured.
pub const DEFAULT_HISTORY_FILE: &str = "history.snapshot";
