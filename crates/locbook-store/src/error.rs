//! Error types for locbook-store.

use std::path::PathBuf;

/// Result type for locbook-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in locbook-store.
///
/// The load-side variants (`Read`, `Corrupt`, `Invalid`, `UnsupportedVersion`)
/// mean the on-disk history cannot be trusted and the process must not start
/// on top of it. The write-side variants (`CreateDirectory`, `Write`) leave
/// the in-memory store intact; the snapshot on disk is merely stale.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The snapshot exists but could not be read.
    #[error("Failed to read history snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The snapshot is not a valid compressed JSON document.
    #[error("History snapshot {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The snapshot decoded but violates a store invariant.
    #[error("History snapshot {path} is invalid: {reason}")]
    Invalid { path: PathBuf, reason: String },

    /// The snapshot was written by an incompatible format version.
    #[error("History snapshot {path} has unsupported version {version} (expected {expected})")]
    UnsupportedVersion {
        path: PathBuf,
        version: u32,
        expected: u32,
    },

    /// Failed to create the snapshot's parent directory.
    #[error("Failed to create snapshot directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write the snapshot.
    #[error("Failed to write history snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
