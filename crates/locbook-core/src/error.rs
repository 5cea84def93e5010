//! Error types for locbook-core.

use std::path::PathBuf;

use locbook_types::{DecodeError, TimestampError};

/// Errors that abort a bulk import.
///
/// Nothing from a failed import is kept: callers only merge the staged
/// history after the whole file has been read.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The import file could not be opened.
    #[error("Failed to open import file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not a JSON object, or a record does not have the expected shape.
    #[error("Import file is not a location history export: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The top-level object has no `locations` array.
    #[error("Import file has no `locations` array")]
    MissingLocations,

    /// A record decoded but one of its values is unusable.
    #[error("Invalid record #{index}: {source}")]
    InvalidRecord { index: usize, source: DecodeError },

    /// A record's timestamp cannot be converted to a local date.
    #[error("Record #{index} has an unrepresentable timestamp: {source}")]
    Timestamp {
        index: usize,
        source: TimestampError,
    },
}

/// Errors from producing or writing a rendered artifact.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The rendered value could not be serialized.
    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The output file could not be written.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
