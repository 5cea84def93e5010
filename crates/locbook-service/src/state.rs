//! Application state shared across handlers.
//!
//! The history store sits behind a single [`tokio::sync::Mutex`]. Every
//! mutation holds the guard across the in-memory update, the snapshot and
//! both render writes, so concurrent events are applied one at a time and
//! the files on disk always describe a state the store actually passed
//! through.

use std::sync::Arc;

use locbook_store::HistoryStore;
use tokio::sync::Mutex;

use crate::config::Config;

/// Shared application state.
pub struct AppState {
    /// The accumulated history (wrapped in Mutex for serialized mutation).
    pub history: Mutex<HistoryStore>,
    /// Configuration, fixed for the lifetime of the process.
    pub config: Config,
}

impl AppState {
    /// Create new application state.
    pub fn new(history: HistoryStore, config: Config) -> Arc<Self> {
        Arc::new(Self {
            history: Mutex::new(history),
            config,
        })
    }
}
