//! Location-history service for OwnTracks clients.
//!
//! This crate provides a service that:
//! - Accepts OwnTracks location messages over HTTP POST
//! - Buckets each fix to a fixed decimal precision and files it by local date
//! - Persists the accumulated history to a snapshot after every change
//! - Rewrites a heatmap script and a live-position GeoJSON file for a web map
//! - Imports Google location-history exports and exports the full history
//!   as GeoJSON, as one-shot commands
//!
//! # Configuration
//!
//! The service reads configuration from `~/.config/locbook/locbook.toml`:
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:9001"
//!
//! [storage]
//! history_path = "history.snapshot"
//!
//! [output]
//! heatmap_path = "map.js"
//! live_geojson_path = "realtime.geojson"
//!
//! [render]
//! precision = 4
//! blur = 5
//! ```

pub mod api;
pub mod commands;
pub mod config;
pub mod ingest;
pub mod state;

pub use commands::CommandError;
pub use config::{
    Config, ConfigError, OutputConfig, RenderConfig, ServerConfig, StorageConfig, ValidationError,
};
pub use ingest::{IngestError, Outcome};
pub use state::AppState;
