//! Rendering and import for locbook.
//!
//! This crate turns a [`HistoryStore`](locbook_store::HistoryStore) into the
//! files a web map consumes, and feeds Google location-history exports into
//! a store.
//!
//! # Features
//!
//! - **Heatmap**: a JavaScript file with `[lat, lon, weight]` points and a
//!   display config whose radius follows the bucket precision
//! - **GeoJSON**: the full history as one Point per bucket, or a single
//!   "live" point for the most recent observation
//! - **Import**: streams the `locations` array of an export record by record,
//!   so exports with hundreds of thousands of entries stay cheap to read
//!
//! # Example
//!
//! ```no_run
//! use locbook_core::{import, render};
//!
//! let summary = import::import_file("Location History.json", 4)?;
//! println!("{} records imported", summary.records);
//!
//! let js = render::render_heatmap(&summary.history, 4, 5)?;
//! locbook_core::write_output("map.js", &js)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod geojson;
pub mod import;
pub mod output;
pub mod render;

pub use error::{ImportError, RenderError};
pub use geojson::{Feature, FeatureCollection, Geometry};
pub use import::ImportSummary;
pub use output::write_output;
pub use render::{GeoJsonSource, HeatmapConfig, render_geojson, render_heatmap};
