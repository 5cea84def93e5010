//! One-shot operations run instead of the listener.

use std::path::Path;

use locbook_core::render::{self, GeoJsonSource};
use locbook_core::{ImportError, RenderError};
use locbook_store::HistoryStore;
use tracing::info;

use crate::config::Config;

/// Errors from a one-shot command. Any of these ends the process non-zero.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Store(#[from] locbook_store::Error),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Import a Google location-history export into `history`.
///
/// The file is read into a staging store first; `history` only changes once
/// every record has been read. After merging, the history is snapshotted and
/// the heatmap rewritten once. Returns the number of records imported.
pub fn import_google<P: AsRef<Path>>(
    history: &mut HistoryStore,
    config: &Config,
    path: P,
) -> Result<usize, CommandError> {
    let summary = locbook_core::import::import_file(path, config.render.precision)?;

    history.merge(summary.history);
    history.snapshot(&config.storage.history_path)?;

    let js = render::render_heatmap(history, config.render.precision, config.render.blur)?;
    locbook_core::write_output(&config.output.heatmap_path, &js)?;

    info!(
        "History now holds {} points and {} observations",
        history.size(),
        history.observation_count()
    );
    Ok(summary.records)
}

/// Write the whole history as a GeoJSON `FeatureCollection` to `path`.
pub fn export_geojson<P: AsRef<Path>>(history: &HistoryStore, path: P) -> Result<(), CommandError> {
    let path = path.as_ref();
    let json = render::render_geojson(GeoJsonSource::History(history))?;
    locbook_core::write_output(path, &json)?;
    info!("Exported {} points to {}", history.size(), path.display());
    Ok(())
}
