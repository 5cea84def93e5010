//! Writing rendered artifacts to disk.

use std::path::Path;

use tracing::debug;

use crate::error::RenderError;

/// Replace the file at `path` with `contents`.
///
/// The handle is opened, written in full and closed within this call; no
/// file stays open between renders.
pub fn write_output<P: AsRef<Path>>(path: P, contents: &str) -> Result<(), RenderError> {
    let path = path.as_ref();
    std::fs::write(path, contents).map_err(|e| RenderError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}
