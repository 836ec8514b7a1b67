//! JSON snapshots of [`GameState`].
//!
//! Saves write to a sibling temp file and rename it into place, so a crash
//! mid-write leaves the previous snapshot intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::game::GameState;

/// Errors from reading or writing a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Filesystem failure.
    #[error("snapshot I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The file is not a valid snapshot.
    #[error("snapshot JSON is invalid: {source}")]
    Json {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },
}

/// Write `state` to `path`.
///
/// # Errors
///
/// Returns [`SnapshotError`] if serialization or any file operation fails.
pub fn save(path: &Path, state: &GameState) -> Result<(), SnapshotError> {
    let json = serde_json::to_vec_pretty(state)?;
    let tmp = temp_path(path);
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    info!(path = %path.display(), "snapshot saved");
    Ok(())
}

/// Read a snapshot. A missing file is `Ok(None)`.
///
/// # Errors
///
/// Returns [`SnapshotError`] if the file exists but cannot be read or
/// parsed.
pub fn load(path: &Path) -> Result<Option<GameState>, SnapshotError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let state = serde_json::from_slice(&bytes)?;
    info!(path = %path.display(), "snapshot loaded");
    Ok(Some(state))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(ToOwned::to_owned).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
