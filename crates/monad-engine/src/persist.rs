//! Snapshot files.
//!
//! The world itself never touches the disk. The binary writes its
//! snapshot as pretty JSON, first to a sibling temp file and then renamed
//! over the target so a crash mid-write leaves the previous snapshot
//! intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use monad_core::WorldSnapshot;
use tracing::{debug, info};

use crate::error::EngineError;

/// Read a snapshot, or `None` if the file does not exist.
pub async fn load(path: &Path) -> Result<Option<WorldSnapshot>, EngineError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no snapshot on disk");
            return Ok(None);
        }
        Err(source) => {
            return Err(EngineError::SnapshotIo {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let snapshot: WorldSnapshot = serde_json::from_slice(&bytes).map_err(|source| EngineError::SnapshotFormat {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        tick = snapshot.clock.tick,
        agents = snapshot.agents.len(),
        "snapshot loaded"
    );
    Ok(Some(snapshot))
}

/// Write a snapshot, replacing any previous file at `path`.
pub async fn save(path: &Path, snapshot: &WorldSnapshot) -> Result<(), EngineError> {
    let io_error = |source: std::io::Error| EngineError::SnapshotIo {
        path: path.to_path_buf(),
        source,
    };
    let json = serde_json::to_vec_pretty(snapshot).map_err(|source| EngineError::SnapshotFormat {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
    }
    let staging = staging_path(path);
    tokio::fs::write(&staging, &json).await.map_err(io_error)?;
    tokio::fs::rename(&staging, path).await.map_err(io_error)?;

    debug!(path = %path.display(), tick = snapshot.clock.tick, bytes = json.len(), "snapshot written");
    Ok(())
}

/// `monad-snapshot.json` stages as `monad-snapshot.json.tmp`.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
