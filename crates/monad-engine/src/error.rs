//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure the binary can hit between loading
//! configuration and writing the final snapshot, so the runner and the
//! snapshot helpers can propagate with `?`.

use std::path::PathBuf;

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: monad_core::ConfigError,
    },

    /// The world could not be built or restored.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: monad_core::WorldError,
    },

    /// A tick could not run.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: monad_core::TickError,
    },

    /// A snapshot file could not be read or written.
    #[error("snapshot file {path}: {source}")]
    SnapshotIo {
        /// The file involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A snapshot file is not valid JSON for a world snapshot.
    #[error("snapshot file {path} is malformed: {source}")]
    SnapshotFormat {
        /// The file involved.
        path: PathBuf,
        /// The underlying decode error.
        source: serde_json::Error,
    },
}
