//! Error types for the artifact store.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur managing job artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Scratch directory could not be created.
    #[error("failed to create scratch directory {path}: {source}")]
    ScratchCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Parent directory for an allocated artifact could not be created.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Attempted to promote a file the store does not track.
    #[error("path is not a tracked artifact: {path}")]
    NotTracked { path: PathBuf },

    /// Attempted to promote a file that was never produced.
    #[error("artifact missing on disk: {path}")]
    Missing { path: PathBuf },

    /// Moving an artifact into the output directory failed.
    #[error("failed to promote {path} to {dest}: {source}")]
    PromoteFailed {
        path: PathBuf,
        dest: PathBuf,
        source: std::io::Error,
    },

    /// Store was already released.
    #[error("artifact store already released")]
    Released,
}
