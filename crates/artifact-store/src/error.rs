//! Artifact store error types.

use thiserror::Error;

/// Errors that can occur during artifact store operations.
#[derive(Debug, Error)]
pub enum ArtifactStoreError {
    /// An I/O failure while writing, deleting or listing artifacts.
    #[error("artifact store I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for artifact store results.
pub type Result<T> = std::result::Result<T, ArtifactStoreError>;
