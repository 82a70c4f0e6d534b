//! Metadata index error types.

use common::RecordId;
use evidence::{ArtifactKind, RecordStatus};
use thiserror::Error;

/// Errors that can occur during metadata index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The parent record does not exist.
    #[error("record not found: {0}")]
    RecordNotFound(RecordId),

    /// The parent record no longer accepts evidence.
    #[error("record {record_id} does not accept evidence in status '{status}'")]
    RecordNotAccepting {
        record_id: RecordId,
        status: RecordStatus,
    },

    /// An artifact of this kind is already indexed for the record.
    #[error("artifact of kind '{kind}' is already indexed for record {record_id}")]
    DuplicateArtifact {
        record_id: RecordId,
        kind: ArtifactKind,
    },

    /// A record with this business key already exists.
    #[error("a record with business key '{0}' already exists")]
    DuplicateBusinessKey(String),

    /// A stored row could not be decoded.
    #[error("failed to decode stored row: {0}")]
    Decode(String),

    /// The index backend is unavailable.
    #[error("metadata index unavailable: {0}")]
    Unavailable(String),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for metadata index results.
pub type Result<T> = std::result::Result<T, IndexError>;
