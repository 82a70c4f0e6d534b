//! Ingestion saga error types.

use artifact_store::ArtifactStoreError;
use common::RecordId;
use evidence::{RecordStatus, ValidationError};
use metadata_index::IndexError;
use thiserror::Error;

/// Errors that can interrupt an ingestion saga.
///
/// The caller always sees exactly the failure that first interrupted the
/// pipeline; compensation failures are logged, never surfaced. Extraction
/// failures happen after the point of no return and are not represented
/// here at all.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The parent record does not exist.
    #[error("record not found: {0}")]
    RecordNotFound(RecordId),

    /// The parent record no longer accepts evidence.
    #[error("record {record_id} does not accept evidence in status '{status}'")]
    RecordNotAccepting {
        record_id: RecordId,
        status: RecordStatus,
    },

    /// The bundle failed validation; no side effects occurred.
    #[error("bundle validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// An artifact write failed; the ledger so far was compensated.
    #[error("artifact write failed for '{name}': {source}")]
    ArtifactWrite {
        name: String,
        #[source]
        source: ArtifactStoreError,
    },

    /// The index transaction failed; the full ledger was compensated.
    #[error("index commit failed: {0}")]
    IndexCommit(#[source] IndexError),

    /// A metadata lookup failed during validation, before any side effect.
    #[error("metadata lookup failed: {0}")]
    Index(#[source] IndexError),
}

/// Convenience type alias for ingestion results.
pub type Result<T> = std::result::Result<T, IngestionError>;
