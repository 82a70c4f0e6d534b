//! The metadata index trait.

use async_trait::async_trait;
use common::RecordId;

use crate::error::Result;
use crate::rows::{EvidenceCommit, IndexRow, ParentRecord};

/// Relational store linking artifacts to invoice records.
///
/// `commit_evidence` is the only write the ingestion saga performs here and
/// is atomic per call: either every row, the status flip and the audit entry
/// land, or none of them do. The index cannot remove already-written blobs
/// in the artifact store — that remains the saga's compensation job.
#[async_trait]
pub trait MetadataIndex: Send + Sync {
    /// Creates a record in `AwaitingEvidence` status.
    async fn create_record(&self, business_key: &str) -> Result<ParentRecord>;

    /// Loads a record by ID.
    async fn get_record(&self, id: RecordId) -> Result<Option<ParentRecord>>;

    /// Lists the indexed artifacts of a record, oldest first.
    async fn list_artifacts(&self, record_id: RecordId) -> Result<Vec<IndexRow>>;

    /// Runs one atomic unit of work: inserts the index rows in the given
    /// order, applies the status flip and writes the audit entry.
    ///
    /// Re-validates the parent inside the transaction: a record that no
    /// longer accepts evidence fails the commit with `RecordNotAccepting`,
    /// and a `(record, kind)` collision fails it with `DuplicateArtifact`.
    async fn commit_evidence(&self, commit: EvidenceCommit) -> Result<()>;
}
