//! The artifact store trait.

use async_trait::async_trait;
use common::RecordId;

use crate::error::Result;

/// Durable, name-addressable storage for binary artifacts.
///
/// Artifacts live in a container named after their parent record. The
/// ingestion saga is the only writer; reads happen elsewhere in the portal.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Writes an artifact, overwriting any existing artifact of the same
    /// name. The container is created on first write.
    async fn write(&self, container: RecordId, name: &str, content: &[u8]) -> Result<()>;

    /// Deletes an artifact. Deleting a missing artifact is not an error.
    async fn delete(&self, container: RecordId, name: &str) -> Result<()>;

    /// Returns true if the container holds no artifacts (or does not exist).
    async fn container_is_empty(&self, container: RecordId) -> Result<bool>;

    /// Deletes the container itself. Best-effort: callers treat failures as
    /// an observability signal, not an error to surface.
    async fn delete_container(&self, container: RecordId) -> Result<()>;
}
