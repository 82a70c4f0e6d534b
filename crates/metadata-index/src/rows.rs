//! Row types for the metadata index.

use chrono::{DateTime, Utc};
use common::RecordId;
use evidence::{ArtifactKind, RecordStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The invoice business record an evidence bundle attaches to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRecord {
    pub id: RecordId,
    /// Human-meaningful key (e.g. the provider invoice number); artifact
    /// names derive from it.
    pub business_key: String,
    pub status: RecordStatus,
}

/// A new index row to insert for one stored artifact.
///
/// Created only inside the commit transaction, never without a durably
/// written artifact behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIndexRow {
    pub kind: ArtifactKind,
    pub name: String,
    pub extension: String,
    pub size_bytes: i64,
    pub description: String,
    pub created_by: String,
}

/// A persisted index row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRow {
    pub id: Uuid,
    pub record_id: RecordId,
    pub kind: ArtifactKind,
    pub name: String,
    pub extension: String,
    pub size_bytes: i64,
    pub description: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// An audit entry written in the same transaction as the index rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub action: String,
    pub actor: String,
    pub detail: String,
}

impl AuditEntry {
    /// Creates an audit entry.
    pub fn new(
        action: impl Into<String>,
        actor: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            actor: actor.into(),
            detail: detail.into(),
        }
    }

    /// The audit entry recorded when a bundle is attached.
    pub fn evidence_attached(actor: impl Into<String>, artifact_count: usize) -> Self {
        Self::new(
            "evidence_attached",
            actor,
            format!("{artifact_count} artifacts indexed"),
        )
    }
}

/// One transactional unit of work: index rows, status flip and audit entry
/// commit or roll back together.
#[derive(Debug, Clone)]
pub struct EvidenceCommit {
    pub record_id: RecordId,
    /// Rows in ledger order.
    pub rows: Vec<NewIndexRow>,
    pub new_status: RecordStatus,
    pub audit: AuditEntry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evidence_attached_entry() {
        let entry = AuditEntry::evidence_attached("clerk01", 3);
        assert_eq!(entry.action, "evidence_attached");
        assert_eq!(entry.actor, "clerk01");
        assert_eq!(entry.detail, "3 artifacts indexed");
    }

    #[test]
    fn test_index_row_serialization_roundtrip() {
        let row = IndexRow {
            id: Uuid::new_v4(),
            record_id: RecordId::new(),
            kind: ArtifactKind::Invoice,
            name: "INV-1_invoice.pdf".to_string(),
            extension: "pdf".to_string(),
            size_bytes: 42,
            description: "scanned invoice".to_string(),
            created_by: "clerk01".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&row).unwrap();
        let deserialized: IndexRow = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, row);
    }
}
