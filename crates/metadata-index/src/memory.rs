//! In-memory metadata index for testing.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::RecordId;
use evidence::RecordStatus;
use uuid::Uuid;

use crate::error::{IndexError, Result};
use crate::index::MetadataIndex;
use crate::rows::{AuditEntry, EvidenceCommit, IndexRow, ParentRecord};

#[derive(Debug, Clone)]
struct StoredAudit {
    record_id: RecordId,
    entry: AuditEntry,
    at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct InMemoryIndexState {
    records: HashMap<RecordId, ParentRecord>,
    rows: Vec<IndexRow>,
    audit_log: Vec<StoredAudit>,
    fail_on_commit: bool,
}

/// In-memory metadata index for testing.
///
/// `commit_evidence` validates everything before applying anything under a
/// single lock, so a failed commit observably leaves no partial rows — the
/// same guarantee the PostgreSQL implementation gets from its transaction.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetadataIndex {
    state: Arc<RwLock<InMemoryIndexState>>,
}

impl InMemoryMetadataIndex {
    /// Creates a new empty in-memory index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next commits fail before applying anything.
    pub fn set_fail_on_commit(&self, fail: bool) {
        self.state.write().unwrap().fail_on_commit = fail;
    }

    /// Overwrites a record's status directly (test setup).
    pub fn set_record_status(&self, id: RecordId, status: RecordStatus) {
        if let Some(record) = self.state.write().unwrap().records.get_mut(&id) {
            record.status = status;
        }
    }

    /// Returns the number of index rows for a record.
    pub fn row_count(&self, record_id: RecordId) -> usize {
        self.state
            .read()
            .unwrap()
            .rows
            .iter()
            .filter(|r| r.record_id == record_id)
            .count()
    }

    /// Returns the number of audit entries for a record.
    pub fn audit_count(&self, record_id: RecordId) -> usize {
        self.state
            .read()
            .unwrap()
            .audit_log
            .iter()
            .filter(|a| a.record_id == record_id)
            .count()
    }

    /// Returns the audit entries for a record, oldest first.
    pub fn audit_entries(&self, record_id: RecordId) -> Vec<AuditEntry> {
        let mut stored: Vec<StoredAudit> = self
            .state
            .read()
            .unwrap()
            .audit_log
            .iter()
            .filter(|a| a.record_id == record_id)
            .cloned()
            .collect();
        stored.sort_by_key(|a| a.at);
        stored.into_iter().map(|a| a.entry).collect()
    }

    /// Returns a record's current status, if it exists.
    pub fn status(&self, id: RecordId) -> Option<RecordStatus> {
        self.state
            .read()
            .unwrap()
            .records
            .get(&id)
            .map(|r| r.status)
    }
}

#[async_trait]
impl MetadataIndex for InMemoryMetadataIndex {
    async fn create_record(&self, business_key: &str) -> Result<ParentRecord> {
        let mut state = self.state.write().unwrap();

        if state
            .records
            .values()
            .any(|r| r.business_key == business_key)
        {
            return Err(IndexError::DuplicateBusinessKey(business_key.to_string()));
        }

        let record = ParentRecord {
            id: RecordId::new(),
            business_key: business_key.to_string(),
            status: RecordStatus::AwaitingEvidence,
        };
        state.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_record(&self, id: RecordId) -> Result<Option<ParentRecord>> {
        Ok(self.state.read().unwrap().records.get(&id).cloned())
    }

    async fn list_artifacts(&self, record_id: RecordId) -> Result<Vec<IndexRow>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .rows
            .iter()
            .filter(|r| r.record_id == record_id)
            .cloned()
            .collect())
    }

    async fn commit_evidence(&self, commit: EvidenceCommit) -> Result<()> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_commit {
            return Err(IndexError::Unavailable(
                "injected commit failure".to_string(),
            ));
        }

        // Validate the whole unit of work before touching any state.
        let record = state
            .records
            .get(&commit.record_id)
            .ok_or(IndexError::RecordNotFound(commit.record_id))?;

        if !record.status.accepts_evidence() {
            return Err(IndexError::RecordNotAccepting {
                record_id: commit.record_id,
                status: record.status,
            });
        }

        for (i, row) in commit.rows.iter().enumerate() {
            let already_indexed = state
                .rows
                .iter()
                .any(|r| r.record_id == commit.record_id && r.kind == row.kind);
            let duplicated_in_commit = commit.rows[..i].iter().any(|r| r.kind == row.kind);
            if already_indexed || duplicated_in_commit {
                return Err(IndexError::DuplicateArtifact {
                    record_id: commit.record_id,
                    kind: row.kind,
                });
            }
        }

        // Apply. No fallible step remains past this point.
        let now = Utc::now();
        for row in commit.rows {
            state.rows.push(IndexRow {
                id: Uuid::new_v4(),
                record_id: commit.record_id,
                kind: row.kind,
                name: row.name,
                extension: row.extension,
                size_bytes: row.size_bytes,
                description: row.description,
                created_by: row.created_by,
                created_at: now,
            });
        }
        if let Some(record) = state.records.get_mut(&commit.record_id) {
            record.status = commit.new_status;
        }
        state.audit_log.push(StoredAudit {
            record_id: commit.record_id,
            entry: commit.audit,
            at: now,
        });

        Ok(())
    }
}
