//! Relational metadata index for evidence artifacts.
//!
//! The index links durably stored artifacts to their parent invoice record,
//! flips the record's status and writes an audit entry — all inside one
//! atomic transaction per [`MetadataIndex::commit_evidence`] call. The
//! transaction is also the serialization point for concurrent duplicate
//! submissions: the parent's status is re-validated under lock, so a second
//! submission fails here and drives the caller's compensation path.
//!
//! Two implementations are provided:
//! - [`InMemoryMetadataIndex`] for tests, with a commit failure knob
//! - [`PostgresMetadataIndex`] backed by sqlx

pub mod error;
pub mod index;
pub mod memory;
pub mod postgres;
pub mod rows;

pub use error::{IndexError, Result};
pub use index::MetadataIndex;
pub use memory::InMemoryMetadataIndex;
pub use postgres::PostgresMetadataIndex;
pub use rows::{AuditEntry, EvidenceCommit, IndexRow, NewIndexRow, ParentRecord};
