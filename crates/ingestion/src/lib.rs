//! Saga coordinator for evidence-bundle ingestion.
//!
//! This crate orchestrates the one multi-resource write of the invoice
//! portal: attaching a bundle of proof-of-invoice documents to a business
//! record. The blob store and the relational index are separate resources
//! with no shared transaction manager, so all-or-nothing semantics come
//! from an explicit compensating saga:
//! 1. Validate the bundle and the parent record (zero side effects on
//!    failure)
//! 2. Write each artifact in fixed kind order, appending every success to
//!    a write ledger
//! 3. Commit one index transaction (rows + status flip + audit entry)
//! 4. After commit, best-effort derived extraction from the primary
//!    document
//!
//! Any failure before commit deletes every ledgered artifact; observers
//! only ever see a committed or a failed saga.

pub mod coordinator;
pub mod error;
pub mod ledger;
pub mod services;
pub mod state;

pub use coordinator::{IngestionCoordinator, IngestionReceipt};
pub use error::IngestionError;
pub use ledger::WriteLedger;
pub use services::{
    DerivedExtractor, ExtractionError, InMemoryDerivedExtractor, StructuredPayload,
};
pub use state::IngestionState;
