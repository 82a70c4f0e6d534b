//! Shared identifier types used across the evidence ingestion crates.

pub mod types;

pub use types::RecordId;
