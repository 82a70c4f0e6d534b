//! Name-addressable blob storage for evidence artifacts.
//!
//! Artifacts are grouped under a per-record container and addressed by
//! `(container, name)`. Deletes are idempotent so compensation can run in
//! any order; container deletion is best-effort.
//!
//! Two implementations are provided:
//! - [`InMemoryArtifactStore`] for tests, with failure-injection knobs
//! - [`FsArtifactStore`] backed by the local filesystem

pub mod error;
pub mod fs;
pub mod memory;
pub mod store;

pub use error::{ArtifactStoreError, Result};
pub use fs::FsArtifactStore;
pub use memory::InMemoryArtifactStore;
pub use store::ArtifactStore;
