//! Ingestion saga state machine.

use serde::{Deserialize, Serialize};

/// The state of an ingestion saga execution.
///
/// State transitions:
/// ```text
/// Validating ──► WritingArtifacts ──► Indexing ──► Committed
///     │                 │                │
///     ▼                 └──► Compensating ◄┘
///   Failed                        │
///     ▲                           │
///     └───────────────────────────┘
/// ```
/// Observers only ever see `Committed` or `Failed`; there is no
/// partial-success terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum IngestionState {
    /// Checking the parent record and the bundle shape.
    #[default]
    Validating,

    /// Writing artifacts to the blob store, ledgering each success.
    WritingArtifacts,

    /// Running the single metadata index transaction.
    Indexing,

    /// Deleting ledgered artifacts after a failure.
    Compensating,

    /// Rows committed and status flipped (terminal state).
    Committed,

    /// Saga failed after any required compensation (terminal state).
    Failed,
}

impl IngestionState {
    /// Returns true if artifact writes may begin.
    pub fn can_write(&self) -> bool {
        matches!(self, IngestionState::Validating)
    }

    /// Returns true if the index transaction may run.
    pub fn can_index(&self) -> bool {
        matches!(self, IngestionState::WritingArtifacts)
    }

    /// Returns true if compensation may begin. Validation failures carry
    /// no side effects, so there is nothing to compensate from Validating.
    pub fn can_compensate(&self) -> bool {
        matches!(
            self,
            IngestionState::WritingArtifacts | IngestionState::Indexing
        )
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, IngestionState::Committed | IngestionState::Failed)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestionState::Validating => "Validating",
            IngestionState::WritingArtifacts => "WritingArtifacts",
            IngestionState::Indexing => "Indexing",
            IngestionState::Compensating => "Compensating",
            IngestionState::Committed => "Committed",
            IngestionState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for IngestionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
