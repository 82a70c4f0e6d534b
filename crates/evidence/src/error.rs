//! Domain error types.

use thiserror::Error;

use crate::kind::ArtifactKind;

/// Errors raised while resolving an artifact name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    /// The record's business key is empty.
    #[error("business key is empty")]
    EmptyBusinessKey,

    /// The business key contains a character that cannot appear in an
    /// artifact name.
    #[error("business key {key:?} contains reserved character {character:?}")]
    ReservedCharacter { key: String, character: char },
}

/// Errors raised while validating an evidence bundle.
///
/// All of these are detected before any side effect occurs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The bundle contains no artifacts at all.
    #[error("bundle contains no artifacts")]
    EmptyBundle,

    /// A required artifact kind is missing.
    #[error("required artifact kind '{0}' is missing")]
    MissingKind(ArtifactKind),

    /// An artifact kind appears more than once.
    #[error("artifact kind '{0}' appears more than once")]
    DuplicateKind(ArtifactKind),

    /// An artifact has no content.
    #[error("artifact of kind '{0}' has no content")]
    EmptyArtifact(ArtifactKind),

    /// An artifact exceeds the size ceiling.
    #[error("artifact of kind '{kind}' is {size_bytes} bytes, ceiling is {max_bytes}")]
    ArtifactTooLarge {
        kind: ArtifactKind,
        size_bytes: u64,
        max_bytes: u64,
    },

    /// The business key cannot produce valid artifact names.
    #[error("invalid business key: {0}")]
    Naming(#[from] NamingError),
}
