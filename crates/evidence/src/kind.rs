//! Artifact kinds accepted in an evidence bundle.

use serde::{Deserialize, Serialize};

/// The kind of one proof-of-invoice document.
///
/// The derived `Ord` fixes the write order during ingestion: artifacts are
/// written in kind order (invoice first), never in input order, so repeated
/// submissions of the same bundle behave identically.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// The scanned provider invoice (primary document).
    Invoice,

    /// The structured electronic invoice data file.
    DataFile,

    /// The acknowledgment receipt issued to the provider.
    Receipt,
}

impl ArtifactKind {
    /// All kinds, in write-priority order.
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::Invoice,
        ArtifactKind::DataFile,
        ArtifactKind::Receipt,
    ];

    /// Returns true for the primary document of a bundle.
    ///
    /// The primary artifact is the one handed to the derived extractor
    /// after a successful commit.
    pub fn is_primary(&self) -> bool {
        matches!(self, ArtifactKind::Invoice)
    }

    /// File-name suffix used by the naming resolver.
    pub fn suffix(&self) -> &'static str {
        match self {
            ArtifactKind::Invoice => "invoice",
            ArtifactKind::DataFile => "data",
            ArtifactKind::Receipt => "receipt",
        }
    }

    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Invoice => "invoice",
            ArtifactKind::DataFile => "data_file",
            ArtifactKind::Receipt => "receipt",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invoice" => Ok(ArtifactKind::Invoice),
            "data_file" => Ok(ArtifactKind::DataFile),
            "receipt" => Ok(ArtifactKind::Receipt),
            other => Err(format!("unknown artifact kind: {other}")),
        }
    }
}
