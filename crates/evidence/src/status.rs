//! Business-record status state machine.

use serde::{Deserialize, Serialize};

/// The status of an invoice business record as seen by the ingestion saga.
///
/// Status transitions relevant here:
/// ```text
/// AwaitingEvidence ──► EvidenceReceived ──► Settled
///        │
///        └──────────────► Voided (from any non-terminal status)
/// ```
/// Only `AwaitingEvidence` accepts a new evidence bundle; the flip to
/// `EvidenceReceived` happens inside the index transaction at saga commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// The record has been registered and is waiting for its documents.
    #[default]
    AwaitingEvidence,

    /// An evidence bundle has been attached and indexed.
    EvidenceReceived,

    /// The invoice has been settled downstream.
    Settled,

    /// The record was voided and accepts no further changes.
    Voided,
}

impl RecordStatus {
    /// Returns true if a new evidence bundle may be attached.
    pub fn accepts_evidence(&self) -> bool {
        matches!(self, RecordStatus::AwaitingEvidence)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::AwaitingEvidence => "awaiting_evidence",
            RecordStatus::EvidenceReceived => "evidence_received",
            RecordStatus::Settled => "settled",
            RecordStatus::Voided => "voided",
        }
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RecordStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "awaiting_evidence" => Ok(RecordStatus::AwaitingEvidence),
            "evidence_received" => Ok(RecordStatus::EvidenceReceived),
            "settled" => Ok(RecordStatus::Settled),
            "voided" => Ok(RecordStatus::Voided),
            other => Err(format!("unknown record status: {other}")),
        }
    }
}
