//! The write ledger driving compensation.

use evidence::StoredArtifact;

/// In-memory record of artifacts durably written during one saga
/// execution.
///
/// Each artifact is appended after its write succeeds and before the next
/// write starts, so on any failure the ledger holds exactly the set of
/// side effects to reverse. The ledger is local to one execution and never
/// outlives it.
#[derive(Debug, Default)]
pub struct WriteLedger {
    entries: Vec<StoredArtifact>,
}

impl WriteLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a durably written artifact.
    pub fn record(&mut self, artifact: StoredArtifact) {
        self.entries.push(artifact);
    }

    /// Returns the ledgered artifacts in write order.
    pub fn entries(&self) -> &[StoredArtifact] {
        &self.entries
    }

    /// Returns the ledgered artifacts most-recent-first, the order
    /// compensation deletes in.
    pub fn newest_first(&self) -> impl Iterator<Item = &StoredArtifact> {
        self.entries.iter().rev()
    }

    /// Returns the number of ledgered artifacts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the ledger, yielding the artifacts in write order.
    pub fn into_entries(self) -> Vec<StoredArtifact> {
        self.entries
    }

    /// Renders the ledgered artifact names for operator-facing logs.
    pub fn summary(&self) -> String {
        self.entries
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::RecordId;
    use evidence::ArtifactKind;

    fn artifact(name: &str, kind: ArtifactKind) -> StoredArtifact {
        StoredArtifact {
            container: RecordId::new(),
            name: name.to_string(),
            kind,
            extension: "pdf".to_string(),
            size_bytes: 1,
        }
    }

    #[test]
    fn test_empty_ledger() {
        let ledger = WriteLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.len(), 0);
        assert_eq!(ledger.summary(), "");
    }

    #[test]
    fn test_record_preserves_write_order() {
        let mut ledger = WriteLedger::new();
        ledger.record(artifact("a_invoice.pdf", ArtifactKind::Invoice));
        ledger.record(artifact("a_data.xml", ArtifactKind::DataFile));

        let names: Vec<&str> = ledger.entries().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["a_invoice.pdf", "a_data.xml"]);
        assert_eq!(ledger.summary(), "a_invoice.pdf, a_data.xml");
    }

    #[test]
    fn test_newest_first_reverses() {
        let mut ledger = WriteLedger::new();
        ledger.record(artifact("a_invoice.pdf", ArtifactKind::Invoice));
        ledger.record(artifact("a_data.xml", ArtifactKind::DataFile));
        ledger.record(artifact("a_receipt.pdf", ArtifactKind::Receipt));

        let names: Vec<&str> = ledger.newest_first().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["a_receipt.pdf", "a_data.xml", "a_invoice.pdf"]);
    }
}
