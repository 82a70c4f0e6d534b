//! Evidence bundle value objects and validation.

use common::RecordId;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::kind::ArtifactKind;

/// One document submitted as part of an evidence bundle.
///
/// Immutable once accepted: the saga only ever reads it.
#[derive(Debug, Clone)]
pub struct ArtifactInput {
    kind: ArtifactKind,
    content: Vec<u8>,
    extension: String,
    original_name: String,
}

impl ArtifactInput {
    /// Creates a new artifact input.
    pub fn new(
        kind: ArtifactKind,
        content: Vec<u8>,
        extension: impl Into<String>,
        original_name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            content,
            extension: extension.into(),
            original_name: original_name.into(),
        }
    }

    /// Returns the declared kind.
    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Returns the raw content.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Returns the declared file extension, without a leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Returns the file name the document was uploaded under.
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Returns the content size in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.content.len() as u64
    }
}

/// Acceptance policy for evidence bundles.
#[derive(Debug, Clone)]
pub struct BundlePolicy {
    required: Vec<ArtifactKind>,
    max_artifact_bytes: u64,
}

/// Default per-artifact size ceiling (25 MiB).
const DEFAULT_MAX_ARTIFACT_BYTES: u64 = 25 * 1024 * 1024;

impl BundlePolicy {
    /// Creates a policy requiring the given kinds exactly once each.
    pub fn new(required: Vec<ArtifactKind>, max_artifact_bytes: u64) -> Self {
        Self {
            required,
            max_artifact_bytes,
        }
    }

    /// Returns the required kinds.
    pub fn required(&self) -> &[ArtifactKind] {
        &self.required
    }

    /// Returns the per-artifact size ceiling in bytes.
    pub fn max_artifact_bytes(&self) -> u64 {
        self.max_artifact_bytes
    }
}

impl Default for BundlePolicy {
    fn default() -> Self {
        Self {
            required: ArtifactKind::ALL.to_vec(),
            max_artifact_bytes: DEFAULT_MAX_ARTIFACT_BYTES,
        }
    }
}

/// The set of artifacts submitted together for one business record.
///
/// A bundle exists only for one saga invocation.
#[derive(Debug, Clone)]
pub struct EvidenceBundle {
    record_id: RecordId,
    artifacts: Vec<ArtifactInput>,
}

impl EvidenceBundle {
    /// Creates a bundle for the given record.
    pub fn new(record_id: RecordId, artifacts: Vec<ArtifactInput>) -> Self {
        Self {
            record_id,
            artifacts,
        }
    }

    /// Returns the parent record ID.
    pub fn record_id(&self) -> RecordId {
        self.record_id
    }

    /// Returns the artifacts in submission order.
    pub fn artifacts(&self) -> &[ArtifactInput] {
        &self.artifacts
    }

    /// Returns the artifacts sorted into fixed kind-priority order.
    ///
    /// The saga writes in this order regardless of input order.
    pub fn artifacts_in_write_order(&self) -> Vec<&ArtifactInput> {
        let mut ordered: Vec<&ArtifactInput> = self.artifacts.iter().collect();
        ordered.sort_by_key(|a| a.kind());
        ordered
    }

    /// Returns the primary artifact, if present.
    pub fn primary(&self) -> Option<&ArtifactInput> {
        self.artifacts.iter().find(|a| a.kind().is_primary())
    }

    /// Validates the bundle shape against the policy.
    ///
    /// Checks that every required kind is present exactly once, that no
    /// kind repeats, and that each artifact is non-empty and under the
    /// size ceiling. Violations carry no side effects.
    pub fn validate(&self, policy: &BundlePolicy) -> Result<(), ValidationError> {
        if self.artifacts.is_empty() {
            return Err(ValidationError::EmptyBundle);
        }

        for kind in ArtifactKind::ALL {
            let count = self.artifacts.iter().filter(|a| a.kind() == kind).count();
            if count > 1 {
                return Err(ValidationError::DuplicateKind(kind));
            }
            if count == 0 && policy.required().contains(&kind) {
                return Err(ValidationError::MissingKind(kind));
            }
        }

        for artifact in self.artifacts_in_write_order() {
            if artifact.content().is_empty() {
                return Err(ValidationError::EmptyArtifact(artifact.kind()));
            }
            if artifact.size_bytes() > policy.max_artifact_bytes() {
                return Err(ValidationError::ArtifactTooLarge {
                    kind: artifact.kind(),
                    size_bytes: artifact.size_bytes(),
                    max_bytes: policy.max_artifact_bytes(),
                });
            }
        }

        Ok(())
    }
}

/// A durably written artifact, addressed by `(container, name)`.
///
/// Produced by the saga's write phase; owned exclusively by the coordinator
/// until its index row commits. Deletion always goes through the saga's
/// compensation or an explicit delete path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredArtifact {
    /// The bundle container, named after the parent record.
    pub container: RecordId,
    /// Full artifact name including extension.
    pub name: String,
    /// The declared kind.
    pub kind: ArtifactKind,
    /// The declared extension, without a leading dot.
    pub extension: String,
    /// Content size in bytes.
    pub size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(kind: ArtifactKind) -> ArtifactInput {
        ArtifactInput::new(kind, vec![1, 2, 3], "pdf", "upload.pdf")
    }

    fn full_bundle() -> EvidenceBundle {
        EvidenceBundle::new(
            RecordId::new(),
            vec![
                artifact(ArtifactKind::Receipt),
                artifact(ArtifactKind::Invoice),
                artifact(ArtifactKind::DataFile),
            ],
        )
    }

    #[test]
    fn test_valid_bundle_passes() {
        assert!(full_bundle().validate(&BundlePolicy::default()).is_ok());
    }

    #[test]
    fn test_write_order_ignores_input_order() {
        let bundle = full_bundle();
        let kinds: Vec<ArtifactKind> = bundle
            .artifacts_in_write_order()
            .iter()
            .map(|a| a.kind())
            .collect();
        assert_eq!(
            kinds,
            [
                ArtifactKind::Invoice,
                ArtifactKind::DataFile,
                ArtifactKind::Receipt
            ]
        );
    }

    #[test]
    fn test_primary_artifact() {
        let bundle = full_bundle();
        assert_eq!(bundle.primary().unwrap().kind(), ArtifactKind::Invoice);

        let no_primary = EvidenceBundle::new(RecordId::new(), vec![artifact(ArtifactKind::Receipt)]);
        assert!(no_primary.primary().is_none());
    }

    #[test]
    fn test_empty_bundle_rejected() {
        let bundle = EvidenceBundle::new(RecordId::new(), vec![]);
        assert_eq!(
            bundle.validate(&BundlePolicy::default()),
            Err(ValidationError::EmptyBundle)
        );
    }

    #[test]
    fn test_missing_kind_rejected() {
        let bundle = EvidenceBundle::new(
            RecordId::new(),
            vec![artifact(ArtifactKind::Invoice), artifact(ArtifactKind::Receipt)],
        );
        assert_eq!(
            bundle.validate(&BundlePolicy::default()),
            Err(ValidationError::MissingKind(ArtifactKind::DataFile))
        );
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let bundle = EvidenceBundle::new(
            RecordId::new(),
            vec![
                artifact(ArtifactKind::Invoice),
                artifact(ArtifactKind::Invoice),
                artifact(ArtifactKind::DataFile),
                artifact(ArtifactKind::Receipt),
            ],
        );
        assert_eq!(
            bundle.validate(&BundlePolicy::default()),
            Err(ValidationError::DuplicateKind(ArtifactKind::Invoice))
        );
    }

    #[test]
    fn test_empty_artifact_rejected() {
        let bundle = EvidenceBundle::new(
            RecordId::new(),
            vec![
                ArtifactInput::new(ArtifactKind::Invoice, vec![], "pdf", "x.pdf"),
                artifact(ArtifactKind::DataFile),
                artifact(ArtifactKind::Receipt),
            ],
        );
        assert_eq!(
            bundle.validate(&BundlePolicy::default()),
            Err(ValidationError::EmptyArtifact(ArtifactKind::Invoice))
        );
    }

    #[test]
    fn test_size_ceiling_enforced() {
        let policy = BundlePolicy::new(ArtifactKind::ALL.to_vec(), 2);
        let bundle = full_bundle();
        assert!(matches!(
            bundle.validate(&policy),
            Err(ValidationError::ArtifactTooLarge {
                kind: ArtifactKind::Invoice,
                size_bytes: 3,
                max_bytes: 2,
            })
        ));
    }

    #[test]
    fn test_optional_kind_may_be_absent() {
        let policy = BundlePolicy::new(
            vec![ArtifactKind::Invoice, ArtifactKind::DataFile],
            DEFAULT_MAX_ARTIFACT_BYTES,
        );
        let bundle = EvidenceBundle::new(
            RecordId::new(),
            vec![artifact(ArtifactKind::Invoice), artifact(ArtifactKind::DataFile)],
        );
        assert!(bundle.validate(&policy).is_ok());
    }
}
