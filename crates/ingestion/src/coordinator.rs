//! Saga coordinator for evidence-bundle ingestion.

use artifact_store::ArtifactStore;
use common::RecordId;
use evidence::{
    ArtifactInput, BundlePolicy, EvidenceBundle, RecordStatus, StoredArtifact, ValidationError,
    naming,
};
use metadata_index::{AuditEntry, EvidenceCommit, MetadataIndex, NewIndexRow, ParentRecord};

use crate::error::IngestionError;
use crate::ledger::WriteLedger;
use crate::services::extractor::DerivedExtractor;
use crate::state::IngestionState;

/// Result of a committed ingestion.
#[derive(Debug, Clone)]
pub struct IngestionReceipt {
    /// The record the bundle was attached to.
    pub record_id: RecordId,
    /// The durably stored artifacts, in write order.
    pub artifacts: Vec<StoredArtifact>,
    /// Name of the best-effort derived file, when extraction succeeded.
    pub derived_file: Option<String>,
}

/// Orchestrates the evidence-bundle ingestion saga.
///
/// The coordinator drives validation, artifact writes, the single index
/// transaction and compensation across two resources that cannot share a
/// transaction manager. The write ledger is local to one execution; no
/// state persists between invocations.
pub struct IngestionCoordinator<A, M, X>
where
    A: ArtifactStore,
    M: MetadataIndex,
    X: DerivedExtractor,
{
    store: A,
    index: M,
    extractor: X,
    policy: BundlePolicy,
}

impl<A, M, X> IngestionCoordinator<A, M, X>
where
    A: ArtifactStore,
    M: MetadataIndex,
    X: DerivedExtractor,
{
    /// Creates a coordinator with the default bundle policy.
    pub fn new(store: A, index: M, extractor: X) -> Self {
        Self::with_policy(store, index, extractor, BundlePolicy::default())
    }

    /// Creates a coordinator with an explicit bundle policy.
    pub fn with_policy(store: A, index: M, extractor: X, policy: BundlePolicy) -> Self {
        Self {
            store,
            index,
            extractor,
            policy,
        }
    }

    /// Executes the ingestion saga for one bundle.
    ///
    /// On success every artifact is durably stored, indexed, and the
    /// record's status is flipped — all observable as one atomic outcome.
    /// On failure nothing remains: validation failures never had side
    /// effects, and later failures compensate the write ledger before
    /// returning. The error is always the failure that first interrupted
    /// the pipeline.
    #[tracing::instrument(
        skip(self, bundle),
        fields(record_id = %bundle.record_id(), saga = "evidence_ingestion")
    )]
    pub async fn ingest(
        &self,
        bundle: EvidenceBundle,
        submitted_by: &str,
    ) -> Result<IngestionReceipt, IngestionError> {
        metrics::counter!("evidence_ingest_total").increment(1);
        let saga_start = std::time::Instant::now();
        let record_id = bundle.record_id();
        let mut state = IngestionState::Validating;

        // 1. Validate: parent record, bundle shape, resolvable names.
        // Failures here are guaranteed side-effect-free.
        let record = self
            .index
            .get_record(record_id)
            .await
            .map_err(IngestionError::Index)?
            .ok_or(IngestionError::RecordNotFound(record_id))?;

        if !record.status.accepts_evidence() {
            return Err(IngestionError::RecordNotAccepting {
                record_id,
                status: record.status,
            });
        }

        bundle.validate(&self.policy)?;

        let plan = plan_writes(&record, &bundle)?;

        // 2. Write artifacts in fixed kind order, ledgering each success
        // before the next write starts.
        debug_transition(&mut state, IngestionState::WritingArtifacts);
        let mut ledger = WriteLedger::new();
        for (artifact, name) in &plan {
            if let Err(source) = self.store.write(record_id, name, artifact.content()).await {
                // The just-failed artifact is in an unknown state and is
                // not ledgered; compensation only touches known writes.
                tracing::warn!(artifact = %name, error = %source, "artifact write failed");
                self.compensate(record_id, &mut state, &ledger).await;
                self.finish(saga_start, state);
                return Err(IngestionError::ArtifactWrite {
                    name: name.clone(),
                    source,
                });
            }
            ledger.record(StoredArtifact {
                container: record_id,
                name: name.clone(),
                kind: artifact.kind(),
                extension: artifact.extension().to_string(),
                size_bytes: artifact.size_bytes(),
            });
        }

        // 3. One index transaction: rows in ledger order, status flip,
        // audit entry. The index rolls its own rows back on failure but
        // cannot touch the blob store; that stays on us.
        debug_transition(&mut state, IngestionState::Indexing);
        let commit = EvidenceCommit {
            record_id,
            rows: plan
                .iter()
                .map(|(artifact, name)| NewIndexRow {
                    kind: artifact.kind(),
                    name: name.clone(),
                    extension: artifact.extension().to_string(),
                    size_bytes: artifact.size_bytes() as i64,
                    description: format!("{} ({})", artifact.kind(), artifact.original_name()),
                    created_by: submitted_by.to_string(),
                })
                .collect(),
            new_status: RecordStatus::EvidenceReceived,
            audit: AuditEntry::evidence_attached(submitted_by, ledger.len()),
        };

        if let Err(e) = self.index.commit_evidence(commit).await {
            tracing::warn!(error = %e, "index commit failed");
            self.compensate(record_id, &mut state, &ledger).await;
            self.finish(saga_start, state);
            return Err(IngestionError::IndexCommit(e));
        }

        // 4. Committed: point of no return. Derived extraction is
        // best-effort and never alters the outcome.
        debug_transition(&mut state, IngestionState::Committed);
        let derived_file = self.extract_derived(&record, &bundle).await;

        self.finish(saga_start, state);
        metrics::counter!("evidence_ingest_committed").increment(1);
        tracing::info!(artifacts = ledger.len(), "evidence bundle committed");

        Ok(IngestionReceipt {
            record_id,
            artifacts: ledger.into_entries(),
            derived_file,
        })
    }

    /// Deletes every ledgered artifact, most-recent-first.
    ///
    /// Each deletion is independent and best-effort: failures are logged
    /// with the ledger contents and counted, never escalated to the
    /// caller. Ends in `Failed` regardless of cleanup outcome.
    #[tracing::instrument(skip(self, state, ledger), fields(record_id = %record_id))]
    async fn compensate(
        &self,
        record_id: RecordId,
        state: &mut IngestionState,
        ledger: &WriteLedger,
    ) {
        debug_transition(state, IngestionState::Compensating);
        metrics::counter!("evidence_ingest_compensations_total").increment(1);
        tracing::warn!(ledger = %ledger.summary(), "compensating evidence ingestion");

        for artifact in ledger.newest_first() {
            match self.store.delete(artifact.container, &artifact.name).await {
                Ok(()) => {
                    tracing::info!(artifact = %artifact.name, "deleted ledgered artifact");
                }
                Err(e) => {
                    metrics::counter!("evidence_compensation_failures_total").increment(1);
                    tracing::warn!(
                        artifact = %artifact.name,
                        ledger = %ledger.summary(),
                        error = %e,
                        "failed to delete ledgered artifact"
                    );
                }
            }
        }

        match self.store.container_is_empty(record_id).await {
            Ok(true) => {
                if let Err(e) = self.store.delete_container(record_id).await {
                    tracing::warn!(error = %e, "failed to delete empty container");
                }
            }
            Ok(false) => {
                tracing::warn!(
                    ledger = %ledger.summary(),
                    "container not empty after compensation; leaving for reconciliation"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to inspect container after compensation");
            }
        }

        debug_transition(state, IngestionState::Failed);
        metrics::counter!("evidence_ingest_failed").increment(1);
    }

    /// Runs the best-effort derived extraction on the primary artifact.
    ///
    /// Returns the derived file name when both extraction and the write
    /// succeed; any failure is logged and swallowed.
    async fn extract_derived(
        &self,
        record: &ParentRecord,
        bundle: &EvidenceBundle,
    ) -> Option<String> {
        let primary = bundle.primary()?;

        let payload = match self.extractor.extract(primary.content()).await {
            Ok(payload) => payload,
            Err(e) => {
                metrics::counter!("evidence_extraction_failures_total").increment(1);
                tracing::warn!(record_id = %record.id, error = %e, "derived extraction failed");
                return None;
            }
        };

        // The business key passed naming validation before any write.
        let stem = naming::derived_name(&record.business_key).ok()?;
        let name = format!("{stem}.json");
        let bytes = match serde_json::to_vec(&payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(record_id = %record.id, error = %e, "derived payload unserializable");
                return None;
            }
        };

        match self.store.write(record.id, &name, &bytes).await {
            Ok(()) => Some(name),
            Err(e) => {
                tracing::warn!(record_id = %record.id, error = %e, "derived file write failed");
                None
            }
        }
    }

    fn finish(&self, saga_start: std::time::Instant, state: IngestionState) {
        debug_assert!(state.is_terminal());
        metrics::histogram!("evidence_ingest_duration_seconds")
            .record(saga_start.elapsed().as_secs_f64());
    }
}

/// Resolves the full artifact names for a bundle, in write order.
fn plan_writes<'a>(
    record: &ParentRecord,
    bundle: &'a EvidenceBundle,
) -> Result<Vec<(&'a ArtifactInput, String)>, IngestionError> {
    let mut plan = Vec::new();
    for artifact in bundle.artifacts_in_write_order() {
        let stem = naming::resolve(&record.business_key, artifact.kind())
            .map_err(ValidationError::from)?;
        let name = if artifact.extension().is_empty() {
            stem
        } else {
            format!("{stem}.{}", artifact.extension())
        };
        plan.push((artifact, name));
    }
    Ok(plan)
}

fn debug_transition(state: &mut IngestionState, next: IngestionState) {
    tracing::debug!(from = %state, to = %next, "saga state transition");
    *state = next;
}
