use artifact_store::InMemoryArtifactStore;
use criterion::{Criterion, criterion_group, criterion_main};
use evidence::{ArtifactInput, ArtifactKind, EvidenceBundle, naming};
use ingestion::{IngestionCoordinator, InMemoryDerivedExtractor};
use metadata_index::{InMemoryMetadataIndex, MetadataIndex};

fn bundle_for(record_id: common::RecordId) -> EvidenceBundle {
    EvidenceBundle::new(
        record_id,
        vec![
            ArtifactInput::new(ArtifactKind::Invoice, vec![0u8; 4096], "pdf", "scan.pdf"),
            ArtifactInput::new(ArtifactKind::DataFile, vec![1u8; 2048], "xml", "data.xml"),
            ArtifactInput::new(ArtifactKind::Receipt, vec![2u8; 1024], "pdf", "ack.pdf"),
        ],
    )
}

fn bench_happy_path(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("ingestion/happy_path", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryArtifactStore::new();
                let index = InMemoryMetadataIndex::new();
                let extractor = InMemoryDerivedExtractor::new();
                let coordinator =
                    IngestionCoordinator::new(store, index.clone(), extractor);

                let record = index.create_record("INV-BENCH").await.unwrap();
                coordinator
                    .ingest(bundle_for(record.id), "bench")
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_naming_resolve(c: &mut Criterion) {
    c.bench_function("ingestion/naming_resolve", |b| {
        b.iter(|| {
            for kind in ArtifactKind::ALL {
                naming::resolve("INV-2024-0917", kind).unwrap();
            }
        });
    });
}

criterion_group!(benches, bench_happy_path, bench_naming_resolve);
criterion_main!(benches);
