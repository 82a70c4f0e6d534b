//! Record and evidence submission endpoints.

use std::sync::Arc;

use artifact_store::ArtifactStore;
use axum::Json;
use axum::extract::{Path, State};
use common::RecordId;
use evidence::{ArtifactInput, ArtifactKind, EvidenceBundle};
use ingestion::{DerivedExtractor, IngestionCoordinator};
use metadata_index::{IndexRow, MetadataIndex};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<A, M, X>
where
    A: ArtifactStore,
    M: MetadataIndex,
    X: DerivedExtractor,
{
    pub coordinator: IngestionCoordinator<A, M, X>,
    pub index: M,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateRecordRequest {
    pub business_key: String,
}

#[derive(Deserialize)]
pub struct ArtifactRequest {
    pub kind: String,
    pub content: Vec<u8>,
    pub extension: String,
    pub original_name: String,
}

#[derive(Deserialize)]
pub struct SubmitEvidenceRequest {
    pub submitted_by: Option<String>,
    pub artifacts: Vec<ArtifactRequest>,
}

// -- Response types --

#[derive(Serialize)]
pub struct RecordCreatedResponse {
    pub record_id: String,
    pub business_key: String,
    pub status: String,
}

#[derive(Serialize)]
pub struct RecordResponse {
    pub record_id: String,
    pub business_key: String,
    pub status: String,
    pub artifacts: Vec<IndexRow>,
}

#[derive(Serialize)]
pub struct EvidenceSubmittedResponse {
    pub record_id: String,
    pub artifacts: Vec<String>,
    pub derived_file: Option<String>,
}

// -- Handlers --

/// POST /records — register a record awaiting evidence.
#[tracing::instrument(skip(state, req))]
pub async fn create<A, M, X>(
    State(state): State<Arc<AppState<A, M, X>>>,
    Json(req): Json<CreateRecordRequest>,
) -> Result<(axum::http::StatusCode, Json<RecordCreatedResponse>), ApiError>
where
    A: ArtifactStore + 'static,
    M: MetadataIndex + 'static,
    X: DerivedExtractor + 'static,
{
    if req.business_key.trim().is_empty() {
        return Err(ApiError::BadRequest("business_key must not be empty".into()));
    }

    let record = state.index.create_record(req.business_key.trim()).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(RecordCreatedResponse {
            record_id: record.id.to_string(),
            business_key: record.business_key,
            status: record.status.to_string(),
        }),
    ))
}

/// GET /records/{id} — record details with its indexed artifacts.
#[tracing::instrument(skip(state))]
pub async fn get<A, M, X>(
    State(state): State<Arc<AppState<A, M, X>>>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<RecordResponse>, ApiError>
where
    A: ArtifactStore + 'static,
    M: MetadataIndex + 'static,
    X: DerivedExtractor + 'static,
{
    let record_id = RecordId::from_uuid(id);
    let record = state
        .index
        .get_record(record_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("record not found: {record_id}")))?;

    let artifacts = state.index.list_artifacts(record_id).await?;

    Ok(Json(RecordResponse {
        record_id: record.id.to_string(),
        business_key: record.business_key,
        status: record.status.to_string(),
        artifacts,
    }))
}

/// POST /records/{id}/evidence — run the ingestion saga for a bundle.
#[tracing::instrument(skip(state, req), fields(record_id = %id))]
pub async fn submit_evidence<A, M, X>(
    State(state): State<Arc<AppState<A, M, X>>>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<SubmitEvidenceRequest>,
) -> Result<Json<EvidenceSubmittedResponse>, ApiError>
where
    A: ArtifactStore + 'static,
    M: MetadataIndex + 'static,
    X: DerivedExtractor + 'static,
{
    let record_id = RecordId::from_uuid(id);

    let mut artifacts = Vec::with_capacity(req.artifacts.len());
    for artifact in req.artifacts {
        let kind = artifact
            .kind
            .parse::<ArtifactKind>()
            .map_err(ApiError::BadRequest)?;
        artifacts.push(ArtifactInput::new(
            kind,
            artifact.content,
            artifact.extension,
            artifact.original_name,
        ));
    }
    let bundle = EvidenceBundle::new(record_id, artifacts);
    let submitted_by = req.submitted_by.unwrap_or_else(|| "portal".to_string());

    // Run the saga on its own task so a client disconnect cannot cancel it
    // mid-flight: compensation always gets to finish.
    let state = state.clone();
    let receipt = tokio::spawn(async move {
        state.coordinator.ingest(bundle, &submitted_by).await
    })
    .await
    .map_err(|e| ApiError::Internal(format!("ingestion task failed: {e}")))??;

    Ok(Json(EvidenceSubmittedResponse {
        record_id: receipt.record_id.to_string(),
        artifacts: receipt.artifacts.into_iter().map(|a| a.name).collect(),
        derived_file: receipt.derived_file,
    }))
}
