//! HTTP API server with observability for the evidence ingestion system.
//!
//! Provides REST endpoints for registering invoice records and submitting
//! evidence bundles, with structured logging (tracing) and Prometheus
//! metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use artifact_store::ArtifactStore;
use axum::Router;
use axum::routing::{get, post};
use ingestion::{DerivedExtractor, InMemoryDerivedExtractor, IngestionCoordinator};
use metadata_index::MetadataIndex;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::records::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<A, M, X>(state: Arc<AppState<A, M, X>>, metrics_handle: PrometheusHandle) -> Router
where
    A: ArtifactStore + 'static,
    M: MetadataIndex + 'static,
    X: DerivedExtractor + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/records", post(routes::records::create::<A, M, X>))
        .route("/records/{id}", get(routes::records::get::<A, M, X>))
        .route(
            "/records/{id}/evidence",
            post(routes::records::submit_evidence::<A, M, X>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state around the given adapters,
/// wiring the in-memory derived extractor.
pub fn create_default_state<A, M>(
    store: A,
    index: M,
) -> Arc<AppState<A, M, InMemoryDerivedExtractor>>
where
    A: ArtifactStore + Clone + 'static,
    M: MetadataIndex + Clone + 'static,
{
    let coordinator =
        IngestionCoordinator::new(store, index.clone(), InMemoryDerivedExtractor::new());

    Arc::new(AppState { coordinator, index })
}
