//! Derived extractor trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured side-record extracted from the primary document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredPayload {
    /// Extracted fields as free-form JSON.
    pub fields: serde_json::Value,
}

/// Error from a failed extraction. Logged by the caller, never surfaced.
#[derive(Debug, Clone, Error)]
#[error("extraction failed: {0}")]
pub struct ExtractionError(pub String);

/// Trait for the best-effort derived extraction after a committed bundle.
///
/// Only ever invoked after the saga committed; its outcome must never
/// influence the saga result.
#[async_trait]
pub trait DerivedExtractor: Send + Sync {
    /// Extracts a structured payload from the primary document's content.
    async fn extract(&self, content: &[u8]) -> Result<StructuredPayload, ExtractionError>;
}

#[derive(Debug, Default)]
struct InMemoryExtractorState {
    fail_on_extract: bool,
    extractions: usize,
}

/// In-memory derived extractor for testing.
///
/// Produces a deterministic payload describing the content it was handed.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDerivedExtractor {
    state: Arc<RwLock<InMemoryExtractorState>>,
}

impl InMemoryDerivedExtractor {
    /// Creates a new in-memory extractor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the extractor to fail on the next extract calls.
    pub fn set_fail_on_extract(&self, fail: bool) {
        self.state.write().unwrap().fail_on_extract = fail;
    }

    /// Returns the number of extract calls observed.
    pub fn extraction_count(&self) -> usize {
        self.state.read().unwrap().extractions
    }
}

#[async_trait]
impl DerivedExtractor for InMemoryDerivedExtractor {
    async fn extract(&self, content: &[u8]) -> Result<StructuredPayload, ExtractionError> {
        let mut state = self.state.write().unwrap();
        state.extractions += 1;

        if state.fail_on_extract {
            return Err(ExtractionError("unreadable document".to_string()));
        }

        let checksum = content
            .iter()
            .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(*b as u32));

        Ok(StructuredPayload {
            fields: serde_json::json!({
                "size_bytes": content.len(),
                "checksum": format!("{checksum:08x}"),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_extract_is_deterministic() {
        let extractor = InMemoryDerivedExtractor::new();

        let a = extractor.extract(b"invoice body").await.unwrap();
        let b = extractor.extract(b"invoice body").await.unwrap();

        assert_eq!(a, b);
        assert_eq!(a.fields["size_bytes"], 12);
        assert_eq!(extractor.extraction_count(), 2);
    }

    #[tokio::test]
    async fn test_fail_on_extract() {
        let extractor = InMemoryDerivedExtractor::new();
        extractor.set_fail_on_extract(true);

        let result = extractor.extract(b"invoice body").await;
        assert!(result.is_err());
        assert_eq!(extractor.extraction_count(), 1);
    }
}
