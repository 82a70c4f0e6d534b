//! In-memory artifact store for testing.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::RecordId;

use crate::error::{ArtifactStoreError, Result};
use crate::store::ArtifactStore;

#[derive(Debug, Default)]
struct InMemoryState {
    containers: HashMap<RecordId, HashMap<String, Vec<u8>>>,
    fail_on_write: Option<String>,
    fail_on_delete: Option<String>,
    write_calls: usize,
}

/// In-memory artifact store for testing.
///
/// Failure injection targets artifacts by name so tests can fail the Nth
/// write of a bundle deterministically.
#[derive(Debug, Clone, Default)]
pub struct InMemoryArtifactStore {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryArtifactStore {
    /// Creates a new empty in-memory artifact store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes writes fail for artifact names containing the given fragment.
    pub fn set_fail_on_write(&self, name_fragment: impl Into<String>) {
        self.state.write().unwrap().fail_on_write = Some(name_fragment.into());
    }

    /// Makes deletes fail for artifact names containing the given fragment.
    pub fn set_fail_on_delete(&self, name_fragment: impl Into<String>) {
        self.state.write().unwrap().fail_on_delete = Some(name_fragment.into());
    }

    /// Clears any injected failures.
    pub fn clear_failures(&self) {
        let mut state = self.state.write().unwrap();
        state.fail_on_write = None;
        state.fail_on_delete = None;
    }

    /// Returns the number of artifacts in a container.
    pub fn artifact_count(&self, container: RecordId) -> usize {
        self.state
            .read()
            .unwrap()
            .containers
            .get(&container)
            .map_or(0, HashMap::len)
    }

    /// Returns true if the container exists (even when empty).
    pub fn container_exists(&self, container: RecordId) -> bool {
        self.state.read().unwrap().containers.contains_key(&container)
    }

    /// Returns the content of an artifact, if present.
    pub fn content(&self, container: RecordId, name: &str) -> Option<Vec<u8>> {
        self.state
            .read()
            .unwrap()
            .containers
            .get(&container)
            .and_then(|c| c.get(name).cloned())
    }

    /// Returns the total number of write calls observed.
    pub fn write_call_count(&self) -> usize {
        self.state.read().unwrap().write_calls
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn write(&self, container: RecordId, name: &str, content: &[u8]) -> Result<()> {
        let mut state = self.state.write().unwrap();
        state.write_calls += 1;

        if let Some(ref fragment) = state.fail_on_write
            && name.contains(fragment.as_str())
        {
            return Err(ArtifactStoreError::Io(std::io::Error::other(
                "injected write failure",
            )));
        }

        state
            .containers
            .entry(container)
            .or_default()
            .insert(name.to_string(), content.to_vec());
        Ok(())
    }

    async fn delete(&self, container: RecordId, name: &str) -> Result<()> {
        let mut state = self.state.write().unwrap();

        if let Some(ref fragment) = state.fail_on_delete
            && name.contains(fragment.as_str())
        {
            return Err(ArtifactStoreError::Io(std::io::Error::other(
                "injected delete failure",
            )));
        }

        if let Some(artifacts) = state.containers.get_mut(&container) {
            artifacts.remove(name);
        }
        Ok(())
    }

    async fn container_is_empty(&self, container: RecordId) -> Result<bool> {
        let state = self.state.read().unwrap();
        Ok(state.containers.get(&container).is_none_or(HashMap::is_empty))
    }

    async fn delete_container(&self, container: RecordId) -> Result<()> {
        self.state.write().unwrap().containers.remove(&container);
        Ok(())
    }
}
