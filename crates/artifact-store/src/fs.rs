//! Filesystem-backed artifact store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use common::RecordId;
use tokio::fs;

use crate::error::Result;
use crate::store::ArtifactStore;

/// Artifact store backed by a directory tree.
///
/// Each container maps to a directory named after the record ID under the
/// configured root. Artifact names are produced by the naming resolver and
/// contain no path separators.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    /// Creates a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn container_dir(&self, container: RecordId) -> PathBuf {
        self.root.join(container.to_string())
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn write(&self, container: RecordId, name: &str, content: &[u8]) -> Result<()> {
        let dir = self.container_dir(container);
        fs::create_dir_all(&dir).await?;
        fs::write(dir.join(name), content).await?;
        Ok(())
    }

    async fn delete(&self, container: RecordId, name: &str) -> Result<()> {
        match fs::remove_file(self.container_dir(container).join(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn container_is_empty(&self, container: RecordId) -> Result<bool> {
        let mut entries = match fs::read_dir(self.container_dir(container)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(true),
            Err(e) => return Err(e.into()),
        };
        Ok(entries.next_entry().await?.is_none())
    }

    async fn delete_container(&self, container: RecordId) -> Result<()> {
        match fs::remove_dir(self.container_dir(container)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
