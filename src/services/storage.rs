//! Staged-upload storage.
//!
//! Received upload bytes are staged to durable storage before validation.
//! Every staged artifact is either promoted into a post or deleted before
//! the request that created it ends; deletion is driven by the upload
//! handler so all rejection paths clean up the same way.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Store for staged upload artifacts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Write the received bytes to storage and return the staged path.
    async fn stage(&self, original_name: &str, bytes: Bytes) -> Result<PathBuf>;

    /// Delete a staged artifact.
    async fn delete(&self, path: &Path) -> Result<()>;
}

/// Filesystem implementation of ArtifactStore.
pub struct FsArtifactStore {
    dir: PathBuf,
}

impl FsArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating upload directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Strip any client-supplied directory components.
    fn sanitize(original_name: &str) -> &str {
        Path::new(original_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn stage(&self, original_name: &str, bytes: Bytes) -> Result<PathBuf> {
        let name = format!("{}-{}", Uuid::new_v4(), Self::sanitize(original_name));
        let path = self.dir.join(name);

        let mut file = tokio::fs::File::create(&path)
            .await
            .with_context(|| format!("creating {}", path.display()))?;
        file.write_all(&bytes)
            .await
            .with_context(|| format!("writing {}", path.display()))?;

        tracing::debug!(path = %path.display(), size_bytes = bytes.len(), "artifact staged");

        Ok(path)
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        tokio::fs::remove_file(path)
            .await
            .with_context(|| format!("deleting {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stage_writes_bytes_and_delete_removes_them() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path()).unwrap();

        let path = store
            .stage("song.mp3", Bytes::from_static(b"not really audio"))
            .await
            .unwrap();

        assert!(path.exists());
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"not really audio");
        assert!(path.file_name().unwrap().to_str().unwrap().ends_with("song.mp3"));

        store.delete(&path).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn stage_strips_directory_components_from_client_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path()).unwrap();

        let path = store
            .stage("../../etc/passwd", Bytes::from_static(b"x"))
            .await
            .unwrap();

        assert_eq!(path.parent().unwrap(), dir.path());
        store.delete(&path).await.unwrap();
    }

    #[tokio::test]
    async fn staged_names_are_unique_per_call() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path()).unwrap();

        let a = store.stage("a.mp3", Bytes::from_static(b"1")).await.unwrap();
        let b = store.stage("a.mp3", Bytes::from_static(b"2")).await.unwrap();

        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn delete_of_missing_artifact_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path()).unwrap();

        let missing = dir.path().join("gone.mp3");
        assert!(store.delete(&missing).await.is_err());
    }
}
