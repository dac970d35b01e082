//! Object-storage collaborator for avatar and post images.
//!
//! Handlers hand uploaded bytes to an [`ObjectStorage`] implementation and
//! store the returned durable URL verbatim on the record. Serving the stored
//! objects is delegated to whatever fronts `PUBLIC_BASE_URL` (CDN, reverse
//! proxy); this process only writes them.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable object store: accepts bytes, returns a stable URL.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store an object under the given folder and return its durable URL.
    ///
    /// `original_name` is only consulted for the file extension; the stored
    /// name is always freshly generated.
    async fn put(
        &self,
        folder: &str,
        original_name: &str,
        bytes: Bytes,
    ) -> Result<String, StorageError>;
}

/// Local-disk implementation writing under a configured upload directory.
pub struct LocalDiskStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalDiskStorage {
    pub fn new(root: PathBuf, public_base_url: String) -> Self {
        Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create the upload directory if it does not exist yet.
    pub async fn ensure_layout(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for LocalDiskStorage {
    async fn put(
        &self,
        folder: &str,
        original_name: &str,
        bytes: Bytes,
    ) -> Result<String, StorageError> {
        let name = format!("{}.{}", Uuid::new_v4(), sanitized_extension(original_name));
        let dir = self.root.join(folder);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&name), &bytes).await?;

        Ok(format!(
            "{}/uploads/{}/{}",
            self.public_base_url, folder, name
        ))
    }
}

/// Extension from the client-supplied filename, restricted to short
/// alphanumeric suffixes so it can never influence the stored path.
fn sanitized_extension(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| "bin".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_extension() {
        assert_eq!(sanitized_extension("photo.PNG"), "png");
        assert_eq!(sanitized_extension("archive.tar.gz"), "gz");
        assert_eq!(sanitized_extension("no_extension"), "bin");
        assert_eq!(sanitized_extension("weird.../../etc"), "bin");
    }

    #[tokio::test]
    async fn test_put_writes_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalDiskStorage::new(
            dir.path().to_path_buf(),
            "http://localhost:5005/".to_string(),
        );
        storage.ensure_layout().await.unwrap();

        let url = storage
            .put("avatars", "me.png", Bytes::from_static(b"fake image"))
            .await
            .unwrap();

        assert!(url.starts_with("http://localhost:5005/uploads/avatars/"));
        assert!(url.ends_with(".png"));

        let stored_name = url.rsplit('/').next().unwrap();
        let contents = tokio::fs::read(dir.path().join("avatars").join(stored_name))
            .await
            .unwrap();
        assert_eq!(contents, b"fake image");
    }
}
