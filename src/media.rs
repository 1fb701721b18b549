//! Uploaded media storage.

use std::path::{Path, PathBuf};

use uuid::Uuid;

/// URL prefix the media root is served under.
pub const MEDIA_ROUTE: &str = "uploads";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("media storage failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Store for uploaded cover files.
///
/// Files land under a single root directory with a random name, keeping
/// the extension of the uploaded filename.
#[derive(Clone, Debug)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    /// Create a new [`MediaStore`] rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the files are written to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist an uploaded file and return its public relative path.
    ///
    /// The content is spooled under a random temporary name first, then
    /// renamed so the original filename's extension is preserved.
    pub async fn store(
        &self,
        original_filename: &str,
        content: &[u8],
    ) -> Result<String, StorageError> {
        let temporary = self.root.join(Uuid::new_v4().to_string());
        tokio::fs::write(&temporary, content).await?;

        let path = self.normalize(&temporary, original_filename).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(format!("{MEDIA_ROUTE}/{file_name}"))
    }

    /// Move a spooled file to its final name, appending the extension of
    /// `original_filename` (its last `.`-delimited segment). A filename
    /// without extension keeps the temporary name.
    pub async fn normalize(
        &self,
        temporary: &Path,
        original_filename: &str,
    ) -> Result<PathBuf, StorageError> {
        let final_path = match original_filename.rsplit_once('.') {
            // An extension must not smuggle in a path separator.
            Some((_, ext)) if !ext.contains(['/', '\\']) => {
                PathBuf::from(format!("{}.{ext}", temporary.display()))
            },
            _ => temporary.to_path_buf(),
        };

        tokio::fs::rename(temporary, &final_path).await?;

        Ok(final_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_preserves_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path());

        let cover = store.store("holiday photo.png", b"data").await.unwrap();

        assert!(cover.starts_with("uploads/"));
        assert!(cover.ends_with(".png"));

        let file_name = cover.strip_prefix("uploads/").unwrap();
        let content = std::fs::read(dir.path().join(file_name)).unwrap();
        assert_eq!(content, b"data");
    }

    #[tokio::test]
    async fn test_store_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path());

        let cover = store.store("README", b"data").await.unwrap();

        let file_name = cover.strip_prefix("uploads/").unwrap();
        assert!(!file_name.contains('.'));
        assert!(dir.path().join(file_name).is_file());
    }

    #[tokio::test]
    async fn test_normalize_missing_temporary() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path());

        let missing = dir.path().join("never-spooled");
        let result = store.normalize(&missing, "a.png").await;

        assert!(matches!(result, Err(StorageError::Io(_))));
    }

    #[tokio::test]
    async fn test_normalize_rejects_separator_in_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path());

        let temporary = dir.path().join("spooled");
        std::fs::write(&temporary, b"data").unwrap();

        let path = store
            .normalize(&temporary, "x./../../etc/passwd")
            .await
            .unwrap();

        assert_eq!(path, temporary);
    }
}
