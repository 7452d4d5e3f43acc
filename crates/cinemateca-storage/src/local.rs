use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for blob storage (e.g., "/var/lib/cinemateca/media")
    /// * `base_url` - Base URL for serving blobs (e.g., "http://localhost:10000/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path, rejecting keys that could
    /// escape the base storage directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.contains("..") || storage_key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(self.base_path.join(storage_key))
    }

    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        source: &Path,
        _content_type: &str,
    ) -> StorageResult<String> {
        let path = self.key_to_path(storage_key)?;

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut reader = fs::File::open(source).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to open source {}: {}",
                source.display(),
                e
            ))
        })?;

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let bytes_copied = tokio::io::copy(&mut reader, &mut file).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let url = self.generate_url(storage_key);

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(url)
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(key = %storage_key, "Local storage delete successful");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn test_storage(dir: &tempfile::TempDir) -> LocalStorage {
        LocalStorage::new(
            dir.path().join("media"),
            "http://localhost:10000/media".to_string(),
        )
        .await
        .unwrap()
    }

    async fn staged_file(dir: &tempfile::TempDir, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, data).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_upload_stores_file_under_key() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;
        let source = staged_file(&dir, "staged.jpg", b"poster bytes").await;

        let url = storage
            .upload_with_key("movies/abc/cover.jpg", &source, "image/jpeg")
            .await
            .unwrap();

        assert!(url.ends_with("movies/abc/cover.jpg"));

        let stored = fs::read(dir.path().join("media/movies/abc/cover.jpg"))
            .await
            .unwrap();
        assert_eq!(stored, b"poster bytes");
    }

    #[tokio::test]
    async fn test_upload_missing_source_fails() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;

        let result = storage
            .upload_with_key(
                "movies/abc/cover.jpg",
                &dir.path().join("nope.jpg"),
                "image/jpeg",
            )
            .await;
        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;
        let source = staged_file(&dir, "staged.jpg", b"x").await;

        let result = storage
            .upload_with_key("../../../etc/passwd", &source, "image/jpeg")
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_stored_blob() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;
        let source = staged_file(&dir, "staged.mp4", b"v").await;

        storage
            .upload_with_key("movies/x/video.mp4", &source, "video/mp4")
            .await
            .unwrap();
        storage.delete("movies/x/video.mp4").await.unwrap();

        let present = fs::try_exists(dir.path().join("media/movies/x/video.mp4"))
            .await
            .unwrap();
        assert!(!present);
    }

    #[tokio::test]
    async fn test_delete_nonexistent_is_ok() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;

        assert!(storage.delete("movies/none/video.mp4").await.is_ok());
    }
}
