//! Storage abstraction trait
//!
//! This module defines the Storage trait that all blob-store backends must
//! implement.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All blob-store backends (Firebase Storage, local filesystem) must
/// implement this trait. The upload pipeline works against it without
/// coupling to backend details; the returned URL is the stable externally
/// dereferenceable locator stored in catalog records. Uploads stream from
/// the staged file, never buffering the whole blob in memory.
///
/// **Key format:** `movies/{record_id}/{artifact}.{ext}`; see the crate
/// root documentation and the `keys` module.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload the file at `source` under a specific storage key and return
    /// the public URL for the uploaded blob.
    async fn upload_with_key(
        &self,
        storage_key: &str,
        source: &Path,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Delete a blob by its storage key. Deleting a missing blob is not an
    /// error.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;
}
