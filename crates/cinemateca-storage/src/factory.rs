use crate::{FirebaseStorage, LocalStorage, Storage, StorageBackend, StorageError, StorageResult};
use cinemateca_core::Config;
use std::sync::Arc;

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend {
        StorageBackend::Local => {
            let base_path = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = config.local_storage_base_url.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
            })?;

            let storage = LocalStorage::new(base_path, base_url).await?;
            Ok(Arc::new(storage))
        }

        StorageBackend::Firebase => {
            let bucket = config.firebase_storage_bucket.clone().ok_or_else(|| {
                StorageError::ConfigError("FIREBASE_STORAGE_BUCKET not configured".to_string())
            })?;

            let storage = FirebaseStorage::new(bucket, config.firebase_auth_token.clone());
            Ok(Arc::new(storage))
        }
    }
}
