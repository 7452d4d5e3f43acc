//! Firebase Storage backend.
//!
//! Talks to the Firebase Storage REST API: media uploads go to
//! `/v0/b/{bucket}/o?uploadType=media&name={key}` and the public URL is the
//! `?alt=media` download form with the object name percent-encoded as a
//! single path segment.

use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::Path;
use tokio_util::io::ReaderStream;

const FIREBASE_STORAGE_API_BASE: &str = "https://firebasestorage.googleapis.com";

/// Firebase Storage implementation
#[derive(Clone)]
pub struct FirebaseStorage {
    bucket: String,
    auth_token: Option<String>,
    api_base: String,
    client: reqwest::Client,
}

impl FirebaseStorage {
    /// Create a new FirebaseStorage instance
    ///
    /// # Arguments
    /// * `bucket` - Storage bucket name (e.g., "my-project.appspot.com")
    /// * `auth_token` - Optional OAuth bearer token; omit for buckets with
    ///   public rules
    pub fn new(bucket: String, auth_token: Option<String>) -> Self {
        Self::with_api_base(bucket, auth_token, FIREBASE_STORAGE_API_BASE.to_string())
    }

    /// Create an instance against a custom API base (used by tests and
    /// emulators).
    pub fn with_api_base(bucket: String, auth_token: Option<String>, api_base: String) -> Self {
        FirebaseStorage {
            bucket,
            auth_token,
            api_base: api_base.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn validate_key(storage_key: &str) -> StorageResult<()> {
        if storage_key.contains("..") || storage_key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(())
    }

    /// Object endpoint with the key percent-encoded as one path segment.
    fn object_url(&self, storage_key: &str) -> String {
        format!(
            "{}/v0/b/{}/o/{}",
            self.api_base,
            self.bucket,
            urlencoding::encode(storage_key)
        )
    }

    /// Public download URL stored in catalog records.
    fn generate_url(&self, storage_key: &str) -> String {
        format!("{}?alt=media", self.object_url(storage_key))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl Storage for FirebaseStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        source: &Path,
        content_type: &str,
    ) -> StorageResult<String> {
        Self::validate_key(storage_key)?;
        let start = std::time::Instant::now();

        let file = tokio::fs::File::open(source).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to open source {}: {}",
                source.display(),
                e
            ))
        })?;
        let size = file
            .metadata()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?
            .len();

        let upload_url = format!("{}/v0/b/{}/o", self.api_base, self.bucket);
        let request = self
            .client
            .post(&upload_url)
            .query(&[("uploadType", "media"), ("name", storage_key)])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header(reqwest::header::CONTENT_LENGTH, size)
            .body(reqwest::Body::wrap_stream(ReaderStream::new(file)));

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::UploadFailed(format!(
                "Firebase Storage returned {}: {}",
                status, body
            )));
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Firebase storage upload successful"
        );

        Ok(self.generate_url(storage_key))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        Self::validate_key(storage_key)?;

        let request = self.client.delete(self.object_url(storage_key));
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| StorageError::DeleteFailed(e.to_string()))?;

        // Deleting a missing blob is not an error.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        if !response.status().is_success() {
            return Err(StorageError::DeleteFailed(format!(
                "Firebase Storage returned {}",
                response.status()
            )));
        }

        tracing::info!(bucket = %self.bucket, key = %storage_key, "Firebase storage delete successful");

        Ok(())
    }
}
