//! Mock collaborators for testing
//!
//! In-memory implementations of the transport, blob-store and catalog
//! boundaries, with failure injection for exercising partial-failure paths.

use async_trait::async_trait;
use cinemateca_catalog::{Catalog, CatalogError, CatalogResult, RecordId};
use cinemateca_core::{AttachmentRef, CatalogRecord, ConversationId};
use cinemateca_storage::{Storage, StorageError, StorageResult};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::transport::{Transport, TransportError, TransportResult};

/// Mock transport: scripted attachments, recorded replies.
#[derive(Default)]
pub struct MockTransport {
    attachments: Mutex<HashMap<String, Vec<u8>>>,
    replies: Mutex<Vec<(ConversationId, String)>>,
    failing_downloads: Mutex<HashSet<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the bytes behind a file id.
    pub fn set_attachment(&self, file_id: &str, data: Vec<u8>) {
        self.attachments
            .lock()
            .unwrap()
            .insert(file_id.to_string(), data);
    }

    /// Make retrieval of a file id fail with a simulated network error.
    pub fn fail_download(&self, file_id: &str) {
        self.failing_downloads
            .lock()
            .unwrap()
            .insert(file_id.to_string());
    }

    /// All replies sent so far, in order.
    pub fn replies(&self) -> Vec<(ConversationId, String)> {
        self.replies.lock().unwrap().clone()
    }

    /// Replies sent to one conversation, in order.
    pub fn replies_for(&self, conversation_id: ConversationId) -> Vec<String> {
        self.replies
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == conversation_id)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn download_attachment(
        &self,
        attachment: &AttachmentRef,
        dest: &Path,
    ) -> TransportResult<u64> {
        if self
            .failing_downloads
            .lock()
            .unwrap()
            .contains(&attachment.file_id)
        {
            return Err(TransportError::Request(
                "simulated network error".to_string(),
            ));
        }

        let data = self
            .attachments
            .lock()
            .unwrap()
            .get(&attachment.file_id)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(attachment.file_id.clone()))?;

        tokio::fs::write(dest, &data).await?;
        Ok(data.len() as u64)
    }

    async fn send_reply(&self, conversation_id: ConversationId, text: &str) -> TransportResult<()> {
        self.replies
            .lock()
            .unwrap()
            .push((conversation_id, text.to_string()));
        Ok(())
    }
}

/// Mock storage implementation that stores blobs in memory.
#[derive(Default)]
pub struct MockStorage {
    files: Mutex<HashMap<String, Vec<u8>>>,
    failing_key_fragments: Mutex<Vec<String>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make uploads fail for any key containing `fragment`.
    pub fn fail_uploads_matching(&self, fragment: &str) {
        self.failing_key_fragments
            .lock()
            .unwrap()
            .push(fragment.to_string());
    }

    pub fn has_file(&self, key: &str) -> bool {
        self.files.lock().unwrap().contains_key(key)
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        source: &Path,
        _content_type: &str,
    ) -> StorageResult<String> {
        let failing = self
            .failing_key_fragments
            .lock()
            .unwrap()
            .iter()
            .any(|fragment| storage_key.contains(fragment));
        if failing {
            return Err(StorageError::UploadFailed(
                "simulated network error".to_string(),
            ));
        }

        let data = tokio::fs::read(source)
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        self.files
            .lock()
            .unwrap()
            .insert(storage_key.to_string(), data);
        Ok(format!("https://example.com/{}", storage_key))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.files.lock().unwrap().remove(storage_key);
        Ok(())
    }
}

/// Mock catalog: records collected in memory.
#[derive(Default)]
pub struct MockCatalog {
    records: Mutex<Vec<CatalogRecord>>,
    failing: AtomicBool,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every create fail with a simulated backend error.
    pub fn fail_writes(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<CatalogRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl Catalog for MockCatalog {
    async fn create_record(&self, record: &CatalogRecord) -> CatalogResult<RecordId> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CatalogError::Request(
                "simulated backend error".to_string(),
            ));
        }

        let mut records = self.records.lock().unwrap();
        records.push(record.clone());
        Ok(RecordId(format!("rec-{}", records.len())))
    }
}
