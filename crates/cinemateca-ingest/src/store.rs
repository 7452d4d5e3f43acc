//! Submission store: one in-progress submission per conversation.
//!
//! The store exclusively owns submission lifetime. It is injected as a
//! trait so the in-memory map can be swapped for an external keyed store
//! when scaling across processes; per-key event serialization is the
//! orchestrator's job, the store only has to keep individual map
//! operations consistent.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cinemateca_core::{ConversationId, Submission};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

/// Submission store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Submission store backend error: {0}")]
    Backend(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Keyed store of in-progress submissions.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Fetch the submission for a conversation. Unknown keys are `Ok(None)`.
    async fn get(&self, conversation_id: ConversationId) -> StoreResult<Option<Submission>>;

    /// Insert or replace the submission for its conversation.
    async fn put(&self, submission: Submission) -> StoreResult<()>;

    /// Remove the submission for a conversation, if any.
    async fn remove(&self, conversation_id: ConversationId) -> StoreResult<()>;

    /// Evict submissions older than `ttl`. Returns how many were removed.
    async fn sweep_expired(&self, now: DateTime<Utc>, ttl: Duration) -> StoreResult<usize>;
}

/// In-memory submission store backed by a mutex-guarded map. The lock is
/// held only for the map operation, never across I/O.
#[derive(Default)]
pub struct InMemorySubmissionStore {
    entries: Mutex<HashMap<ConversationId, Submission>>,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ConversationId, Submission>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[async_trait]
impl SubmissionStore for InMemorySubmissionStore {
    async fn get(&self, conversation_id: ConversationId) -> StoreResult<Option<Submission>> {
        Ok(self.lock().get(&conversation_id).cloned())
    }

    async fn put(&self, submission: Submission) -> StoreResult<()> {
        self.lock().insert(submission.conversation_id, submission);
        Ok(())
    }

    async fn remove(&self, conversation_id: ConversationId) -> StoreResult<()> {
        self.lock().remove(&conversation_id);
        Ok(())
    }

    async fn sweep_expired(&self, now: DateTime<Utc>, ttl: Duration) -> StoreResult<usize> {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, submission| !submission.is_expired(now, ttl));
        Ok(before - entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use cinemateca_core::AttachmentRef;

    fn submission(id: i64, created_at: DateTime<Utc>) -> Submission {
        Submission::new(ConversationId(id), AttachmentRef::new("cover"), created_at)
    }

    #[tokio::test]
    async fn get_unknown_key_is_absent() {
        let store = InMemorySubmissionStore::new();
        assert!(store.get(ConversationId(7)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_get_remove_round_trip() {
        let store = InMemorySubmissionStore::new();
        store.put(submission(42, Utc::now())).await.unwrap();

        let fetched = store.get(ConversationId(42)).await.unwrap().unwrap();
        assert_eq!(fetched.conversation_id, ConversationId(42));

        store.remove(ConversationId(42)).await.unwrap();
        assert!(store.get(ConversationId(42)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_replaces_existing_entry() {
        let store = InMemorySubmissionStore::new();
        let first = Utc::now() - ChronoDuration::hours(1);
        store.put(submission(1, first)).await.unwrap();
        store.put(submission(1, Utc::now())).await.unwrap();

        assert_eq!(store.len(), 1);
        let fetched = store.get(ConversationId(1)).await.unwrap().unwrap();
        assert!(fetched.created_at > first);
    }

    #[tokio::test]
    async fn sweep_removes_only_expired_entries() {
        let store = InMemorySubmissionStore::new();
        let now = Utc::now();
        store
            .put(submission(1, now - ChronoDuration::hours(25)))
            .await
            .unwrap();
        store
            .put(submission(2, now - ChronoDuration::hours(1)))
            .await
            .unwrap();

        let removed = store
            .sweep_expired(now, Duration::from_secs(24 * 60 * 60))
            .await
            .unwrap();

        assert_eq!(removed, 1);
        assert!(store.get(ConversationId(1)).await.unwrap().is_none());
        assert!(store.get(ConversationId(2)).await.unwrap().is_some());
    }
}
