//! Pipeline orchestrator.
//!
//! Drives one inbound event end to end: allow-list gate, per-conversation
//! serialization, state machine, and (on a completed submission) upload
//! plus publish. After a pipeline run the submission entry is always
//! removed, success or failure, so a conversation can never get stuck; the
//! user is told which stage failed and restarts the three-message sequence.
//!
//! Delivery order within one conversation is fixed at [`Pipeline::dispatch`]
//! time, before any task is spawned: each dispatched event chains onto the
//! completion of the previous event for its conversation, so events are
//! processed in dispatch order no matter how the spawned tasks are
//! scheduled. Distinct conversations never wait on each other.

use chrono::Utc;
use cinemateca_catalog::{Catalog, CatalogError, RecordId};
use cinemateca_core::{CatalogRecord, ConversationId, Submission};
use cinemateca_storage::Storage;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use thiserror::Error;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::sync::{oneshot, Mutex as AsyncMutex};
use tokio::task::JoinHandle;

use crate::event::InboundEvent;
use crate::replies;
use crate::state::{Outcome, SubmissionStateMachine};
use crate::store::SubmissionStore;
use crate::transport::Transport;
use crate::upload::{UploadCoordinator, UploadError};

/// Above this many tracked conversations, idle per-key locks are pruned.
const LOCK_PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Catalog write failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Submission reached the upload phase without metadata")]
    Incomplete,
}

/// Per-conversation async mutexes guarding mutual exclusion for callers
/// that invoke [`Pipeline::handle_event`] directly; distinct keys never
/// contend. Ordering is not their job, [`ConversationChains`] owns that.
#[derive(Default)]
struct ConversationLocks {
    locks: StdMutex<HashMap<ConversationId, Arc<AsyncMutex<()>>>>,
}

impl ConversationLocks {
    fn lock_for(&self, conversation_id: ConversationId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if locks.len() > LOCK_PRUNE_THRESHOLD {
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        locks.entry(conversation_id).or_default().clone()
    }
}

/// Per-conversation completion chains. `chain` swaps a fresh completion
/// slot into the map and hands back the previous event's receiver; a
/// dispatched task awaits that receiver before touching any state, so the
/// position in the chain (taken synchronously, in the caller's delivery
/// order) decides processing order, not task scheduling.
#[derive(Default)]
struct ConversationChains {
    tails: StdMutex<HashMap<ConversationId, oneshot::Receiver<()>>>,
}

impl ConversationChains {
    fn chain(
        &self,
        conversation_id: ConversationId,
    ) -> (Option<oneshot::Receiver<()>>, oneshot::Sender<()>) {
        let (done_tx, done_rx) = oneshot::channel();
        let mut tails = self.tails.lock().unwrap_or_else(|e| e.into_inner());
        if tails.len() > LOCK_PRUNE_THRESHOLD {
            // Entries whose task has finished (sent or dropped) are idle.
            tails.retain(|_, rx| matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        }
        let predecessor = tails.insert(conversation_id, done_rx);
        (predecessor, done_tx)
    }
}

/// Wires store, state machine, upload coordinator and publisher per inbound
/// event.
pub struct Pipeline {
    state: SubmissionStateMachine,
    store: Arc<dyn SubmissionStore>,
    uploader: UploadCoordinator,
    catalog: Arc<dyn Catalog>,
    transport: Arc<dyn Transport>,
    allowed_conversation: Option<ConversationId>,
    locks: ConversationLocks,
    chains: ConversationChains,
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn SubmissionStore>,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn Storage>,
        catalog: Arc<dyn Catalog>,
        allowed_conversation: Option<ConversationId>,
    ) -> Self {
        Self {
            state: SubmissionStateMachine::new(store.clone()),
            store,
            uploader: UploadCoordinator::new(transport.clone(), storage),
            catalog,
            transport,
            allowed_conversation,
            locks: ConversationLocks::default(),
            chains: ConversationChains::default(),
        }
    }

    /// Queue one inbound event and return immediately. The chain slot is
    /// taken synchronously, so calling this in transport delivery order
    /// guarantees processing order within each conversation; events for
    /// distinct conversations run in parallel.
    pub fn dispatch(self: Arc<Self>, event: InboundEvent) -> JoinHandle<()> {
        let (predecessor, done) = self.chains.chain(event.conversation_id());
        let pipeline = self;
        tokio::spawn(async move {
            if let Some(predecessor) = predecessor {
                // A dropped sender releases the slot too.
                let _ = predecessor.await;
            }
            pipeline.handle_event(event).await;
            let _ = done.send(());
        })
    }

    /// Process one inbound event to completion, including the upload and
    /// publish phases when the event completes a submission.
    pub async fn handle_event(&self, event: InboundEvent) {
        let conversation_id = event.conversation_id();

        if !self.conversation_allowed(conversation_id) {
            tracing::debug!(
                conversation = %conversation_id,
                kind = event.kind(),
                "Event from non-allow-listed conversation skipped"
            );
            return;
        }

        let lock = self.locks.lock_for(conversation_id);
        let _guard = lock.lock().await;

        tracing::debug!(conversation = %conversation_id, kind = event.kind(), "Processing event");

        let outcome = match &event {
            InboundEvent::Cover { attachment, .. } => {
                self.state.on_cover(conversation_id, attachment.clone()).await
            }
            InboundEvent::Text { text, .. } => self.state.on_text(conversation_id, text).await,
            InboundEvent::Video { attachment, .. } => {
                self.state.on_video(conversation_id, attachment.clone()).await
            }
        };

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(conversation = %conversation_id, error = %e, "Submission store failure");
                self.reply(conversation_id, replies::INTERNAL_ERROR).await;
                return;
            }
        };

        match outcome {
            Outcome::Accepted { reply } | Outcome::Rejected { reply } => {
                self.reply(conversation_id, reply).await;
            }
            Outcome::Ignored => {}
            Outcome::ReadyForUpload(submission) => {
                self.run_publication(submission).await;
            }
        }
    }

    fn conversation_allowed(&self, conversation_id: ConversationId) -> bool {
        match self.allowed_conversation {
            Some(allowed) => allowed == conversation_id,
            None => true,
        }
    }

    async fn run_publication(&self, submission: Submission) {
        let conversation_id = submission.conversation_id;
        self.reply(conversation_id, replies::SAVING).await;

        let result = self.publish(&submission).await;

        // The entry goes away whether or not the run succeeded, so the
        // conversation can always start over.
        if let Err(e) = self.store.remove(conversation_id).await {
            tracing::error!(
                conversation = %conversation_id,
                error = %e,
                "Failed to clear submission after pipeline run"
            );
        }

        match result {
            Ok(record_id) => {
                tracing::info!(
                    conversation = %conversation_id,
                    record_id = %record_id,
                    "Submission published"
                );
                self.reply(conversation_id, replies::SAVED).await;
            }
            Err(PipelineError::Catalog(e)) => {
                // Both uploads already succeeded: the blobs are stranded with
                // no record referencing them.
                tracing::error!(
                    conversation = %conversation_id,
                    error = %e,
                    "Catalog write failed after successful uploads; uploaded blobs are unreferenced"
                );
                self.reply(conversation_id, replies::PUBLISH_FAILED).await;
            }
            Err(PipelineError::Upload(e)) => {
                tracing::error!(conversation = %conversation_id, error = %e, "Upload phase failed");
                let reply = e.user_reply();
                self.reply(conversation_id, reply).await;
            }
            Err(PipelineError::Incomplete) => {
                tracing::error!(conversation = %conversation_id, "Submission missing metadata at upload");
                self.reply(conversation_id, replies::INTERNAL_ERROR).await;
            }
        }
    }

    async fn publish(&self, submission: &Submission) -> Result<RecordId, PipelineError> {
        let Some(metadata) = submission.metadata.clone() else {
            return Err(PipelineError::Incomplete);
        };

        let artifacts = self.uploader.upload(submission).await?;
        let record = CatalogRecord::new(
            metadata,
            artifacts.cover_url,
            artifacts.video_url,
            Utc::now(),
        );
        let record_id = self.catalog.create_record(&record).await?;
        Ok(record_id)
    }

    async fn reply(&self, conversation_id: ConversationId, text: &str) {
        if let Err(e) = self.transport.send_reply(conversation_id, text).await {
            tracing::warn!(conversation = %conversation_id, error = %e, "Failed to send reply");
        }
    }
}
