//! Submission state machine.
//!
//! Reassembles one logical submission out of the ordered cover → metadata →
//! video message sequence. Every entry point returns a closed [`Outcome`]
//! set; order violations are explicit rejections that leave the stored
//! submission untouched, and unrelated chat text is ignored without a
//! reply.

use chrono::Utc;
use cinemateca_core::{caption, AttachmentRef, ConversationId, Submission, SubmissionStage};
use std::sync::Arc;

use crate::replies;
use crate::store::{StoreResult, SubmissionStore};

/// Decision for one inbound artifact event.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The expected artifact arrived; `reply` prompts for the next one.
    Accepted { reply: &'static str },
    /// Unrelated chat traffic; no state change, no reply.
    Ignored,
    /// Order violation; `reply` carries the guidance. The stored submission,
    /// if any, is unchanged.
    Rejected { reply: &'static str },
    /// The submission is complete; the snapshot is ready for the upload
    /// pipeline.
    ReadyForUpload(Submission),
}

/// Consumes artifact events against the submission store and decides
/// accept / reject / advance.
pub struct SubmissionStateMachine {
    store: Arc<dyn SubmissionStore>,
}

impl SubmissionStateMachine {
    pub fn new(store: Arc<dyn SubmissionStore>) -> Self {
        Self { store }
    }

    /// A cover starts a submission. A cover arriving while one is already in
    /// progress restarts the flow: the fresh submission replaces the old one
    /// at every stage.
    pub async fn on_cover(
        &self,
        conversation_id: ConversationId,
        attachment: AttachmentRef,
    ) -> StoreResult<Outcome> {
        let submission = Submission::new(conversation_id, attachment, Utc::now());
        self.store.put(submission).await?;
        Ok(Outcome::Accepted {
            reply: replies::COVER_RECEIVED,
        })
    }

    /// Text is only considered metadata when it carries a title label;
    /// anything else is unrelated chat and is ignored at every stage.
    /// Titled text while awaiting the video replaces the stored metadata.
    pub async fn on_text(
        &self,
        conversation_id: ConversationId,
        text: &str,
    ) -> StoreResult<Outcome> {
        if !caption::has_title_label(text) {
            return Ok(Outcome::Ignored);
        }

        let Some(mut submission) = self.store.get(conversation_id).await? else {
            return Ok(Outcome::Rejected {
                reply: replies::SEND_COVER_FIRST,
            });
        };

        match submission.stage {
            SubmissionStage::AwaitingMetadata | SubmissionStage::AwaitingVideo => {
                submission.metadata = Some(caption::parse(text));
                submission.stage = SubmissionStage::AwaitingVideo;
                self.store.put(submission).await?;
                Ok(Outcome::Accepted {
                    reply: replies::METADATA_RECEIVED,
                })
            }
            SubmissionStage::AwaitingCover | SubmissionStage::Complete => Ok(Outcome::Rejected {
                reply: replies::SEND_COVER_FIRST,
            }),
        }
    }

    pub async fn on_video(
        &self,
        conversation_id: ConversationId,
        attachment: AttachmentRef,
    ) -> StoreResult<Outcome> {
        let Some(mut submission) = self.store.get(conversation_id).await? else {
            return Ok(Outcome::Rejected {
                reply: replies::SEND_COVER_FIRST,
            });
        };

        match submission.stage {
            SubmissionStage::AwaitingVideo => {
                submission.video_ref = Some(attachment);
                submission.stage = SubmissionStage::Complete;
                self.store.put(submission.clone()).await?;
                Ok(Outcome::ReadyForUpload(submission))
            }
            SubmissionStage::AwaitingMetadata => Ok(Outcome::Rejected {
                reply: replies::SEND_METADATA_FIRST,
            }),
            SubmissionStage::AwaitingCover | SubmissionStage::Complete => Ok(Outcome::Rejected {
                reply: replies::SEND_COVER_FIRST,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemorySubmissionStore;

    const CHAT: ConversationId = ConversationId(42);
    const CAPTION: &str = "Título: Dune\nAno: 2021\nSinopse: Um herdeiro...";

    fn machine() -> (SubmissionStateMachine, Arc<InMemorySubmissionStore>) {
        let store = Arc::new(InMemorySubmissionStore::new());
        (SubmissionStateMachine::new(store.clone()), store)
    }

    #[tokio::test]
    async fn cover_on_empty_store_awaits_metadata() {
        let (machine, store) = machine();

        let outcome = machine.on_cover(CHAT, AttachmentRef::new("c")).await.unwrap();
        assert!(matches!(outcome, Outcome::Accepted { .. }));

        let submission = store.get(CHAT).await.unwrap().unwrap();
        assert_eq!(submission.stage, SubmissionStage::AwaitingMetadata);
    }

    #[tokio::test]
    async fn text_without_submission_is_rejected() {
        let (machine, store) = machine();

        let outcome = machine.on_text(CHAT, CAPTION).await.unwrap();
        assert!(matches!(
            outcome,
            Outcome::Rejected {
                reply: replies::SEND_COVER_FIRST
            }
        ));
        assert!(store.get(CHAT).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn untitled_text_is_ignored_without_mutation() {
        let (machine, store) = machine();
        machine.on_cover(CHAT, AttachmentRef::new("c")).await.unwrap();

        let outcome = machine.on_text(CHAT, "alguém viu esse filme?").await.unwrap();
        assert!(matches!(outcome, Outcome::Ignored));

        let submission = store.get(CHAT).await.unwrap().unwrap();
        assert_eq!(submission.stage, SubmissionStage::AwaitingMetadata);
        assert!(submission.metadata.is_none());
    }

    #[tokio::test]
    async fn titled_text_advances_to_awaiting_video() {
        let (machine, store) = machine();
        machine.on_cover(CHAT, AttachmentRef::new("c")).await.unwrap();

        let outcome = machine.on_text(CHAT, CAPTION).await.unwrap();
        assert!(matches!(outcome, Outcome::Accepted { .. }));

        let submission = store.get(CHAT).await.unwrap().unwrap();
        assert_eq!(submission.stage, SubmissionStage::AwaitingVideo);
        assert_eq!(submission.metadata.unwrap().title, "Dune");
    }

    #[tokio::test]
    async fn video_before_metadata_is_rejected_without_mutation() {
        let (machine, store) = machine();
        machine.on_cover(CHAT, AttachmentRef::new("c")).await.unwrap();

        let outcome = machine.on_video(CHAT, AttachmentRef::new("v")).await.unwrap();
        assert!(matches!(
            outcome,
            Outcome::Rejected {
                reply: replies::SEND_METADATA_FIRST
            }
        ));

        let submission = store.get(CHAT).await.unwrap().unwrap();
        assert_eq!(submission.stage, SubmissionStage::AwaitingMetadata);
        assert!(submission.video_ref.is_none());
    }

    #[tokio::test]
    async fn video_without_submission_is_rejected() {
        let (machine, store) = machine();

        let outcome = machine.on_video(CHAT, AttachmentRef::new("v")).await.unwrap();
        assert!(matches!(
            outcome,
            Outcome::Rejected {
                reply: replies::SEND_COVER_FIRST
            }
        ));
        assert!(store.get(CHAT).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn full_sequence_yields_ready_for_upload() {
        let (machine, _store) = machine();
        machine.on_cover(CHAT, AttachmentRef::new("c")).await.unwrap();
        machine.on_text(CHAT, CAPTION).await.unwrap();

        let outcome = machine.on_video(CHAT, AttachmentRef::new("v")).await.unwrap();
        let Outcome::ReadyForUpload(submission) = outcome else {
            panic!("expected ReadyForUpload");
        };

        assert_eq!(submission.stage, SubmissionStage::Complete);
        assert!(submission.cover_ref.is_some());
        assert!(submission.metadata.is_some());
        assert!(submission.video_ref.is_some());
    }

    #[tokio::test]
    async fn cover_restarts_an_in_progress_submission() {
        let (machine, store) = machine();
        machine.on_cover(CHAT, AttachmentRef::new("c1")).await.unwrap();
        machine.on_text(CHAT, CAPTION).await.unwrap();

        let outcome = machine.on_cover(CHAT, AttachmentRef::new("c2")).await.unwrap();
        assert!(matches!(outcome, Outcome::Accepted { .. }));

        let submission = store.get(CHAT).await.unwrap().unwrap();
        assert_eq!(submission.stage, SubmissionStage::AwaitingMetadata);
        assert!(submission.metadata.is_none());
        assert_eq!(submission.cover_ref.unwrap().file_id, "c2");
    }

    #[tokio::test]
    async fn titled_text_while_awaiting_video_replaces_metadata() {
        let (machine, store) = machine();
        machine.on_cover(CHAT, AttachmentRef::new("c")).await.unwrap();
        machine.on_text(CHAT, CAPTION).await.unwrap();

        let outcome = machine
            .on_text(CHAT, "Título: Duna Parte 2\nAno: 2024")
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Accepted { .. }));

        let submission = store.get(CHAT).await.unwrap().unwrap();
        assert_eq!(submission.stage, SubmissionStage::AwaitingVideo);
        assert_eq!(submission.metadata.unwrap().title, "Duna Parte 2");
    }
}
