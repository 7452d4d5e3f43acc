//! End-to-end pipeline tests with mock collaborators.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use cinemateca_core::{AttachmentRef, ConversationId, Submission, SubmissionStage};
use cinemateca_ingest::replies;
use cinemateca_ingest::test_helpers::{MockCatalog, MockStorage, MockTransport};
use cinemateca_ingest::{InMemorySubmissionStore, InboundEvent, Pipeline, SubmissionStore};

const CHAT: ConversationId = ConversationId(42);
const CAPTION: &str = "Título: Dune\nAno: 2021\nGêneros: Ficção\nSinopse: Um herdeiro...";

struct Harness {
    pipeline: Arc<Pipeline>,
    transport: Arc<MockTransport>,
    storage: Arc<MockStorage>,
    catalog: Arc<MockCatalog>,
    store: Arc<InMemorySubmissionStore>,
}

fn harness(allowed: Option<ConversationId>) -> Harness {
    let store = Arc::new(InMemorySubmissionStore::new());
    let transport = Arc::new(MockTransport::new());
    let storage = Arc::new(MockStorage::new());
    let catalog = Arc::new(MockCatalog::new());

    transport.set_attachment("cover-file", b"jpg bytes".to_vec());
    transport.set_attachment("video-file", b"mp4 bytes".to_vec());

    let pipeline = Arc::new(Pipeline::new(
        store.clone(),
        transport.clone(),
        storage.clone(),
        catalog.clone(),
        allowed,
    ));

    Harness {
        pipeline,
        transport,
        storage,
        catalog,
        store,
    }
}

fn cover_event() -> InboundEvent {
    InboundEvent::Cover {
        conversation_id: CHAT,
        attachment: AttachmentRef::new("cover-file"),
    }
}

fn text_event(text: &str) -> InboundEvent {
    InboundEvent::Text {
        conversation_id: CHAT,
        text: text.to_string(),
    }
}

fn video_event() -> InboundEvent {
    InboundEvent::Video {
        conversation_id: CHAT,
        attachment: AttachmentRef::new("video-file"),
    }
}

#[tokio::test]
async fn round_trip_publishes_one_record_and_clears_store() {
    let h = harness(None);

    h.pipeline.handle_event(cover_event()).await;
    h.pipeline.handle_event(text_event(CAPTION)).await;
    h.pipeline.handle_event(video_event()).await;

    assert_eq!(h.catalog.record_count(), 1);
    let record = &h.catalog.records()[0];
    assert_eq!(record.title, "Dune");
    assert_eq!(record.year.as_deref(), Some("2021"));
    assert!(record.cover_url.contains("cover.jpg"));
    assert!(record.video_url.contains("video.mp4"));

    // Entry consumed; a new sequence can start from scratch.
    assert!(h.store.get(CHAT).await.unwrap().is_none());

    let replies = h.transport.replies_for(CHAT);
    assert_eq!(replies.last().map(String::as_str), Some(replies::SAVED));
}

#[tokio::test]
async fn untitled_text_is_silently_ignored() {
    let h = harness(None);

    h.pipeline.handle_event(cover_event()).await;
    let replies_after_cover = h.transport.replies_for(CHAT).len();

    h.pipeline
        .handle_event(text_event("alguém já assistiu esse?"))
        .await;

    // No reply of any kind and the stored submission is untouched.
    assert_eq!(h.transport.replies_for(CHAT).len(), replies_after_cover);
    let submission = h.store.get(CHAT).await.unwrap().unwrap();
    assert_eq!(submission.stage, SubmissionStage::AwaitingMetadata);
}

#[tokio::test]
async fn video_before_metadata_is_rejected() {
    let h = harness(None);

    h.pipeline.handle_event(cover_event()).await;
    h.pipeline.handle_event(video_event()).await;

    let replies = h.transport.replies_for(CHAT);
    assert_eq!(
        replies.last().map(String::as_str),
        Some(replies::SEND_METADATA_FIRST)
    );

    let submission = h.store.get(CHAT).await.unwrap().unwrap();
    assert_eq!(submission.stage, SubmissionStage::AwaitingMetadata);
    assert_eq!(h.catalog.record_count(), 0);
}

#[tokio::test]
async fn video_without_any_submission_is_rejected() {
    let h = harness(None);

    h.pipeline.handle_event(video_event()).await;

    assert!(h.store.is_empty());
    let replies = h.transport.replies_for(CHAT);
    assert_eq!(
        replies.last().map(String::as_str),
        Some(replies::SEND_COVER_FIRST)
    );
}

#[tokio::test]
async fn video_upload_failure_clears_submission_and_reports_once() {
    let h = harness(None);
    h.storage.fail_uploads_matching("video");

    h.pipeline.handle_event(cover_event()).await;
    h.pipeline.handle_event(text_event(CAPTION)).await;
    h.pipeline.handle_event(video_event()).await;

    assert_eq!(h.catalog.record_count(), 0);
    assert!(h.store.get(CHAT).await.unwrap().is_none());

    let failure_replies = h
        .transport
        .replies_for(CHAT)
        .iter()
        .filter(|r| r.as_str() == replies::VIDEO_UPLOAD_FAILED)
        .count();
    assert_eq!(failure_replies, 1);

    // The cover blob was removed when the video leg failed.
    assert_eq!(h.storage.file_count(), 0);
}

#[tokio::test]
async fn cover_retrieval_failure_uploads_nothing() {
    let h = harness(None);
    h.transport.fail_download("cover-file");

    h.pipeline.handle_event(cover_event()).await;
    h.pipeline.handle_event(text_event(CAPTION)).await;
    h.pipeline.handle_event(video_event()).await;

    assert_eq!(h.storage.file_count(), 0);
    assert_eq!(h.catalog.record_count(), 0);
    assert!(h.store.get(CHAT).await.unwrap().is_none());

    let replies = h.transport.replies_for(CHAT);
    assert_eq!(
        replies.last().map(String::as_str),
        Some(replies::COVER_UPLOAD_FAILED)
    );
}

#[tokio::test]
async fn catalog_failure_strands_uploads_and_clears_submission() {
    let h = harness(None);
    h.catalog.fail_writes();

    h.pipeline.handle_event(cover_event()).await;
    h.pipeline.handle_event(text_event(CAPTION)).await;
    h.pipeline.handle_event(video_event()).await;

    // Both uploads landed but no record exists.
    assert_eq!(h.storage.file_count(), 2);
    assert_eq!(h.catalog.record_count(), 0);
    assert!(h.store.get(CHAT).await.unwrap().is_none());

    let replies = h.transport.replies_for(CHAT);
    assert_eq!(
        replies.last().map(String::as_str),
        Some(replies::PUBLISH_FAILED)
    );
}

#[tokio::test]
async fn events_from_other_conversations_are_skipped() {
    let h = harness(Some(ConversationId(7)));

    h.pipeline.handle_event(cover_event()).await;

    assert!(h.store.is_empty());
    assert!(h.transport.replies().is_empty());
}

#[tokio::test]
async fn expired_submission_behaves_as_absent_after_sweep() {
    let h = harness(None);

    // Submission created 25h ago, TTL 24h.
    h.store
        .put(Submission::new(
            CHAT,
            AttachmentRef::new("cover-file"),
            Utc::now() - ChronoDuration::hours(25),
        ))
        .await
        .unwrap();

    let removed = h
        .store
        .sweep_expired(Utc::now(), Duration::from_secs(24 * 60 * 60))
        .await
        .unwrap();
    assert_eq!(removed, 1);

    h.pipeline.handle_event(video_event()).await;

    let replies = h.transport.replies_for(CHAT);
    assert_eq!(
        replies.last().map(String::as_str),
        Some(replies::SEND_COVER_FIRST)
    );
}

#[tokio::test]
async fn resubmission_creates_a_second_record() {
    let h = harness(None);

    for _ in 0..2 {
        h.pipeline.handle_event(cover_event()).await;
        h.pipeline.handle_event(text_event(CAPTION)).await;
        h.pipeline.handle_event(video_event()).await;
    }

    // No dedup: same title published twice yields two records.
    assert_eq!(h.catalog.record_count(), 2);
    assert_ne!(
        h.catalog.records()[0].cover_url,
        h.catalog.records()[1].cover_url
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dispatch_preserves_delivery_order_within_a_conversation() {
    // Cover and titled text dispatched back to back, as one poll batch
    // delivers them. Whatever order the spawned tasks are scheduled in,
    // the text must never be processed before the cover it followed.
    for _ in 0..200 {
        let h = harness(None);

        let first = h.pipeline.clone().dispatch(cover_event());
        let second = h.pipeline.clone().dispatch(text_event(CAPTION));
        let third = h.pipeline.clone().dispatch(video_event());
        first.await.unwrap();
        second.await.unwrap();
        third.await.unwrap();

        assert_eq!(h.catalog.record_count(), 1);
        assert!(h.store.get(CHAT).await.unwrap().is_none());
        assert!(
            !h.transport
                .replies_for(CHAT)
                .iter()
                .any(|reply| reply == replies::SEND_COVER_FIRST),
            "in-order events were processed out of order"
        );
    }
}

#[tokio::test]
async fn concurrent_conversations_do_not_interfere() {
    let h = harness(None);
    let other = ConversationId(99);

    h.pipeline.handle_event(cover_event()).await;
    h.pipeline
        .handle_event(InboundEvent::Cover {
            conversation_id: other,
            attachment: AttachmentRef::new("cover-file"),
        })
        .await;
    h.pipeline.handle_event(text_event(CAPTION)).await;

    let mine = h.store.get(CHAT).await.unwrap().unwrap();
    let theirs = h.store.get(other).await.unwrap().unwrap();
    assert_eq!(mine.stage, SubmissionStage::AwaitingVideo);
    assert_eq!(theirs.stage, SubmissionStage::AwaitingMetadata);
}
