//! Update polling loop.
//!
//! Pulls updates off the Bot API, classifies each message as a cover, a
//! metadata text or a video, and hands the resulting events to the pipeline.
//! The update offset is advanced past every update seen, including ones that
//! produce no event, so nothing is redelivered.

use cinemateca_core::{AttachmentRef, ConversationId};
use cinemateca_ingest::{InboundEvent, Pipeline};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::api::{Message, Update};
use crate::client::TelegramClient;

/// Pause after a failed poll before retrying.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

pub struct UpdatePoller {
    client: TelegramClient,
    pipeline: Arc<Pipeline>,
}

impl UpdatePoller {
    pub fn new(client: TelegramClient, pipeline: Arc<Pipeline>) -> Self {
        Self { client, pipeline }
    }

    /// Poll until a shutdown signal arrives. Events are dispatched to the
    /// pipeline in delivery order; the pipeline chains events of one
    /// conversation so they are processed in that order even though each
    /// runs on its own task.
    pub async fn run(&self, mut shutdown_rx: mpsc::Receiver<()>) {
        // Messages sent while the service was down are stale artifacts for
        // submissions that no longer exist; skip them.
        let mut offset = match self.client.drop_pending_updates().await {
            Ok(offset) => offset,
            Err(e) => {
                tracing::warn!(error = %e, "Could not drop pending updates");
                None
            }
        };

        tracing::info!("Update poller started");

        loop {
            let updates = tokio::select! {
                result = self.client.get_updates(offset) => result,
                _ = shutdown_rx.recv() => break,
            };

            let updates = match updates {
                Ok(updates) => updates,
                Err(e) => {
                    tracing::warn!(error = %e, "Polling for updates failed, retrying");
                    tokio::select! {
                        _ = tokio::time::sleep(POLL_RETRY_DELAY) => continue,
                        _ = shutdown_rx.recv() => break,
                    }
                }
            };

            for update in updates {
                offset = Some(update.update_id + 1);

                if let Some(event) = event_from_update(&update) {
                    self.pipeline.clone().dispatch(event);
                }
            }
        }

        tracing::info!("Update poller stopped");
    }
}

/// Classify one update. Returns `None` for updates that carry no message,
/// bot commands and payload types the service does not handle.
fn event_from_update(update: &Update) -> Option<InboundEvent> {
    let message = update.message.as_ref()?;
    let conversation_id = ConversationId(message.chat.id);

    if let Some(attachment) = cover_attachment(message) {
        return Some(InboundEvent::Cover {
            conversation_id,
            attachment,
        });
    }

    if let Some(attachment) = video_attachment(message) {
        return Some(InboundEvent::Video {
            conversation_id,
            attachment,
        });
    }

    if let Some(text) = &message.text {
        if text.starts_with('/') {
            return None;
        }
        return Some(InboundEvent::Text {
            conversation_id,
            text: text.clone(),
        });
    }

    None
}

/// The largest rendition of a photo message. The Bot API lists renditions
/// smallest first.
fn cover_attachment(message: &Message) -> Option<AttachmentRef> {
    let photo = message.photo.as_ref()?.last()?;
    Some(AttachmentRef::new(&photo.file_id))
}

/// A native video, or a document whose mime type marks it as one.
fn video_attachment(message: &Message) -> Option<AttachmentRef> {
    if let Some(video) = &message.video {
        return Some(AttachmentRef {
            file_id: video.file_id.clone(),
            file_name: video.file_name.clone(),
            content_type: video.mime_type.clone(),
        });
    }

    let document = message.document.as_ref()?;
    let mime = document.mime_type.as_deref()?;
    if !mime.starts_with("video/") {
        return None;
    }

    Some(AttachmentRef {
        file_id: document.file_id.clone(),
        file_name: document.file_name.clone(),
        content_type: document.mime_type.clone(),
    })
}
