//! Inbound events as delivered by the transport.

use cinemateca_core::{AttachmentRef, ConversationId};

/// One discrete message from a conversation, already classified by artifact
/// type. Binary payloads stay behind their [`AttachmentRef`] until the
/// upload coordinator resolves them.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    Cover {
        conversation_id: ConversationId,
        attachment: AttachmentRef,
    },
    Text {
        conversation_id: ConversationId,
        text: String,
    },
    Video {
        conversation_id: ConversationId,
        attachment: AttachmentRef,
    },
}

impl InboundEvent {
    pub fn conversation_id(&self) -> ConversationId {
        match self {
            InboundEvent::Cover {
                conversation_id, ..
            }
            | InboundEvent::Text {
                conversation_id, ..
            }
            | InboundEvent::Video {
                conversation_id, ..
            } => *conversation_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            InboundEvent::Cover { .. } => "cover",
            InboundEvent::Text { .. } => "text",
            InboundEvent::Video { .. } => "video",
        }
    }
}
