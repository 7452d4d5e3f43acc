//! Chat transport boundary.

use async_trait::async_trait;
use cinemateca_core::{AttachmentRef, ConversationId};
use std::path::Path;
use thiserror::Error;

/// Transport operation errors
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Attachment not found: {0}")]
    NotFound(String),

    #[error("Transport request failed: {0}")]
    Request(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Chat transport abstraction
///
/// Resolves attachment references to bytes and delivers replies. Network
/// timeouts are the implementation's responsibility; callers treat any
/// error as fatal for the current pipeline run.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Retrieve an attachment's bytes into `dest`. Returns the number of
    /// bytes written.
    async fn download_attachment(
        &self,
        attachment: &AttachmentRef,
        dest: &Path,
    ) -> TransportResult<u64>;

    /// Send a text reply to the originating conversation.
    async fn send_reply(&self, conversation_id: ConversationId, text: &str) -> TransportResult<()>;
}
