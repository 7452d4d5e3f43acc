//! [`Transport`] implementation over the Bot API client.

use async_trait::async_trait;
use cinemateca_core::{AttachmentRef, ConversationId};
use cinemateca_ingest::{Transport, TransportError, TransportResult};
use std::path::Path;

use crate::client::{TelegramClient, TelegramError};

pub struct TelegramTransport {
    client: TelegramClient,
}

impl TelegramTransport {
    pub fn new(client: TelegramClient) -> Self {
        Self { client }
    }
}

fn map_err(e: TelegramError) -> TransportError {
    match e {
        TelegramError::FileUnavailable(file_id) => TransportError::NotFound(file_id),
        TelegramError::Io(e) => TransportError::Io(e),
        other => TransportError::Request(other.to_string()),
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn download_attachment(
        &self,
        attachment: &AttachmentRef,
        dest: &Path,
    ) -> TransportResult<u64> {
        let file = self
            .client
            .get_file(&attachment.file_id)
            .await
            .map_err(map_err)?;
        let file_path = file
            .file_path
            .ok_or_else(|| TelegramError::FileUnavailable(attachment.file_id.clone()))
            .map_err(map_err)?;

        self.client
            .download_file(&file_path, dest)
            .await
            .map_err(map_err)
    }

    async fn send_reply(&self, conversation_id: ConversationId, text: &str) -> TransportResult<()> {
        self.client
            .send_message(conversation_id.0, text)
            .await
            .map_err(map_err)
    }
}
