//! HTTP client for the Telegram Bot API.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::api::{ApiResponse, File, Update};

const API_HOST: &str = "https://api.telegram.org";

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Bot API rejected the call: {0}")]
    Api(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("File {0} has no download path")]
    FileUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TelegramResult<T> = Result<T, TelegramError>;

/// Bot API client with long-poll support.
///
/// The HTTP timeout is sized to sit above the long-poll window so a quiet
/// `getUpdates` call returns normally instead of erroring.
#[derive(Clone, Debug)]
pub struct TelegramClient {
    client: reqwest::Client,
    api_base: String,
    file_base: String,
    poll_timeout: Duration,
}

impl TelegramClient {
    pub fn new(bot_token: &str, poll_timeout: Duration) -> TelegramResult<Self> {
        Self::with_host(API_HOST, bot_token, poll_timeout)
    }

    /// Point the client at a different host. Used by tests.
    pub fn with_host(host: &str, bot_token: &str, poll_timeout: Duration) -> TelegramResult<Self> {
        let host = host.trim_end_matches('/');
        let client = reqwest::Client::builder()
            .timeout(poll_timeout + Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            api_base: format!("{}/bot{}", host, bot_token),
            file_base: format!("{}/file/bot{}", host, bot_token),
            poll_timeout,
        })
    }

    /// Long-poll for updates newer than `offset`. Returns an empty vec when
    /// the poll window elapses without traffic.
    pub async fn get_updates(&self, offset: Option<i64>) -> TelegramResult<Vec<Update>> {
        self.get_updates_with(offset, self.poll_timeout.as_secs())
            .await
    }

    /// Discard updates queued while the service was down. Returns the offset
    /// just past the newest pending update, or `None` when the queue is
    /// empty.
    pub async fn drop_pending_updates(&self) -> TelegramResult<Option<i64>> {
        // Offset -1 returns only the newest pending update.
        let updates = self.get_updates_with(Some(-1), 0).await?;
        Ok(updates.last().map(|update| update.update_id + 1))
    }

    async fn get_updates_with(
        &self,
        offset: Option<i64>,
        timeout: u64,
    ) -> TelegramResult<Vec<Update>> {
        #[derive(Serialize)]
        struct GetUpdates {
            timeout: u64,
            #[serde(skip_serializing_if = "Option::is_none")]
            offset: Option<i64>,
            allowed_updates: &'static [&'static str],
        }

        self.call(
            "getUpdates",
            &GetUpdates {
                timeout,
                offset,
                allowed_updates: &["message"],
            },
        )
        .await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> TelegramResult<()> {
        #[derive(Serialize)]
        struct SendMessage<'a> {
            chat_id: i64,
            text: &'a str,
        }

        let _: serde_json::Value = self
            .call("sendMessage", &SendMessage { chat_id, text })
            .await?;
        Ok(())
    }

    pub async fn get_file(&self, file_id: &str) -> TelegramResult<File> {
        #[derive(Serialize)]
        struct GetFile<'a> {
            file_id: &'a str,
        }

        self.call("getFile", &GetFile { file_id }).await
    }

    /// Stream a file to `dest` given the path from [`TelegramClient::get_file`].
    /// Returns the number of bytes written.
    pub async fn download_file(&self, file_path: &str, dest: &Path) -> TelegramResult<u64> {
        let url = format!("{}/{}", self.file_base, file_path);
        let mut response = self.client.get(&url).send().await?.error_for_status()?;

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }

    async fn call<T: DeserializeOwned, B: Serialize>(
        &self,
        method: &str,
        body: &B,
    ) -> TelegramResult<T> {
        let url = format!("{}/{}", self.api_base, method);
        let response: ApiResponse<T> = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            return Err(TelegramError::Api(
                response
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        response
            .result
            .ok_or_else(|| TelegramError::Api("response missing result".to_string()))
    }
}
