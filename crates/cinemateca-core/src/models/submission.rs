use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use super::metadata::ParsedMetadata;

/// Identifier of the chat context a submission originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub i64);

impl Display for ConversationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// Opaque transport handle for an attachment that has not been retrieved yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// Transport-side file identifier used to resolve the bytes.
    pub file_id: String,
    /// Original file name as reported by the transport, if any.
    pub file_name: Option<String>,
    /// Mime type as reported by the transport, if any.
    pub content_type: Option<String>,
}

impl AttachmentRef {
    pub fn new(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            file_name: None,
            content_type: None,
        }
    }

    /// File extension from the reported file name, lowercased, without the dot.
    /// Falls back to `default` when the name is absent or has no extension.
    pub fn extension_or(&self, default: &str) -> String {
        self.file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    pub fn content_type_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.content_type.as_deref().unwrap_or(default)
    }
}

/// Where a submission stands in the cover → metadata → video sequence.
///
/// `AwaitingCover` is only ever observed as "no store entry": the first valid
/// cover creates the entry directly at `AwaitingMetadata`. `Complete` is
/// terminal and is cleared by the orchestrator as soon as the pipeline run
/// finishes, successfully or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStage {
    AwaitingCover,
    AwaitingMetadata,
    AwaitingVideo,
    Complete,
}

impl Display for SubmissionStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SubmissionStage::AwaitingCover => write!(f, "awaiting_cover"),
            SubmissionStage::AwaitingMetadata => write!(f, "awaiting_metadata"),
            SubmissionStage::AwaitingVideo => write!(f, "awaiting_video"),
            SubmissionStage::Complete => write!(f, "complete"),
        }
    }
}

/// In-progress aggregate of artifacts + metadata for one conversation.
///
/// At most one lives per conversation at a time; the submission store owns
/// its lifetime and everything downstream works on snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub conversation_id: ConversationId,
    pub stage: SubmissionStage,
    pub cover_ref: Option<AttachmentRef>,
    pub metadata: Option<ParsedMetadata>,
    pub video_ref: Option<AttachmentRef>,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    /// New submission created on receipt of a cover image.
    pub fn new(
        conversation_id: ConversationId,
        cover_ref: AttachmentRef,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            conversation_id,
            stage: SubmissionStage::AwaitingMetadata,
            cover_ref: Some(cover_ref),
            metadata: None,
            video_ref: None,
            created_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: std::time::Duration) -> bool {
        let ttl = Duration::from_std(ttl).unwrap_or(Duration::MAX);
        now - self.created_at > ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    fn sample_ref() -> AttachmentRef {
        AttachmentRef::new("file-1")
    }

    #[test]
    fn new_submission_awaits_metadata() {
        let sub = Submission::new(ConversationId(42), sample_ref(), Utc::now());
        assert_eq!(sub.stage, SubmissionStage::AwaitingMetadata);
        assert!(sub.cover_ref.is_some());
        assert!(sub.metadata.is_none());
        assert!(sub.video_ref.is_none());
    }

    #[test]
    fn expiry_is_ttl_scoped() {
        let created = Utc::now();
        let sub = Submission::new(ConversationId(1), sample_ref(), created);
        let ttl = StdDuration::from_secs(3600);

        assert!(!sub.is_expired(created + Duration::seconds(3599), ttl));
        assert!(sub.is_expired(created + Duration::seconds(3601), ttl));
    }

    #[test]
    fn extension_falls_back_to_default() {
        let mut attachment = AttachmentRef::new("f");
        assert_eq!(attachment.extension_or("mp4"), "mp4");

        attachment.file_name = Some("Filme.Final.MKV".to_string());
        assert_eq!(attachment.extension_or("mp4"), "mkv");

        attachment.file_name = Some("semextensao".to_string());
        assert_eq!(attachment.extension_or("mp4"), "mp4");
    }
}
