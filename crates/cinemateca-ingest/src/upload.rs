//! Upload coordinator: completed submission → two blob-store URLs.
//!
//! Strictly sequential, cover before video, so a cover failure never leaves
//! a video upload in flight. Artifact bytes are staged in a scoped temp
//! directory that is released on drop whatever the outcome, and streamed
//! from there into the blob store. Keys are namespaced by a record id
//! generated fresh per run. When the video leg fails after the cover
//! landed, the cover blob is removed best-effort so a failed run leaves
//! nothing behind in the store.

use cinemateca_core::constants::{
    COVER_CONTENT_TYPE, DEFAULT_COVER_EXTENSION, DEFAULT_VIDEO_CONTENT_TYPE,
    DEFAULT_VIDEO_EXTENSION,
};
use cinemateca_core::{AttachmentRef, Submission};
use cinemateca_storage::{keys, Storage, StorageError};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;
use tempfile::TempDir;
use thiserror::Error;
use uuid::Uuid;

use crate::replies;
use crate::transport::{Transport, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Cover,
    Video,
}

impl Display for ArtifactKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ArtifactKind::Cover => write!(f, "cover"),
            ArtifactKind::Video => write!(f, "video"),
        }
    }
}

/// Upload phase errors. Any of these aborts the whole phase; no catalog
/// record is written.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Submission is missing its {0} artifact")]
    MissingArtifact(ArtifactKind),

    #[error("Failed to stage artifact bytes: {0}")]
    Staging(#[source] std::io::Error),

    #[error("Failed to retrieve {kind} from transport: {source}")]
    Retrieve {
        kind: ArtifactKind,
        #[source]
        source: TransportError,
    },

    #[error("Failed to store {kind}: {source}")]
    Store {
        kind: ArtifactKind,
        #[source]
        source: StorageError,
    },
}

impl UploadError {
    /// User-facing reply naming the stage that failed, without internals.
    pub fn user_reply(&self) -> &'static str {
        match self.artifact() {
            Some(ArtifactKind::Cover) => replies::COVER_UPLOAD_FAILED,
            Some(ArtifactKind::Video) => replies::VIDEO_UPLOAD_FAILED,
            None => replies::INTERNAL_ERROR,
        }
    }

    fn artifact(&self) -> Option<ArtifactKind> {
        match self {
            UploadError::MissingArtifact(kind)
            | UploadError::Retrieve { kind, .. }
            | UploadError::Store { kind, .. } => Some(*kind),
            UploadError::Staging(_) => None,
        }
    }
}

/// Addresses of the two uploaded blobs, plus the record id that namespaces
/// their keys.
#[derive(Debug, Clone)]
pub struct UploadedArtifacts {
    pub record_id: Uuid,
    pub cover_url: String,
    pub video_url: String,
}

/// Retrieves a completed submission's artifacts from the transport and
/// pushes them to the blob store.
pub struct UploadCoordinator {
    transport: Arc<dyn Transport>,
    storage: Arc<dyn Storage>,
}

impl UploadCoordinator {
    pub fn new(transport: Arc<dyn Transport>, storage: Arc<dyn Storage>) -> Self {
        Self { transport, storage }
    }

    pub async fn upload(&self, submission: &Submission) -> Result<UploadedArtifacts, UploadError> {
        let cover_ref = submission
            .cover_ref
            .as_ref()
            .ok_or(UploadError::MissingArtifact(ArtifactKind::Cover))?;
        let video_ref = submission
            .video_ref
            .as_ref()
            .ok_or(UploadError::MissingArtifact(ArtifactKind::Video))?;

        let record_id = Uuid::new_v4();
        let staging = tempfile::tempdir().map_err(UploadError::Staging)?;

        // Cover first; its failure must not start the video leg.
        let cover_key =
            keys::cover_key(record_id, &cover_ref.extension_or(DEFAULT_COVER_EXTENSION));
        let cover_url = self
            .upload_one(
                &staging,
                record_id,
                ArtifactKind::Cover,
                cover_ref,
                &cover_key,
                cover_ref.content_type_or(COVER_CONTENT_TYPE),
            )
            .await?;

        let video_key =
            keys::video_key(record_id, &video_ref.extension_or(DEFAULT_VIDEO_EXTENSION));
        let video_url = match self
            .upload_one(
                &staging,
                record_id,
                ArtifactKind::Video,
                video_ref,
                &video_key,
                video_ref.content_type_or(DEFAULT_VIDEO_CONTENT_TYPE),
            )
            .await
        {
            Ok(url) => url,
            Err(e) => {
                // The cover blob already landed; remove it best-effort so
                // the failed run leaves nothing observable in the store.
                if let Err(cleanup) = self.storage.delete(&cover_key).await {
                    tracing::warn!(
                        record_id = %record_id,
                        key = %cover_key,
                        error = %cleanup,
                        "Could not remove cover after video upload failure"
                    );
                }
                return Err(e);
            }
        };

        Ok(UploadedArtifacts {
            record_id,
            cover_url,
            video_url,
        })
    }

    async fn upload_one(
        &self,
        staging: &TempDir,
        record_id: Uuid,
        kind: ArtifactKind,
        attachment: &AttachmentRef,
        key: &str,
        content_type: &str,
    ) -> Result<String, UploadError> {
        let staged_path = staging.path().join(kind.to_string());
        let size_bytes = self
            .transport
            .download_attachment(attachment, &staged_path)
            .await
            .map_err(|source| UploadError::Retrieve { kind, source })?;

        // Streamed from the staged file, never buffered whole.
        let url = self
            .storage
            .upload_with_key(key, &staged_path, content_type)
            .await
            .map_err(|source| UploadError::Store { kind, source })?;

        tracing::info!(
            record_id = %record_id,
            artifact = %kind,
            key = %key,
            size_bytes,
            "Artifact uploaded"
        );

        Ok(url)
    }
}
