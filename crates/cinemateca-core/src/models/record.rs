use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metadata::ParsedMetadata;

/// The published catalog entity. Created exactly once per successful
/// pipeline run and never mutated afterwards; a resubmission of the same
/// title creates a new record.
///
/// Serializes with camelCase keys, which is the wire format the catalog
/// collaborator stores verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
    pub cover_url: String,
    pub video_url: String,
    /// Publication instant in epoch milliseconds.
    pub created_at: i64,
}

impl CatalogRecord {
    pub fn new(
        metadata: ParsedMetadata,
        cover_url: String,
        video_url: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            title: metadata.title,
            director: metadata.director,
            audio: metadata.audio,
            year: metadata.year,
            genres: metadata.genres,
            synopsis: metadata.synopsis,
            cover_url,
            video_url,
            created_at: created_at.timestamp_millis(),
        }
    }
}
