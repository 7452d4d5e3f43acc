use serde::{Deserialize, Serialize};

/// Structured fields extracted from a caption.
///
/// The title always resolves to a non-empty value (placeholder fallback);
/// every other field may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedMetadata {
    pub title: String,
    pub director: Option<String>,
    pub audio: Option<String>,
    pub year: Option<String>,
    pub genres: Option<String>,
    pub synopsis: Option<String>,
}
