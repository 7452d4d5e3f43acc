//! Catalog abstraction trait

use async_trait::async_trait;
use cinemateca_core::CatalogRecord;
use std::fmt::{Display, Formatter, Result as FmtResult};
use thiserror::Error;

/// Identifier assigned by the catalog when a record is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordId(pub String);

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// Catalog operation errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Request(String),

    #[error("Catalog rejected write: {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Catalog returned malformed response: {0}")]
    MalformedResponse(String),
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog abstraction trait
///
/// The single write the pipeline performs. Implementations must make the
/// record appear atomically: either the create fails and nothing is
/// observable, or it succeeds with every field in place.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Create one record; the catalog assigns and returns its id.
    async fn create_record(&self, record: &CatalogRecord) -> CatalogResult<RecordId>;
}
