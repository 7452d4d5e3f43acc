//! Domain models shared across components.

pub mod metadata;
pub mod record;
pub mod submission;

pub use metadata::ParsedMetadata;
pub use record::CatalogRecord;
pub use submission::{AttachmentRef, ConversationId, Submission, SubmissionStage};
