//! Cinemateca Core Library
//!
//! This crate provides the domain models, caption parser, configuration and
//! constants shared across all Cinemateca components.

pub mod caption;
pub mod config;
pub mod constants;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use caption::{has_title_label, parse};
pub use config::{Config, ConfigError};
pub use models::{
    AttachmentRef, CatalogRecord, ConversationId, ParsedMetadata, Submission, SubmissionStage,
};
pub use storage_types::StorageBackend;
