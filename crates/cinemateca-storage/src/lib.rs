//! Cinemateca Storage Library
//!
//! Blob-store abstraction and implementations. It includes the Storage trait
//! plus backends for the local filesystem and Firebase Storage.
//!
//! # Storage key format
//!
//! Keys are namespaced by a freshly generated record id so concurrent
//! submissions never collide, even for identical titles:
//!
//! - Cover: `movies/{record_id}/cover.{ext}`
//! - Video: `movies/{record_id}/video.{ext}`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is
//! centralized in the `keys` module so all backends stay consistent.

pub mod factory;
pub mod firebase;
pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use cinemateca_core::StorageBackend;
pub use factory::create_storage;
pub use firebase::FirebaseStorage;
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};
