//! Cinemateca Catalog Library
//!
//! The catalog boundary: one trait for publishing records plus the Firebase
//! Realtime Database implementation. A record either does not exist or
//! exists complete with both artifact URLs populated; there is no partial
//! state and no update path.

pub mod firebase;
pub mod traits;

pub use firebase::FirebaseCatalog;
pub use traits::{Catalog, CatalogError, CatalogResult, RecordId};
