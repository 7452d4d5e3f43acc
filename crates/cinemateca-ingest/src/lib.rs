//! Cinemateca Ingestion Library
//!
//! Everything between the chat transport and the published catalog record:
//! the per-conversation submission store, the artifact-ordering state
//! machine, the upload coordinator, the pipeline orchestrator and the TTL
//! sweeper. The transport, blob store and catalog are injected behind
//! traits; `test_helpers` provides in-memory mocks for all three.

pub mod event;
pub mod pipeline;
pub mod replies;
pub mod state;
pub mod store;
pub mod sweeper;
pub mod test_helpers;
pub mod transport;
pub mod upload;

// Re-export commonly used types
pub use event::InboundEvent;
pub use pipeline::{Pipeline, PipelineError};
pub use state::{Outcome, SubmissionStateMachine};
pub use store::{InMemorySubmissionStore, StoreError, StoreResult, SubmissionStore};
pub use sweeper::Sweeper;
pub use transport::{Transport, TransportError, TransportResult};
pub use upload::{ArtifactKind, UploadCoordinator, UploadError, UploadedArtifacts};
