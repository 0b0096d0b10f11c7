//! # kgmeta-db
//!
//! Local persistence for kgmeta: the draft store, the submission log, and
//! the narrative document reader.

pub mod config;
pub mod documents;
pub mod drafts;
pub mod submissions;

pub use config::StoreConfig;
pub use documents::PlainTextDocumentReader;
pub use drafts::{InMemoryDraftStore, JsonFileDraftStore};
pub use submissions::{InMemorySubmissionLog, JsonlSubmissionLog};

// Re-export core for convenience
pub use kgmeta_core::*;
