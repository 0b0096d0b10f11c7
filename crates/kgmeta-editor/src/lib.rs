//! # kgmeta-editor
//!
//! Editing workflow for one knowledge-graph metadata record.
//!
//! This crate provides:
//! - [`FormEditorState`]: the record, scratch entities, suggestions, and
//!   session state behind named operations
//! - Submission validation with normal and forced modes
//! - The session countdown and its background driver
//! - The suggestion round trip with stale-response discard
//! - Debounced raw-text (Turtle) validation

use std::sync::Arc;

use tokio::sync::Mutex;

pub mod config;
pub mod countdown;
pub mod pipeline;
pub mod session;
pub mod state;
pub mod turtle;
pub mod validation;

pub use config::EditorConfig;
pub use countdown::{CountdownDriver, CountdownHandle};
pub use pipeline::{request_suggestions, request_suggestions_with_prompt};
pub use session::{Countdown, SessionTracker, TickOutcome};
pub use state::{
    AcceptOutcome, EditorStatus, FormEditorState, RequestToken, SubmissionOutcome, SuggestionApplied,
};
pub use turtle::TurtleCheckDebouncer;
pub use validation::{validate_record, validate_turtle_document, ValidationReport};

/// An editor shared between the UI and background tasks.
pub type SharedEditor = Arc<Mutex<FormEditorState>>;

/// Wrap an editor for sharing.
pub fn shared(state: FormEditorState) -> SharedEditor {
    Arc::new(Mutex::new(state))
}
