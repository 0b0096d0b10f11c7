//! # kgmeta-core
//!
//! Core types, validators, field registry, and traits for kgmeta, the
//! knowledge-graph metadata authoring engine.
//!
//! This crate provides the record model and the pure editing rules that the
//! inference, storage, and editor crates build on.

pub mod collections;
pub mod defaults;
pub mod draft;
pub mod error;
pub mod events;
pub mod ids;
pub mod licenses;
pub mod logging;
pub mod models;
pub mod schema;
pub mod submission;
pub mod suggestions;
pub mod tags;
pub mod traits;
pub mod turtle;
pub mod validators;

// Re-export commonly used types at crate root
pub use collections::{EntityEditor, NestedEntity, SaveOutcome, SubfieldKind, SubfieldSpec};
pub use draft::{sort_newest_first, total_duration_seconds, Draft, EditSession, FormType};
pub use error::{EditError, Error, Result};
pub use events::{EditorEvent, EventBus, EventEnvelope};
pub use licenses::{find_license, match_license, License, LicenseChoice, KNOWN_LICENSES};
pub use models::*;
pub use schema::{
    field_label, field_spec, Cardinality, FieldKind, FieldSpec, ENTITY_COLLECTION_FIELDS,
    FIELD_REGISTRY, SUBMISSION_REQUIRED_FIELDS,
};
pub use submission::*;
pub use suggestions::*;
pub use tags::{
    add_single_value, add_tag, merge_distinct, remove_single_value, remove_tag, tag_error,
    InvalidTagIndex, TagOutcome,
};
pub use traits::*;
pub use turtle::check_turtle;
pub use validators::{
    validate_bcp47, validate_calendar_date, validate_email, validate_iri, EmailValidation,
};
