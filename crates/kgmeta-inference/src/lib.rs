//! # kgmeta-inference
//!
//! Narrative-to-suggestion pipeline for kgmeta.
//!
//! This crate provides:
//! - The suggestion request builder (which fields to ask about)
//! - Prompt rendering and the structured response schema
//! - The response mapper (how candidates populate the record)
//! - An OpenAI-compatible [`SuggestionBackend`](kgmeta_core::SuggestionBackend)
//! - Configuration from TOML or environment variables
//!
//! # Features
//!
//! - `openai` (default): OpenAI-compatible backend
//! - `mock`: deterministic mock backend for tests in dependent crates
//! - `integration`: tests against a live endpoint

pub mod config;
pub mod mapper;
pub mod prompt;
pub mod request;
pub mod schema;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use config::{ConfigError, InferenceConfig};
pub use mapper::{
    apply_all, map_candidate, map_role, merge_candidate, parse_entity, strategy_for, ApplyReport,
    MappedCandidate, PopulationStrategy,
};
pub use prompt::{render_user_prompt, SYSTEM_PROMPT};
pub use request::{build_field_request, build_request, license_instruction};
pub use schema::response_schema;

#[cfg(feature = "openai")]
pub use openai::{OpenAIConfig, OpenAISuggestionBackend};
