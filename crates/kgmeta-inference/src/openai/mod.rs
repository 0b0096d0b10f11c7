//! OpenAI-compatible suggestion backend.
//!
//! Works with any endpoint that implements chat completions with
//! `response_format: json_schema`, including:
//!
//! - OpenAI cloud API
//! - Azure OpenAI
//! - Ollama (in OpenAI compatibility mode)
//! - vLLM
//!
//! # Example
//!
//! ```rust,no_run
//! use kgmeta_core::{FormRecord, SuggestionBackend};
//! use kgmeta_inference::build_request;
//! use kgmeta_inference::openai::{OpenAIConfig, OpenAISuggestionBackend};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = OpenAIConfig {
//!         base_url: "http://localhost:11434/v1".to_string(),
//!         model: "llama3".to_string(),
//!         ..Default::default()
//!     };
//!     let backend = OpenAISuggestionBackend::new(config).unwrap();
//!     let request = build_request(&FormRecord::default(), "QuoteKG is a KG of quotes.");
//!     let response = backend.suggest(&request).await.unwrap();
//! }
//! ```

mod backend;
mod error;
mod types;

pub use backend::{parse_suggestion_content, OpenAIConfig, OpenAISuggestionBackend};
pub use error::{provider_error, ProviderFailure};
pub use types::*;
