//! Mock suggestion backend for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kgmeta_core::{FieldSuggestions, SuggestionBackend, SuggestionRequest};
//! use kgmeta_inference::mock::MockSuggestionBackend;
//!
//! #[tokio::test]
//! async fn test_with_mock_backend() {
//!     let backend = MockSuggestionBackend::new()
//!         .with_field("title", FieldSuggestions::from_values(["QuoteKG"]));
//!
//!     let response = backend.suggest(&SuggestionRequest::default()).await.unwrap();
//!     assert_eq!(response.field_suggestions["title"].suggestions[0].value, "QuoteKG");
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use kgmeta_core::{
    Error, FieldSuggestions, Result, SuggestionBackend, SuggestionRequest, SuggestionResponse,
};

/// Mock suggestion backend returning a canned response.
#[derive(Clone)]
pub struct MockSuggestionBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone, Default)]
struct MockConfig {
    response: SuggestionResponse,
    latency_ms: u64,
    failure: Option<String>,
    model: String,
}

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Bulk(SuggestionRequest),
    Prompt(String),
}

impl Default for MockSuggestionBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSuggestionBackend {
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig {
                model: "mock-suggest".to_string(),
                ..Default::default()
            }),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Replace the whole canned response.
    pub fn with_response(mut self, response: SuggestionResponse) -> Self {
        Arc::make_mut(&mut self.config).response = response;
        self
    }

    /// Add candidates for one field to the canned response.
    pub fn with_field(mut self, field: impl Into<String>, suggestions: FieldSuggestions) -> Self {
        Arc::make_mut(&mut self.config)
            .response
            .field_suggestions
            .insert(field.into(), suggestions);
        self
    }

    /// Simulated latency, observed with tokio time (pausable in tests).
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// Fail every call with an inference error carrying `message`.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).failure = Some(message.into());
        self
    }

    fn log(&self) -> MutexGuard<'_, Vec<MockCall>> {
        self.call_log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// All logged calls, oldest first.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.log().clone()
    }

    pub fn call_count(&self) -> usize {
        self.log().len()
    }

    pub fn clear_calls(&self) {
        self.log().clear()
    }

    async fn respond(&self, call: MockCall) -> Result<SuggestionResponse> {
        self.log().push(call);
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }
        match &self.config.failure {
            Some(message) => Err(Error::Inference(message.clone())),
            None => Ok(self.config.response.clone()),
        }
    }
}

#[async_trait]
impl SuggestionBackend for MockSuggestionBackend {
    async fn suggest(&self, request: &SuggestionRequest) -> Result<SuggestionResponse> {
        self.respond(MockCall::Bulk(request.clone())).await
    }

    async fn suggest_with_prompt(&self, prompt: &str) -> Result<SuggestionResponse> {
        self.respond(MockCall::Prompt(prompt.to_string())).await
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_response_and_call_log() {
        let backend = MockSuggestionBackend::new()
            .with_field("keywords", FieldSuggestions::from_values(["rdf", "owl"]));
        let request = SuggestionRequest {
            field_definitions: vec![],
            narrative_text: "text".into(),
        };
        let response = backend.suggest(&request).await.unwrap();
        assert_eq!(response.field_suggestions["keywords"].suggestions.len(), 2);
        assert_eq!(backend.get_calls(), vec![MockCall::Bulk(request)]);

        backend.suggest_with_prompt("custom").await.unwrap();
        assert_eq!(backend.call_count(), 2);
        backend.clear_calls();
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failure() {
        let backend = MockSuggestionBackend::new().with_failure("boom");
        let err = backend.suggest_with_prompt("p").await.unwrap_err();
        assert!(matches!(err, Error::Inference(ref m) if m == "boom"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_uses_tokio_time() {
        let backend = MockSuggestionBackend::new().with_latency_ms(5_000);
        let start = tokio::time::Instant::now();
        backend.suggest_with_prompt("p").await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(5_000));
    }
}
