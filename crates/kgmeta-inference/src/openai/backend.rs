//! OpenAI-compatible suggestion backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use kgmeta_core::defaults;
use kgmeta_core::{Error, FieldSuggestions, Result, SuggestionBackend, SuggestionRequest, SuggestionResponse};

use super::error::{provider_error, ProviderFailure};
use super::types::*;
use crate::prompt::{render_custom_prompt, render_user_prompt, SYSTEM_PROMPT};
use crate::schema::response_schema;

/// Connection and sampling settings for the OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key for authentication (optional for local endpoints).
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::OPENAI_BASE_URL.to_string(),
            api_key: None,
            model: defaults::SUGGEST_MODEL.to_string(),
            temperature: defaults::SUGGEST_TEMPERATURE,
            max_tokens: defaults::SUGGEST_MAX_TOKENS,
            timeout_seconds: defaults::SUGGEST_TIMEOUT_SECS,
        }
    }
}

/// Suggestion backend speaking the chat completions API with structured output.
pub struct OpenAISuggestionBackend {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAISuggestionBackend {
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Inference(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "openai",
            base_url = %config.base_url,
            model = %config.model,
            "Initializing OpenAI suggestion backend"
        );

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.post(&url);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        req.header("Content-Type", "application/json")
    }

    fn chat_request(&self, user_prompt: String) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user_prompt)],
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_tokens),
            response_format: Some(ResponseFormat::JsonSchema {
                json_schema: JsonSchemaFormat {
                    name: defaults::SUGGEST_SCHEMA_NAME.to_string(),
                    schema: response_schema(),
                    strict: false,
                },
            }),
        }
    }

    async fn complete(&self, user_prompt: String) -> Result<SuggestionResponse> {
        let start = Instant::now();
        let prompt_len = user_prompt.len();
        let request = self.chat_request(user_prompt);

        let response = self
            .build_request("/chat/completions")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body: OpenAIErrorResponse = response
                .json()
                .await
                .unwrap_or_else(|_| OpenAIErrorResponse::unknown());
            let failure = ProviderFailure::classify(status.as_u16(), &body.error);
            warn!(
                subsystem = "inference",
                status = status.as_u16(),
                failure = ?failure,
                prompt_len,
                error = %body.error.message,
                "Suggestion request failed"
            );
            return Err(provider_error(
                status.as_u16(),
                &body.error,
                &self.config.model,
                prompt_len,
            ));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        let content = result
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default();

        let parsed = parse_suggestion_content(&content);
        debug!(
            subsystem = "inference",
            model = %self.config.model,
            prompt_len,
            response_len = content.len(),
            field_count = parsed.field_suggestions.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Suggestion request complete"
        );
        Ok(parsed)
    }
}

/// Remove a surrounding Markdown code fence, if any.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or(rest);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parse the assistant message content.
///
/// Content that is not valid JSON yields a response with a single `error`
/// entry instead of failing the request.
pub fn parse_suggestion_content(content: &str) -> SuggestionResponse {
    match serde_json::from_str::<SuggestionResponse>(strip_code_fence(content)) {
        Ok(response) => response,
        Err(e) => {
            warn!(
                subsystem = "inference",
                error = %e,
                response_len = content.len(),
                "Suggestion response was not valid JSON"
            );
            let mut response = SuggestionResponse::default();
            response.field_suggestions.insert(
                defaults::RESPONSE_ERROR_FIELD.to_string(),
                FieldSuggestions::none(defaults::INVALID_JSON_REASON),
            );
            response
        }
    }
}

#[async_trait]
impl SuggestionBackend for OpenAISuggestionBackend {
    async fn suggest(&self, request: &SuggestionRequest) -> Result<SuggestionResponse> {
        debug!(
            subsystem = "inference",
            field_count = request.field_definitions.len(),
            "Requesting bulk suggestions"
        );
        self.complete(render_user_prompt(request)).await
    }

    async fn suggest_with_prompt(&self, prompt: &str) -> Result<SuggestionResponse> {
        let prompt = render_custom_prompt(prompt);
        if prompt.is_empty() {
            return Err(Error::InvalidInput("Prompt cannot be empty".to_string()));
        }
        self.complete(prompt).await
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OpenAIConfig::default();
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-4o-mini");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_parse_valid_content() {
        let content = r#"{"fieldSuggestions": {"title": {"suggestions": [{"value": "QuoteKG"}]}}}"#;
        let response = parse_suggestion_content(content);
        assert_eq!(response.field_suggestions["title"].suggestions[0].value, "QuoteKG");
    }

    #[test]
    fn test_parse_fenced_content() {
        let content = "```json\n{\"fieldSuggestions\": {\"version\": {\"noSuggestionsReason\": \"NS\"}}}\n```";
        let response = parse_suggestion_content(content);
        assert!(response.field_suggestions.contains_key("version"));
    }

    #[test]
    fn test_invalid_json_fallback() {
        let response = parse_suggestion_content("Sorry, I cannot help with that.");
        assert_eq!(response.field_suggestions.len(), 1);
        let error = &response.field_suggestions["error"];
        assert!(error.suggestions.is_empty());
        assert_eq!(
            error.no_suggestions_reason.as_deref(),
            Some("AI response was not valid JSON. Please try again.")
        );
    }

    #[test]
    fn test_chat_request_shape() {
        let backend = OpenAISuggestionBackend::new(OpenAIConfig::default()).unwrap();
        let request = backend.chat_request("hello".into());
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].content, SYSTEM_PROMPT);
        assert_eq!(request.temperature, Some(0.2));
        assert!(matches!(request.response_format, Some(ResponseFormat::JsonSchema { .. })));
    }
}
