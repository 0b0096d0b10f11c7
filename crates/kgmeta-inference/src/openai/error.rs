//! Provider failures, classified by what the user can do about them.

use kgmeta_core::Error;

use super::types::OpenAIError;

/// Why the provider refused a suggestion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFailure {
    /// The API key was missing or rejected.
    Credentials,
    /// The configured model is not served by this endpoint.
    UnknownModel,
    /// Narrative plus field definitions did not fit the model context.
    NarrativeTooLong,
    /// Throttled or temporarily down.
    Unavailable,
    Rejected,
}

impl ProviderFailure {
    /// Classify an HTTP status and the provider's error body.
    pub fn classify(status: u16, error: &OpenAIError) -> Self {
        let code = error.code.as_deref().unwrap_or_default();
        let kind = error.error_type.as_str();
        let mentions = |needle: &str| code.contains(needle) || kind.contains(needle);

        match status {
            401 | 403 => Self::Credentials,
            404 => Self::UnknownModel,
            429 | 500..=599 => Self::Unavailable,
            _ if mentions("model_not_found") => Self::UnknownModel,
            _ if mentions("context_length") => Self::NarrativeTooLong,
            _ => Self::Rejected,
        }
    }
}

/// Turn a failed completion into a kgmeta [`Error`].
///
/// `prompt_chars` is the size of the rendered user prompt, which is mostly
/// the narrative document.
pub fn provider_error(status: u16, error: &OpenAIError, model: &str, prompt_chars: usize) -> Error {
    match ProviderFailure::classify(status, error) {
        ProviderFailure::Credentials => Error::Config(format!(
            "Suggestion provider rejected the API key: {}. Check OPENAI_API_KEY",
            error.message
        )),
        ProviderFailure::UnknownModel => Error::Config(format!(
            "Model '{}' is not available at the configured endpoint: {}. Check KGMETA_SUGGEST_MODEL",
            model, error.message
        )),
        ProviderFailure::NarrativeTooLong => Error::InvalidInput(format!(
            "Narrative is too long for model '{}' ({} prompt characters). Shorten the document or fill in more fields before asking for suggestions",
            model, prompt_chars
        )),
        ProviderFailure::Unavailable => Error::Inference(format!(
            "Suggestion provider unavailable (HTTP {}): {}. Try again later",
            status, error.message
        )),
        ProviderFailure::Rejected => Error::Inference(format!(
            "Suggestion request rejected (HTTP {}): {}",
            status, error.message
        )),
    }
}
