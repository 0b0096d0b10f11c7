//! JSON schema for structured suggestion responses.

use schemars::schema_for;
use serde_json::Value as JsonValue;

use kgmeta_core::SuggestionResponse;

/// JSON schema of [`SuggestionResponse`], used as the provider's
/// `response_format`.
pub fn response_schema() -> JsonValue {
    let schema = schema_for!(SuggestionResponse);
    serde_json::to_value(schema).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to serialize response schema");
        JsonValue::Object(Default::default())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_describes_field_suggestions() {
        let schema = response_schema();
        let text = schema.to_string();
        assert!(text.contains("fieldSuggestions"));
        assert!(text.contains("noSuggestionsReason"));
        assert!(text.contains("roleData"));
        assert!(text.contains("name_mbox"));
    }
}
