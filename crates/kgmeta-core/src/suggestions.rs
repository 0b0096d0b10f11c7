//! Suggestion request and response types exchanged with a suggestion provider.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One field the provider should suggest values for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub instruction: String,
}

/// Provider-agnostic bulk suggestion request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub field_definitions: Vec<FieldDefinition>,
    pub narrative_text: String,
}

impl SuggestionRequest {
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.field_definitions.iter().map(|d| d.name.as_str())
    }
}

/// How a role suggestion identifies its agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum RoleDataMode {
    #[serde(rename = "iri")]
    Iri,
    #[serde(rename = "name_mbox")]
    NameMbox,
}

/// Structured payload carried by a `roles` candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleSuggestionData {
    /// One of the twenty role type wire names.
    pub role_type: String,
    pub mode: RoleDataMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A candidate value for a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Suggestion {
    /// Candidate value. Nested-entity fields carry a JSON-encoded object here.
    pub value: String,
    /// Short explanation of why this value was suggested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(rename = "roleData", default, skip_serializing_if = "Option::is_none")]
    pub role_data: Option<RoleSuggestionData>,
}

impl Suggestion {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            explanation: None,
            role_data: None,
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn with_role_data(mut self, role_data: RoleSuggestionData) -> Self {
        self.role_data = Some(role_data);
        self
    }
}

/// Candidates for one field, or the reason none were found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FieldSuggestions {
    /// Candidates ordered by likelihood, most likely first.
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
    /// Why no candidates were found (only when `suggestions` is empty).
    #[serde(
        rename = "noSuggestionsReason",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub no_suggestions_reason: Option<String>,
}

impl FieldSuggestions {
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suggestions: values.into_iter().map(Suggestion::new).collect(),
            no_suggestions_reason: None,
        }
    }

    pub fn none(reason: impl Into<String>) -> Self {
        Self {
            suggestions: Vec::new(),
            no_suggestions_reason: Some(reason.into()),
        }
    }

    /// Display string: one `• value` line per candidate, else the reason.
    pub fn display(&self) -> String {
        if self.suggestions.is_empty() {
            return self
                .no_suggestions_reason
                .clone()
                .unwrap_or_else(|| "No suggestions found for this field.".to_string());
        }
        self.suggestions
            .iter()
            .map(|s| format!("• {}", s.value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Structured response keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SuggestionResponse {
    #[serde(rename = "fieldSuggestions", default)]
    pub field_suggestions: BTreeMap<String, FieldSuggestions>,
}

/// Suggestions currently shown in the editor.
///
/// Holds a display string and the raw candidates per field; the raw form is
/// re-parsed when nested-entity candidates are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionSet {
    display: BTreeMap<String, String>,
    raw: BTreeMap<String, FieldSuggestions>,
}

impl SuggestionSet {
    pub fn from_raw(raw: BTreeMap<String, FieldSuggestions>) -> Self {
        let display = raw
            .iter()
            .map(|(field, suggestions)| (field.clone(), suggestions.display()))
            .collect();
        Self { display, raw }
    }

    pub fn from_response(response: SuggestionResponse) -> Self {
        Self::from_raw(response.field_suggestions)
    }

    pub fn display(&self, field: &str) -> Option<&str> {
        self.display.get(field).map(String::as_str)
    }

    pub fn raw(&self, field: &str) -> Option<&FieldSuggestions> {
        self.raw.get(field)
    }

    pub fn raw_map(&self) -> &BTreeMap<String, FieldSuggestions> {
        &self.raw
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.raw.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn clear(&mut self) {
        self.display.clear();
        self.raw.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_response() {
        let json = r#"{
            "fieldSuggestions": {
                "title": {"suggestions": [{"value": "QuoteKG", "explanation": "main name"}]},
                "version": {"noSuggestionsReason": "Field found but marked as 'NS'"}
            }
        }"#;
        let response: SuggestionResponse = serde_json::from_str(json).unwrap();
        let title = &response.field_suggestions["title"];
        assert_eq!(title.suggestions[0].value, "QuoteKG");
        assert_eq!(title.suggestions[0].explanation.as_deref(), Some("main name"));
        let version = &response.field_suggestions["version"];
        assert!(version.suggestions.is_empty());
        assert!(version.no_suggestions_reason.is_some());
    }

    #[test]
    fn test_parse_role_data() {
        let json = r#"{"value": "publisher", "roleData": {"roleType": "publisher", "mode": "name_mbox", "name": "KG Lab", "email": "kg@example.org"}}"#;
        let s: Suggestion = serde_json::from_str(json).unwrap();
        let data = s.role_data.unwrap();
        assert_eq!(data.mode, RoleDataMode::NameMbox);
        assert_eq!(data.name.as_deref(), Some("KG Lab"));
        assert_eq!(data.iri, None);
    }

    #[test]
    fn test_display_bullets() {
        let fs = FieldSuggestions::from_values(["rdf", "owl"]);
        assert_eq!(fs.display(), "• rdf\n• owl");
    }

    #[test]
    fn test_display_reason() {
        let fs = FieldSuggestions::none("not in the narrative");
        assert_eq!(fs.display(), "not in the narrative");
    }

    #[test]
    fn test_suggestion_set_keeps_raw_and_display() {
        let mut map = BTreeMap::new();
        map.insert("keywords".to_string(), FieldSuggestions::from_values(["a"]));
        let set = SuggestionSet::from_raw(map);
        assert_eq!(set.display("keywords"), Some("• a"));
        assert_eq!(set.raw("keywords").unwrap().suggestions.len(), 1);
        assert_eq!(set.fields().collect::<Vec<_>>(), vec!["keywords"]);
    }

    #[test]
    fn test_request_wire_names() {
        let request = SuggestionRequest {
            field_definitions: vec![FieldDefinition {
                name: "title".into(),
                instruction: "The title.".into(),
            }],
            narrative_text: "text".into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("fieldDefinitions").is_some());
        assert_eq!(json["narrativeText"], "text");
    }
}
