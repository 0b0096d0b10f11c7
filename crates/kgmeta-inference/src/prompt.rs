//! Prompt rendering for structured suggestion requests.

use kgmeta_core::schema::ROLE_TYPE_NAMES;
use kgmeta_core::SuggestionRequest;

/// System prompt shared by the bulk and custom-prompt paths.
pub const SYSTEM_PROMPT: &str = "You are an expert in knowledge graph metadata and data cataloging. \
Your primary task is to extract specific information from the provided narrative. \
Never invent generic values; only use data that appears in the narrative. \
Match fields semantically even when names differ in capitalization, spacing, or wording. \
If a value is marked 'NS' (not supplied), return no suggestions and say so. \
For each suggestion, give the value and a brief explanation grounded in the narrative.";

/// Render the user prompt for a bulk request.
pub fn render_user_prompt(request: &SuggestionRequest) -> String {
    let field_lines = request
        .field_definitions
        .iter()
        .map(|d| {
            let instruction = if d.instruction.trim().is_empty() {
                "No specific instruction provided"
            } else {
                d.instruction.as_str()
            };
            format!("- {}: {}", d.name, instruction)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are helping fill out metadata for a knowledge graph dataset. The narrative below contains the information you need.

Field definitions:
{fields}

NARRATIVE (primary reference):
{narrative}

Instructions:
- The narrative is your primary source. Extract names, URLs, dates, and details directly from it.
- Do not return placeholders or generic values.
- Field names in the narrative may not match the form exactly; allow for variations in capitalization, spacing, and wording.
- Each suggestion is one discrete value. For list fields, return one suggestion per value instead of a comma-joined string.
- Dates use the YYYY/MM/DD format.

Roles:
- Map role-related information to one of these role types: {roles}.
- For example "publishedBy" maps to publisher and "fundedBy" maps to funder.
- Each roles suggestion carries roleData: {{"roleType": "...", "mode": "iri" | "name_mbox", "iri": "...", "name": "...", "email": "..."}}.
- Use mode "iri" when the agent is identified by an IRI/URL and "name_mbox" when it is a name with an optional email.

License:
- The license options are listed in the license field definition. Return the matching IRI exactly.
- Look for license URLs even inside other text.

Response format:
Return a JSON object {{"fieldSuggestions": {{...}}}} with one entry per field. Each entry is either
1. {{"suggestions": [{{"value": "...", "explanation": "..."}}]}} with 1 to 4 candidates ordered by likelihood, or
2. {{"suggestions": [], "noSuggestionsReason": "..."}} with a short reason (e.g. "Field name has no match in the narrative").
If a field is present but marked "NS" (not supplied), return {{"suggestions": [], "noSuggestionsReason": "Field found in narrative but marked as 'NS' (not supplied)"}}."#,
        fields = field_lines,
        narrative = request.narrative_text,
        roles = ROLE_TYPE_NAMES.join(", "),
    )
}

/// Wrap a user-edited prompt for the "edit and re-fetch" path.
///
/// The prompt is sent as-is; only surrounding whitespace is trimmed.
pub fn render_custom_prompt(prompt: &str) -> String {
    prompt.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgmeta_core::FieldDefinition;

    #[test]
    fn test_user_prompt_lists_fields_and_narrative() {
        let request = SuggestionRequest {
            field_definitions: vec![
                FieldDefinition {
                    name: "title".into(),
                    instruction: "The name of the KG.".into(),
                },
                FieldDefinition {
                    name: "acronym".into(),
                    instruction: "".into(),
                },
            ],
            narrative_text: "QuoteKG is a multilingual KG of quotes.".into(),
        };
        let prompt = render_user_prompt(&request);
        assert!(prompt.contains("- title: The name of the KG."));
        assert!(prompt.contains("- acronym: No specific instruction provided"));
        assert!(prompt.contains("QuoteKG is a multilingual KG of quotes."));
        assert!(prompt.contains("principalInvestigator"));
        assert!(prompt.contains("\"fieldSuggestions\""));
    }

    #[test]
    fn test_custom_prompt_trimmed() {
        assert_eq!(render_custom_prompt("  ask  \n"), "ask");
    }
}
