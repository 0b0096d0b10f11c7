//! Suggestion request builder.
//!
//! Selects which fields to ask the provider about. Fields the user already
//! filled are left out so suggestions never overwrite their work; nested
//! entity collections are always included because they are append-only.

use tracing::debug;

use kgmeta_core::licenses::KNOWN_LICENSES;
use kgmeta_core::{
    field_spec, EditError, FieldDefinition, FormRecord, SuggestionRequest,
    ENTITY_COLLECTION_FIELDS, FIELD_REGISTRY,
};

/// Wire name of the license field, which gets a dynamic instruction.
pub const LICENSE_FIELD: &str = "license";

/// Instruction for the license field, enumerating the recognized license IRIs.
pub fn license_instruction() -> String {
    let options = KNOWN_LICENSES
        .iter()
        .map(|l| format!("{} ({})", l.iri, l.name))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Provide the license that the KG is released with. Match license names (MIT, Apache, GPL, BSD, Creative Commons, etc.) to one of these IRIs and return the IRI exactly: {}. \
If the narrative contains a license URL, even surrounded by other text, extract it and match it to the list. \
If the license is not in the list, return the license name or URL as written.",
        options
    )
}

/// Build a bulk request for the empty fields of `record`.
pub fn build_request(record: &FormRecord, narrative_text: &str) -> SuggestionRequest {
    let mut field_definitions: Vec<FieldDefinition> = FIELD_REGISTRY
        .iter()
        .filter(|spec| spec.suggestible)
        .filter(|spec| !spec.is_entity_collection() && spec.name != LICENSE_FIELD)
        .filter(|spec| record.is_field_empty(spec))
        .map(|spec| FieldDefinition {
            name: spec.name.to_string(),
            instruction: spec.instruction.to_string(),
        })
        .collect();

    for name in ENTITY_COLLECTION_FIELDS {
        if let Some(spec) = field_spec(name) {
            field_definitions.push(FieldDefinition {
                name: spec.name.to_string(),
                instruction: spec.instruction.to_string(),
            });
        }
    }

    if record.license.trim().is_empty() {
        field_definitions.push(FieldDefinition {
            name: LICENSE_FIELD.to_string(),
            instruction: license_instruction(),
        });
    }

    debug!(
        subsystem = "inference",
        component = "request_builder",
        field_count = field_definitions.len(),
        "Built suggestion request"
    );

    SuggestionRequest {
        field_definitions,
        narrative_text: narrative_text.to_string(),
    }
}

/// Build a request for one field regardless of its current value.
pub fn build_field_request(field: &str, narrative_text: &str) -> Result<SuggestionRequest, EditError> {
    let spec = field_spec(field).ok_or_else(|| EditError::UnknownField(field.to_string()))?;
    if !spec.suggestible {
        return Err(EditError::UnknownField(field.to_string()));
    }
    let instruction = if spec.name == LICENSE_FIELD {
        license_instruction()
    } else {
        spec.instruction.to_string()
    };
    Ok(SuggestionRequest {
        field_definitions: vec![FieldDefinition {
            name: spec.name.to_string(),
            instruction,
        }],
        narrative_text: narrative_text.to_string(),
    })
}
