//! Suggestion response mapper.
//!
//! Turns per-field candidates into record mutations. The population
//! strategy is chosen by field identity; nested-entity candidates carry a
//! JSON-encoded object in `value` and are parsed here.

use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use kgmeta_core::{
    field_spec, match_license, merge_distinct, Distribution, EditError, ExampleResource,
    FieldKind, FieldSpec, FieldSuggestions, FormRecord, InvalidTagIndex, LicenseChoice,
    LinkedResource, NestedEntity, Role, RoleDataMode, RoleSuggestionData, RoleType,
    SparqlEndpoint, Suggestion,
};

/// How candidates for a field are written into the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulationStrategy {
    /// Scalar and date fields: the first candidate wins.
    FirstCandidate,
    /// First candidate, matched against the closed license set.
    License,
    /// Append every candidate not already present.
    AppendDistinct,
    /// Structured `roleData`, deduplicated by full tuple.
    Roles,
    /// JSON-encoded nested entity per candidate.
    Entities,
}

/// Strategy for a registry field.
pub fn strategy_for(spec: &FieldSpec) -> PopulationStrategy {
    match (spec.name, spec.kind) {
        ("license", _) => PopulationStrategy::License,
        ("roles", _) => PopulationStrategy::Roles,
        (_, FieldKind::EntityCollection) => PopulationStrategy::Entities,
        _ if spec.is_multi_value() => PopulationStrategy::AppendDistinct,
        _ => PopulationStrategy::FirstCandidate,
    }
}

/// One candidate, decoded into the shape its field stores.
#[derive(Debug, Clone, PartialEq)]
pub enum MappedCandidate {
    Scalar { field: &'static str, value: String },
    License(LicenseChoice),
    Tag { field: &'static str, value: String },
    Role(Role),
    Distribution(Distribution),
    SparqlEndpoint(SparqlEndpoint),
    ExampleResource(ExampleResource),
    LinkedResource(LinkedResource),
}

/// Map a role suggestion's structured data to a [`Role`].
///
/// Unknown role types fall back to the default role type.
pub fn map_role(data: &RoleSuggestionData) -> Role {
    let role_type = data.role_type.parse::<RoleType>().unwrap_or_else(|_| {
        debug!(role_type = %data.role_type, "Unknown role type in suggestion, using default");
        RoleType::default()
    });
    let clean = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    match data.mode {
        RoleDataMode::Iri => Role {
            role_type,
            agent: clean(&data.iri),
            ..Default::default()
        },
        RoleDataMode::NameMbox => Role::with_name(role_type, clean(&data.name), clean(&data.email)),
    }
}

/// Parse a JSON-encoded nested entity. Unknown keys are ignored and missing
/// subfields stay empty. Returns `None` (after logging) when the value is not
/// a JSON object.
pub fn parse_entity<T: NestedEntity>(value: &str) -> Option<T> {
    match serde_json::from_str::<JsonValue>(value) {
        Ok(JsonValue::Object(object)) => Some(T::from_json_object(&object)),
        Ok(other) => {
            warn!(
                collection = T::COLLECTION,
                kind = json_kind(&other),
                "Suggested entity is not a JSON object, skipping"
            );
            None
        }
        Err(e) => {
            warn!(collection = T::COLLECTION, error = %e, "Failed to parse suggested entity, skipping");
            None
        }
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Decode one candidate for `field`.
///
/// Returns `Ok(None)` for candidates that cannot be used (blank values,
/// roles without `roleData`, unparseable entity JSON, fields that do not
/// take suggestions).
pub fn map_candidate(field: &str, suggestion: &Suggestion) -> Result<Option<MappedCandidate>, EditError> {
    let spec = field_spec(field).ok_or_else(|| EditError::UnknownField(field.to_string()))?;
    if !spec.accepts_suggestions() {
        warn!(field = spec.name, "Suggestion for a field that does not take suggestions, skipping");
        return Ok(None);
    }
    let value = suggestion.value.trim();

    let mapped = match strategy_for(spec) {
        PopulationStrategy::Roles => suggestion.role_data.as_ref().map(|data| MappedCandidate::Role(map_role(data))),
        PopulationStrategy::Entities => match spec.name {
            "distributions" => parse_entity(value).map(MappedCandidate::Distribution),
            "sparqlEndpoint" => parse_entity(value).map(MappedCandidate::SparqlEndpoint),
            "exampleResource" => parse_entity(value).map(MappedCandidate::ExampleResource),
            "linkedResources" => parse_entity(value).map(MappedCandidate::LinkedResource),
            other => return Err(EditError::UnknownField(other.to_string())),
        },
        _ if value.is_empty() => None,
        PopulationStrategy::License => Some(MappedCandidate::License(match_license(value))),
        PopulationStrategy::AppendDistinct => Some(MappedCandidate::Tag {
            field: spec.name,
            value: value.to_string(),
        }),
        PopulationStrategy::FirstCandidate => Some(MappedCandidate::Scalar {
            field: spec.name,
            value: value.to_string(),
        }),
    };
    Ok(mapped)
}

fn push_entity<T: NestedEntity>(record: &mut FormRecord, entity: T) -> bool {
    if entity.is_blank() {
        return false;
    }
    T::collection_mut(record).push(entity);
    true
}

/// Write a decoded candidate into the record.
///
/// Returns whether the record changed. Roles identical to an existing role
/// are not appended again.
pub fn merge_candidate(
    record: &mut FormRecord,
    index: &mut InvalidTagIndex,
    candidate: MappedCandidate,
) -> Result<bool, EditError> {
    match candidate {
        MappedCandidate::Scalar { field, value } => {
            let slot = record
                .scalar_mut(field)
                .ok_or_else(|| EditError::UnknownField(field.to_string()))?;
            let changed = *slot != value;
            *slot = value;
            Ok(changed)
        }
        MappedCandidate::License(choice) => {
            let value = choice.stored_value().to_string();
            let changed = record.license != value;
            record.license = value;
            Ok(changed)
        }
        MappedCandidate::Tag { field, value } => Ok(merge_distinct(record, index, field, [value])? > 0),
        MappedCandidate::Role(role) => {
            if record.roles.contains(&role) {
                debug!(role_type = %role.role_type, "Skipping duplicate role suggestion");
                return Ok(false);
            }
            record.roles.push(role);
            Ok(true)
        }
        MappedCandidate::Distribution(d) => Ok(push_entity(record, d)),
        MappedCandidate::SparqlEndpoint(e) => Ok(push_entity(record, e)),
        MappedCandidate::ExampleResource(e) => Ok(push_entity(record, e)),
        MappedCandidate::LinkedResource(l) => Ok(push_entity(record, l)),
    }
}

/// Summary of an "add all" pass over one field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    pub applied: usize,
    pub skipped: usize,
    /// Set when the license field was populated.
    pub license: Option<LicenseChoice>,
}

/// Apply every candidate for `field` using the field's strategy.
///
/// First-candidate fields only consider the first usable candidate.
pub fn apply_all(
    record: &mut FormRecord,
    index: &mut InvalidTagIndex,
    field: &str,
    suggestions: &FieldSuggestions,
) -> Result<ApplyReport, EditError> {
    let spec = field_spec(field).ok_or_else(|| EditError::UnknownField(field.to_string()))?;
    if !spec.accepts_suggestions() {
        warn!(
            field = spec.name,
            candidate_count = suggestions.suggestions.len(),
            "Suggestions for a field that does not take suggestions, skipping"
        );
        return Ok(ApplyReport {
            skipped: suggestions.suggestions.len(),
            ..Default::default()
        });
    }
    let single = matches!(
        strategy_for(spec),
        PopulationStrategy::FirstCandidate | PopulationStrategy::License
    );

    let mut report = ApplyReport::default();
    for suggestion in &suggestions.suggestions {
        let Some(candidate) = map_candidate(field, suggestion)? else {
            report.skipped += 1;
            continue;
        };
        if let MappedCandidate::License(choice) = &candidate {
            report.license = Some(choice.clone());
        }
        if merge_candidate(record, index, candidate)? {
            report.applied += 1;
        } else {
            report.skipped += 1;
        }
        if single {
            break;
        }
    }

    debug!(
        field,
        applied = report.applied,
        skipped = report.skipped,
        candidate_count = suggestions.suggestions.len(),
        "Applied suggestions"
    );
    Ok(report)
}
