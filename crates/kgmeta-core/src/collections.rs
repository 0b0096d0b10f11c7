//! Nested entity collections and their scratch-object edit pattern.
//!
//! Each collection (roles, distributions, SPARQL endpoints, example
//! resources, linked resources) is edited through one reusable scratch
//! object. Saving either appends it or replaces the entity being edited,
//! then resets the scratch object.

use serde_json::{Map, Value as JsonValue};

use crate::error::EditError;
use crate::models::{
    non_blank, Distribution, ExampleResource, FormRecord, LinkedResource, Role, RoleType,
    SparqlEndpoint,
};
use crate::validators::{validate_calendar_date, validate_email, validate_iri};

/// Format rule for one subfield of a nested entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubfieldKind {
    Text,
    Iri,
    Date,
    Email,
    Integer,
}

/// Static description of one nested-entity subfield.
#[derive(Debug, Clone, Copy)]
pub struct SubfieldSpec {
    /// JSON key, as produced by the suggestion provider and stored in drafts.
    pub key: &'static str,
    pub label: &'static str,
    pub kind: SubfieldKind,
    pub required: bool,
}

const fn sub(key: &'static str, label: &'static str, kind: SubfieldKind, required: bool) -> SubfieldSpec {
    SubfieldSpec {
        key,
        label,
        kind,
        required,
    }
}

fn validate_subfield(spec: &SubfieldSpec, value: &str, bypass: bool) -> Option<String> {
    if value.trim().is_empty() {
        return None;
    }
    match spec.kind {
        SubfieldKind::Iri => validate_iri(value),
        _ if bypass => None,
        SubfieldKind::Date => validate_calendar_date(value),
        SubfieldKind::Email => validate_email(value).error,
        SubfieldKind::Integer => {
            if value.trim().parse::<u64>().is_ok() {
                None
            } else {
                Some("Must be a whole number".to_string())
            }
        }
        SubfieldKind::Text => None,
    }
}

fn json_to_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// A repeatable structured sub-record of the form.
pub trait NestedEntity: Clone + Default + PartialEq + std::fmt::Debug {
    /// Singular noun used in messages ("distribution").
    const KIND: &'static str;
    /// Wire name of the collection field ("distributions").
    const COLLECTION: &'static str;

    fn subfields() -> &'static [SubfieldSpec];

    /// Current text of a subfield by JSON key.
    fn get(&self, key: &str) -> Option<&str>;

    /// Set a subfield by JSON key. Returns false for unknown keys.
    fn set(&mut self, key: &str, value: String) -> bool;

    fn collection(record: &FormRecord) -> &Vec<Self>;

    fn collection_mut(record: &mut FormRecord) -> &mut Vec<Self>;

    /// True when no subfield carries content.
    fn is_blank(&self) -> bool {
        Self::subfields()
            .iter()
            .all(|s| self.get(s.key).map_or(true, |v| v.trim().is_empty()))
    }

    /// Validate before add/save.
    ///
    /// With `bypass` set, required subfields are not enforced and only IRI
    /// subfields are format-checked.
    fn validate(&self, bypass: bool) -> Result<(), EditError> {
        if self.is_blank() {
            return Err(EditError::EmptyEntity { kind: Self::KIND });
        }
        if !bypass {
            let missing: Vec<&'static str> = Self::subfields()
                .iter()
                .filter(|s| s.required)
                .filter(|s| self.get(s.key).map_or(true, |v| v.trim().is_empty()))
                .map(|s| s.label)
                .collect();
            if !missing.is_empty() {
                return Err(EditError::MissingEntityFields {
                    kind: Self::KIND,
                    fields: missing,
                });
            }
        }
        for spec in Self::subfields() {
            let value = self.get(spec.key).unwrap_or("");
            if let Some(message) = validate_subfield(spec, value, bypass) {
                return Err(EditError::InvalidFormat {
                    label: spec.label.to_string(),
                    message,
                });
            }
        }
        Ok(())
    }

    /// Build an entity from a decoded JSON object, keeping known keys only.
    ///
    /// Missing keys stay empty; non-string scalars are stringified.
    fn from_json_object(object: &Map<String, JsonValue>) -> Self {
        let mut entity = Self::default();
        for spec in Self::subfields() {
            if let Some(text) = object.get(spec.key).and_then(json_to_text) {
                entity.set(spec.key, text);
            }
        }
        entity
    }
}

macro_rules! string_subfields {
    ($ty:ty, $kind:literal, $collection:literal, $field:ident, [$(($key:literal, $member:ident, $label:literal, $sk:ident, $req:literal)),+ $(,)?]) => {
        impl NestedEntity for $ty {
            const KIND: &'static str = $kind;
            const COLLECTION: &'static str = $collection;

            fn subfields() -> &'static [SubfieldSpec] {
                const SPECS: &[SubfieldSpec] = &[$(sub($key, $label, SubfieldKind::$sk, $req)),+];
                SPECS
            }

            fn get(&self, key: &str) -> Option<&str> {
                match key {
                    $($key => Some(self.$member.as_str()),)+
                    _ => None,
                }
            }

            fn set(&mut self, key: &str, value: String) -> bool {
                match key {
                    $($key => { self.$member = value; true })+
                    _ => false,
                }
            }

            fn collection(record: &FormRecord) -> &Vec<Self> {
                &record.$field
            }

            fn collection_mut(record: &mut FormRecord) -> &mut Vec<Self> {
                &mut record.$field
            }
        }
    };
}

string_subfields!(Distribution, "distribution", "distributions", distributions, [
    ("title", title, "Title", Text, true),
    ("description", description, "Description", Text, true),
    ("mediaType", media_type, "Media Type", Text, true),
    ("downloadURL", download_url, "Download URL", Iri, true),
    ("accessURL", access_url, "Access URL", Iri, true),
    ("accessService", access_service, "Access Service", Iri, false),
    ("byteSize", byte_size, "Byte Size", Text, false),
    ("compressionFormat", compression_format, "Compression Format", Text, false),
    ("packagingFormat", packaging_format, "Packaging Format", Text, false),
    ("hasPolicy", has_policy, "Has Policy", Iri, false),
    ("license", license, "License", Text, false),
    ("rights", rights, "Rights", Text, false),
    ("spatialResolution", spatial_resolution, "Spatial Resolution", Text, false),
    ("temporalResolution", temporal_resolution, "Temporal Resolution", Text, false),
    ("releaseDate", release_date, "Release Date", Date, false),
    ("modificationDate", modification_date, "Modification Date", Date, false),
    ("issued", issued, "Issued", Date, false),
]);

string_subfields!(SparqlEndpoint, "SPARQL endpoint", "sparqlEndpoint", sparql_endpoint, [
    ("endpointURL", endpoint_url, "Endpoint URL", Iri, false),
    ("identifier", identifier, "Identifier", Text, false),
    ("title", title, "Title", Text, false),
    ("endpointDescription", endpoint_description, "Endpoint Description", Text, false),
    ("status", status, "Status", Text, false),
]);

string_subfields!(ExampleResource, "example resource", "exampleResource", example_resource, [
    ("title", title, "Title", Text, false),
    ("description", description, "Description", Text, false),
    ("status", status, "Status", Text, false),
    ("accessURL", access_url, "Access URL", Iri, false),
]);

string_subfields!(LinkedResource, "linked resource", "linkedResources", linked_resources, [
    ("target", target, "Target", Iri, false),
    ("triples", triples, "Triples", Integer, false),
]);

impl NestedEntity for Role {
    const KIND: &'static str = "role";
    const COLLECTION: &'static str = "roles";

    fn subfields() -> &'static [SubfieldSpec] {
        const SPECS: &[SubfieldSpec] = &[
            sub("agent", "Agent", SubfieldKind::Iri, false),
            sub("givenName", "Given Name", SubfieldKind::Text, false),
            sub("email", "Email", SubfieldKind::Email, false),
        ];
        SPECS
    }

    fn get(&self, key: &str) -> Option<&str> {
        match key {
            "roleType" => Some(self.role_type.as_str()),
            "agent" => Some(self.agent.as_deref().unwrap_or("")),
            "givenName" => Some(self.given_name.as_deref().unwrap_or("")),
            "email" => Some(self.email.as_deref().unwrap_or("")),
            _ => None,
        }
    }

    fn set(&mut self, key: &str, value: String) -> bool {
        let slot = match key {
            "roleType" => {
                return match value.parse::<RoleType>() {
                    Ok(role_type) => {
                        self.role_type = role_type;
                        true
                    }
                    Err(_) => false,
                };
            }
            "agent" => &mut self.agent,
            "givenName" => &mut self.given_name,
            "email" => &mut self.email,
            _ => return false,
        };
        *slot = if value.trim().is_empty() { None } else { Some(value) };
        true
    }

    fn collection(record: &FormRecord) -> &Vec<Self> {
        &record.roles
    }

    fn collection_mut(record: &mut FormRecord) -> &mut Vec<Self> {
        &mut record.roles
    }

    fn is_blank(&self) -> bool {
        !non_blank(&self.agent) && !non_blank(&self.given_name) && !non_blank(&self.email)
    }
}

/// Scratch object plus edit position for one collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityEditor<T: NestedEntity> {
    pub current: T,
    pub editing_index: Option<usize>,
}

/// Result of a successful add-or-save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Appended(usize),
    Replaced(usize),
}

impl<T: NestedEntity> EntityEditor<T> {
    /// Validate the scratch object and append it, or replace the entity being
    /// edited. Resets the scratch object and edit position on success.
    pub fn add_or_save(&mut self, collection: &mut Vec<T>, bypass: bool) -> Result<SaveOutcome, EditError> {
        self.current.validate(bypass)?;
        let entity = std::mem::take(&mut self.current);
        let outcome = match self.editing_index.take() {
            Some(index) if index < collection.len() => {
                collection[index] = entity;
                SaveOutcome::Replaced(index)
            }
            _ => {
                collection.push(entity);
                SaveOutcome::Appended(collection.len() - 1)
            }
        };
        Ok(outcome)
    }

    /// Load an existing entity into the scratch object for editing.
    pub fn begin_edit(&mut self, collection: &[T], index: usize) -> Result<(), EditError> {
        let entity = collection.get(index).ok_or(EditError::IndexOutOfRange {
            kind: T::KIND,
            index,
        })?;
        self.current = entity.clone();
        self.editing_index = Some(index);
        Ok(())
    }

    /// Load a fresh entity (e.g. a suggestion) for review before adding.
    pub fn load(&mut self, entity: T) {
        self.current = entity;
        self.editing_index = None;
    }

    pub fn cancel(&mut self) {
        self.current = T::default();
        self.editing_index = None;
    }

    /// Remove an entity, keeping the edit position consistent.
    pub fn remove(&mut self, collection: &mut Vec<T>, index: usize) -> Result<T, EditError> {
        if index >= collection.len() {
            return Err(EditError::IndexOutOfRange {
                kind: T::KIND,
                index,
            });
        }
        let removed = collection.remove(index);
        match self.editing_index {
            Some(editing) if editing == index => self.cancel(),
            Some(editing) if editing > index => self.editing_index = Some(editing - 1),
            _ => {}
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete_distribution() -> Distribution {
        Distribution {
            title: "Dump".into(),
            description: "Full N-Triples dump".into(),
            media_type: "application/n-triples".into(),
            download_url: "https://kg.example.org/dump.nt".into(),
            access_url: "https://kg.example.org/download".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_entity_rejected() {
        let mut editor = EntityEditor::<SparqlEndpoint>::default();
        let mut list = Vec::new();
        let err = editor.add_or_save(&mut list, false).unwrap_err();
        assert_eq!(err, EditError::EmptyEntity { kind: "SPARQL endpoint" });
        assert!(list.is_empty());
    }

    #[test]
    fn test_empty_entity_rejected_even_with_bypass() {
        let mut editor = EntityEditor::<Distribution>::default();
        let mut list = Vec::new();
        assert!(editor.add_or_save(&mut list, true).is_err());
    }

    #[test]
    fn test_distribution_required_fields() {
        let mut editor = EntityEditor::<Distribution>::default();
        editor.current.title = "Only title".into();
        let mut list = Vec::new();
        match editor.add_or_save(&mut list, false).unwrap_err() {
            EditError::MissingEntityFields { kind, fields } => {
                assert_eq!(kind, "distribution");
                assert_eq!(
                    fields,
                    vec!["Description", "Media Type", "Download URL", "Access URL"]
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bypass_skips_required_but_checks_iris() {
        let mut editor = EntityEditor::<Distribution>::default();
        editor.current.title = "Partial".into();
        editor.current.release_date = "not a date".into();
        let mut list = Vec::new();
        assert_eq!(
            editor.add_or_save(&mut list, true).unwrap(),
            SaveOutcome::Appended(0)
        );

        editor.current.title = "Bad link".into();
        editor.current.access_url = "not-an-iri".into();
        let err = editor.add_or_save(&mut list, true).unwrap_err();
        assert!(matches!(err, EditError::InvalidFormat { ref label, .. } if label == "Access URL"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_add_then_edit_replaces_in_place() {
        let mut editor = EntityEditor::<Distribution>::default();
        let mut list = Vec::new();
        editor.current = complete_distribution();
        editor.add_or_save(&mut list, false).unwrap();
        assert_eq!(editor.current, Distribution::default());
        assert_eq!(editor.editing_index, None);

        editor.begin_edit(&list, 0).unwrap();
        editor.current.title = "Renamed".into();
        assert_eq!(
            editor.add_or_save(&mut list, false).unwrap(),
            SaveOutcome::Replaced(0)
        );
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].title, "Renamed");
    }

    #[test]
    fn test_remove_adjusts_editing_index() {
        let mut editor = EntityEditor::<LinkedResource>::default();
        let mut list = vec![
            LinkedResource { target: "https://a.example.org".into(), triples: "1".into() },
            LinkedResource { target: "https://b.example.org".into(), triples: "2".into() },
            LinkedResource { target: "https://c.example.org".into(), triples: "3".into() },
        ];
        editor.begin_edit(&list, 2).unwrap();
        editor.remove(&mut list, 0).unwrap();
        assert_eq!(editor.editing_index, Some(1));
        editor.remove(&mut list, 1).unwrap();
        assert_eq!(editor.editing_index, None);
        assert_eq!(editor.current, LinkedResource::default());
        assert!(editor.remove(&mut list, 5).is_err());
    }

    #[test]
    fn test_linked_resource_triples_must_be_integer() {
        let entity = LinkedResource {
            target: "https://www.wikidata.org".into(),
            triples: "many".into(),
        };
        assert!(entity.validate(false).is_err());
        assert!(entity.validate(true).is_ok());
    }

    #[test]
    fn test_role_blank_ignores_role_type() {
        let role = Role {
            role_type: RoleType::Funder,
            ..Default::default()
        };
        assert!(role.is_blank());
        assert_eq!(
            role.validate(false).unwrap_err(),
            EditError::EmptyEntity { kind: "role" }
        );
    }

    #[test]
    fn test_role_email_and_agent_checked() {
        let bad_email = Role::with_name(RoleType::Author, Some("Ada".into()), Some("ada@".into()));
        assert!(bad_email.validate(false).is_err());
        assert!(bad_email.validate(true).is_ok());

        let bad_agent = Role::with_agent(RoleType::Publisher, "publisher org");
        assert!(bad_agent.validate(true).is_err());
    }

    #[test]
    fn test_from_json_object_keeps_known_keys() {
        let object = json!({"title": "T", "downloadURL": "http://x", "bogus": 1})
            .as_object()
            .cloned()
            .unwrap();
        let dist = Distribution::from_json_object(&object);
        assert_eq!(dist.title, "T");
        assert_eq!(dist.download_url, "http://x");
        assert_eq!(dist.description, "");
        assert_eq!(dist.issued, "");
    }

    #[test]
    fn test_from_json_object_stringifies_numbers() {
        let object = json!({"target": "https://dbpedia.org", "triples": 1200})
            .as_object()
            .cloned()
            .unwrap();
        let linked = LinkedResource::from_json_object(&object);
        assert_eq!(linked.triples, "1200");
    }

    #[test]
    fn test_role_set_by_key() {
        let mut role = Role::default();
        assert!(role.set("roleType", "funder".into()));
        assert!(role.set("agent", "https://ror.org/05gq02987".into()));
        assert!(!role.set("roleType", "boss".into()));
        assert!(!role.set("nickname", "x".into()));
        assert_eq!(role.role_type, RoleType::Funder);
        assert_eq!(role.get("agent"), Some("https://ror.org/05gq02987"));
    }

    #[test]
    fn test_collection_accessors() {
        let mut record = FormRecord::default();
        Distribution::collection_mut(&mut record).push(complete_distribution());
        assert_eq!(Distribution::collection(&record).len(), 1);
        assert_eq!(Distribution::COLLECTION, "distributions");
        assert_eq!(SparqlEndpoint::COLLECTION, "sparqlEndpoint");
    }
}
