//! Form record and nested entity types.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::schema::{FieldKind, FieldSpec, ROLE_TYPE_NAMES};

// =============================================================================
// DATASET TYPE FLAGS
// =============================================================================

/// A dataset type flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DatasetType {
    #[serde(rename = "dcat:Dataset")]
    Dcat,
    #[serde(rename = "void:Dataset")]
    Void,
}

/// The `type` flag set. `dcat:Dataset` is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<DatasetType>", into = "Vec<DatasetType>")]
pub struct DatasetTypes(BTreeSet<DatasetType>);

impl Default for DatasetTypes {
    fn default() -> Self {
        Self(BTreeSet::from([DatasetType::Dcat]))
    }
}

impl From<Vec<DatasetType>> for DatasetTypes {
    fn from(types: Vec<DatasetType>) -> Self {
        let mut set: BTreeSet<DatasetType> = types.into_iter().collect();
        set.insert(DatasetType::Dcat);
        Self(set)
    }
}

impl From<DatasetTypes> for Vec<DatasetType> {
    fn from(types: DatasetTypes) -> Self {
        types.0.into_iter().collect()
    }
}

impl DatasetTypes {
    pub fn contains(&self, t: DatasetType) -> bool {
        self.0.contains(&t)
    }

    /// Toggle the `void:Dataset` flag. `dcat:Dataset` cannot be removed.
    pub fn set_void(&mut self, enabled: bool) {
        if enabled {
            self.0.insert(DatasetType::Void);
        } else {
            self.0.remove(&DatasetType::Void);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DatasetType> {
        self.0.iter()
    }
}

// =============================================================================
// ROLES
// =============================================================================

/// Role type of an agent with respect to the knowledge graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoleType {
    #[default]
    ResourceProvider,
    Custodian,
    Owner,
    User,
    Distributor,
    Originator,
    PointOfContact,
    PrincipalInvestigator,
    Processor,
    Publisher,
    Author,
    Sponsor,
    CoAuthor,
    Collaborator,
    Editor,
    Mediator,
    RightsHolder,
    Contributor,
    Funder,
    Stakeholder,
}

impl RoleType {
    pub const ALL: [RoleType; 20] = [
        RoleType::ResourceProvider,
        RoleType::Custodian,
        RoleType::Owner,
        RoleType::User,
        RoleType::Distributor,
        RoleType::Originator,
        RoleType::PointOfContact,
        RoleType::PrincipalInvestigator,
        RoleType::Processor,
        RoleType::Publisher,
        RoleType::Author,
        RoleType::Sponsor,
        RoleType::CoAuthor,
        RoleType::Collaborator,
        RoleType::Editor,
        RoleType::Mediator,
        RoleType::RightsHolder,
        RoleType::Contributor,
        RoleType::Funder,
        RoleType::Stakeholder,
    ];

    pub fn as_str(&self) -> &'static str {
        let pos = Self::ALL.iter().position(|r| r == self).unwrap_or(0);
        ROLE_TYPE_NAMES[pos]
    }
}

impl std::fmt::Display for RoleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleType {
    type Err = String;

    /// Parses the wire name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ROLE_TYPE_NAMES
            .iter()
            .position(|name| name.eq_ignore_ascii_case(s))
            .map(|pos| Self::ALL[pos])
            .ok_or_else(|| format!("Unknown role type: {}", s))
    }
}

/// How a role identifies its agent in the editing form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleMode {
    #[default]
    Iri,
    NameMbox,
}

/// An agent playing a role for the knowledge graph.
///
/// Either `agent` (IRI mode) or at least one of `given_name`/`email`
/// (name/email mode) is expected; storage does not enforce exclusivity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(default)]
    pub role_type: RoleType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Role {
    /// Role identified by an agent IRI.
    pub fn with_agent(role_type: RoleType, agent: impl Into<String>) -> Self {
        Self {
            role_type,
            agent: Some(agent.into()),
            ..Default::default()
        }
    }

    /// Role identified by name and optional email.
    pub fn with_name(role_type: RoleType, name: Option<String>, email: Option<String>) -> Self {
        Self {
            role_type,
            given_name: name,
            email,
            ..Default::default()
        }
    }

    pub fn mode(&self) -> RoleMode {
        if non_blank(&self.agent) {
            RoleMode::Iri
        } else {
            RoleMode::NameMbox
        }
    }
}

pub(crate) fn non_blank(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

// =============================================================================
// OTHER NESTED ENTITIES
// =============================================================================

/// A concrete downloadable form of the dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Distribution {
    pub title: String,
    pub description: String,
    pub media_type: String,
    #[serde(rename = "downloadURL")]
    pub download_url: String,
    #[serde(rename = "accessURL")]
    pub access_url: String,
    pub access_service: String,
    pub byte_size: String,
    pub compression_format: String,
    pub packaging_format: String,
    pub has_policy: String,
    pub license: String,
    pub rights: String,
    pub spatial_resolution: String,
    pub temporal_resolution: String,
    pub release_date: String,
    pub modification_date: String,
    pub issued: String,
}

/// A SPARQL service exposing the dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SparqlEndpoint {
    #[serde(rename = "endpointURL")]
    pub endpoint_url: String,
    pub identifier: String,
    pub title: String,
    pub endpoint_description: String,
    pub status: String,
}

/// An example instance of the dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExampleResource {
    pub title: String,
    pub description: String,
    pub status: String,
    #[serde(rename = "accessURL")]
    pub access_url: String,
}

/// A linkset to another dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkedResource {
    pub target: String,
    pub triples: String,
}

// =============================================================================
// FORM RECORD
// =============================================================================

/// The canonical metadata record being authored.
///
/// Single-value fields hold `""` when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormRecord {
    pub title: String,
    pub description: String,
    pub version: String,
    pub access_statement: String,
    pub license: String,
    pub created_date: String,
    pub published_date: String,

    pub identifier: Vec<String>,
    pub alternative_title: Vec<String>,
    pub acronym: Vec<String>,
    #[serde(rename = "homepageURL")]
    pub homepage_url: Vec<String>,
    pub other_pages: Vec<String>,
    pub modified_date: Vec<String>,
    pub keywords: Vec<String>,
    pub category: Vec<String>,
    pub language: Vec<String>,
    pub vocabularies_used: Vec<String>,
    pub kg_schema: Vec<String>,
    pub primary_reference_document: Vec<String>,
    pub meta_graph: Vec<String>,
    pub statistics: Vec<String>,
    #[serde(rename = "restAPI")]
    pub rest_api: Vec<String>,
    pub example_queries: Vec<String>,
    pub publication_references: Vec<String>,
    pub iri_template: Vec<String>,
    pub source: Vec<String>,
    pub name_space: Vec<String>,

    pub roles: Vec<Role>,
    pub distributions: Vec<Distribution>,
    pub sparql_endpoint: Vec<SparqlEndpoint>,
    pub example_resource: Vec<ExampleResource>,
    pub linked_resources: Vec<LinkedResource>,

    #[serde(rename = "type")]
    pub dataset_types: DatasetTypes,
}

impl FormRecord {
    /// Single-value field by wire name.
    pub fn scalar(&self, field: &str) -> Option<&String> {
        Some(match field {
            "title" => &self.title,
            "description" => &self.description,
            "version" => &self.version,
            "accessStatement" => &self.access_statement,
            "license" => &self.license,
            "createdDate" => &self.created_date,
            "publishedDate" => &self.published_date,
            _ => return None,
        })
    }

    pub fn scalar_mut(&mut self, field: &str) -> Option<&mut String> {
        Some(match field {
            "title" => &mut self.title,
            "description" => &mut self.description,
            "version" => &mut self.version,
            "accessStatement" => &mut self.access_statement,
            "license" => &mut self.license,
            "createdDate" => &mut self.created_date,
            "publishedDate" => &mut self.published_date,
            _ => return None,
        })
    }

    /// Multi-value field by wire name.
    pub fn values(&self, field: &str) -> Option<&Vec<String>> {
        Some(match field {
            "identifier" => &self.identifier,
            "alternativeTitle" => &self.alternative_title,
            "acronym" => &self.acronym,
            "homepageURL" => &self.homepage_url,
            "otherPages" => &self.other_pages,
            "modifiedDate" => &self.modified_date,
            "keywords" => &self.keywords,
            "category" => &self.category,
            "language" => &self.language,
            "vocabulariesUsed" => &self.vocabularies_used,
            "kgSchema" => &self.kg_schema,
            "primaryReferenceDocument" => &self.primary_reference_document,
            "metaGraph" => &self.meta_graph,
            "statistics" => &self.statistics,
            "restAPI" => &self.rest_api,
            "exampleQueries" => &self.example_queries,
            "publicationReferences" => &self.publication_references,
            "iriTemplate" => &self.iri_template,
            "source" => &self.source,
            "nameSpace" => &self.name_space,
            _ => return None,
        })
    }

    pub fn values_mut(&mut self, field: &str) -> Option<&mut Vec<String>> {
        Some(match field {
            "identifier" => &mut self.identifier,
            "alternativeTitle" => &mut self.alternative_title,
            "acronym" => &mut self.acronym,
            "homepageURL" => &mut self.homepage_url,
            "otherPages" => &mut self.other_pages,
            "modifiedDate" => &mut self.modified_date,
            "keywords" => &mut self.keywords,
            "category" => &mut self.category,
            "language" => &mut self.language,
            "vocabulariesUsed" => &mut self.vocabularies_used,
            "kgSchema" => &mut self.kg_schema,
            "primaryReferenceDocument" => &mut self.primary_reference_document,
            "metaGraph" => &mut self.meta_graph,
            "statistics" => &mut self.statistics,
            "restAPI" => &mut self.rest_api,
            "exampleQueries" => &mut self.example_queries,
            "publicationReferences" => &mut self.publication_references,
            "iriTemplate" => &mut self.iri_template,
            "source" => &mut self.source,
            "nameSpace" => &mut self.name_space,
            _ => return None,
        })
    }

    /// Number of entities in a nested-entity collection.
    pub fn entity_count(&self, field: &str) -> Option<usize> {
        Some(match field {
            "roles" => self.roles.len(),
            "distributions" => self.distributions.len(),
            "sparqlEndpoint" => self.sparql_endpoint.len(),
            "exampleResource" => self.example_resource.len(),
            "linkedResources" => self.linked_resources.len(),
            _ => return None,
        })
    }

    /// Whether a field currently holds no value.
    pub fn is_field_empty(&self, spec: &FieldSpec) -> bool {
        match spec.kind {
            FieldKind::TypeFlags => self.dataset_types.is_empty(),
            FieldKind::EntityCollection => self.entity_count(spec.name).unwrap_or(0) == 0,
            _ if spec.is_single_value() => self
                .scalar(spec.name)
                .map_or(true, |v| v.trim().is_empty()),
            _ => self.values(spec.name).map_or(true, |v| v.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{field_spec, FIELD_REGISTRY};

    #[test]
    fn test_dataset_types_always_contain_dcat() {
        let types: DatasetTypes = serde_json::from_str(r#"["void:Dataset"]"#).unwrap();
        assert!(types.contains(DatasetType::Dcat));
        assert!(types.contains(DatasetType::Void));

        let empty: DatasetTypes = serde_json::from_str("[]").unwrap();
        assert!(empty.contains(DatasetType::Dcat));
    }

    #[test]
    fn test_dataset_types_void_toggle() {
        let mut types = DatasetTypes::default();
        types.set_void(true);
        assert!(types.contains(DatasetType::Void));
        types.set_void(false);
        assert!(!types.contains(DatasetType::Void));
        assert!(types.contains(DatasetType::Dcat));
    }

    #[test]
    fn test_role_type_wire_names() {
        assert_eq!(RoleType::PointOfContact.as_str(), "pointOfContact");
        assert_eq!(
            serde_json::to_string(&RoleType::CoAuthor).unwrap(),
            "\"coAuthor\""
        );
        assert_eq!("Publisher".parse::<RoleType>().unwrap(), RoleType::Publisher);
        assert!("boss".parse::<RoleType>().is_err());
    }

    #[test]
    fn test_role_type_all_matches_names() {
        for (role, name) in RoleType::ALL.iter().zip(ROLE_TYPE_NAMES.iter()) {
            assert_eq!(serde_json::to_value(role).unwrap(), *name);
        }
    }

    #[test]
    fn test_role_mode() {
        assert_eq!(
            Role::with_agent(RoleType::Funder, "https://ror.org/123").mode(),
            RoleMode::Iri
        );
        assert_eq!(
            Role::with_name(RoleType::Author, Some("Ada".into()), None).mode(),
            RoleMode::NameMbox
        );
    }

    #[test]
    fn test_record_wire_names() {
        let record = FormRecord {
            homepage_url: vec!["https://kg.example.org".into()],
            rest_api: vec!["https://api.example.org".into()],
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("homepageURL").is_some());
        assert!(json.get("restAPI").is_some());
        assert!(json.get("nameSpace").is_some());
        assert!(json.get("sparqlEndpoint").is_some());
        assert_eq!(json["type"], serde_json::json!(["dcat:Dataset"]));
    }

    #[test]
    fn test_every_registry_field_is_addressable() {
        let record = FormRecord::default();
        for spec in FIELD_REGISTRY {
            let addressable = match spec.kind {
                FieldKind::TypeFlags => true,
                FieldKind::EntityCollection => record.entity_count(spec.name).is_some(),
                _ if spec.is_single_value() => record.scalar(spec.name).is_some(),
                _ => record.values(spec.name).is_some(),
            };
            assert!(addressable, "{} has no accessor", spec.name);
        }
    }

    #[test]
    fn test_is_field_empty() {
        let mut record = FormRecord::default();
        let title = field_spec("title").unwrap();
        let keywords = field_spec("keywords").unwrap();
        let distributions = field_spec("distributions").unwrap();
        assert!(record.is_field_empty(title));
        assert!(record.is_field_empty(keywords));
        assert!(record.is_field_empty(distributions));
        assert!(!record.is_field_empty(field_spec("type").unwrap()));

        record.title = "   ".into();
        assert!(record.is_field_empty(title));
        record.title = "KG".into();
        record.keywords.push("rdf".into());
        record.distributions.push(Distribution::default());
        assert!(!record.is_field_empty(title));
        assert!(!record.is_field_empty(keywords));
        assert!(!record.is_field_empty(distributions));
    }

    #[test]
    fn test_distribution_missing_keys_default_empty() {
        let dist: Distribution = serde_json::from_str(r#"{"title":"T"}"#).unwrap();
        assert_eq!(dist.title, "T");
        assert_eq!(dist.download_url, "");
    }
}
