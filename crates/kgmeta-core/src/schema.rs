//! Field schema registry.
//!
//! One static table describes every form field: cardinality, value kind,
//! submission requirement, and whether it participates in suggestion
//! requests. Generic dispatch (tag management, suggestion mapping, submission
//! validation) is keyed by this table rather than by ad hoc per-field branches.

use serde::Serialize;

use crate::validators::{validate_bcp47, validate_calendar_date, validate_iri};

/// How many values a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    One,
    Many,
}

/// The kind of value a field holds; drives validation and population strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text.
    Scalar,
    /// IRI validated by [`validate_iri`].
    Iri,
    /// Calendar date validated by [`validate_calendar_date`].
    Date,
    /// BCP-47 tag validated by [`validate_bcp47`].
    Language,
    /// Repeatable nested entity edited through a scratch object.
    EntityCollection,
    /// The `type` flag set.
    TypeFlags,
}

/// Static description of one form field.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    /// Wire name of the field (camelCase, as stored in drafts).
    pub name: &'static str,
    /// Human-readable label used in messages.
    pub label: &'static str,
    pub cardinality: Cardinality,
    pub kind: FieldKind,
    /// Must be present for a normal submission.
    pub required: bool,
    /// Included in suggestion requests.
    pub suggestible: bool,
    /// Instruction sent to the suggestion provider.
    pub instruction: &'static str,
}

impl FieldSpec {
    /// Validate one value of this field. Blank values are valid.
    pub fn validate_value(&self, value: &str) -> Option<String> {
        match self.kind {
            FieldKind::Iri => validate_iri(value),
            FieldKind::Date => validate_calendar_date(value),
            FieldKind::Language => validate_bcp47(value),
            FieldKind::Scalar | FieldKind::EntityCollection | FieldKind::TypeFlags => None,
        }
    }

    /// Whether values of this field go through a format validator.
    pub fn is_format_checked(&self) -> bool {
        matches!(self.kind, FieldKind::Iri | FieldKind::Date | FieldKind::Language)
    }

    pub fn is_multi_value(&self) -> bool {
        self.cardinality == Cardinality::Many
            && !matches!(self.kind, FieldKind::EntityCollection | FieldKind::TypeFlags)
    }

    pub fn is_single_value(&self) -> bool {
        self.cardinality == Cardinality::One
    }

    pub fn is_entity_collection(&self) -> bool {
        self.kind == FieldKind::EntityCollection
    }

    /// Whether suggestion candidates can be written into this field.
    /// Type flags have no candidate-shaped slot in the record.
    pub fn accepts_suggestions(&self) -> bool {
        self.suggestible && self.kind != FieldKind::TypeFlags
    }
}

/// The twenty role types a Role may carry, as wire strings.
pub const ROLE_TYPE_NAMES: [&str; 20] = [
    "resourceProvider",
    "custodian",
    "owner",
    "user",
    "distributor",
    "originator",
    "pointOfContact",
    "principalInvestigator",
    "processor",
    "publisher",
    "author",
    "sponsor",
    "coAuthor",
    "collaborator",
    "editor",
    "mediator",
    "rightsHolder",
    "contributor",
    "funder",
    "stakeholder",
];

pub const ROLES_INSTRUCTION: &str = "Identify the people and organizations that play a role for the KG (creator, publisher, funder, contact point, and so on). Return one suggestion per role. Each suggestion must carry roleData with roleType (one of: resourceProvider, custodian, owner, user, distributor, originator, pointOfContact, principalInvestigator, processor, publisher, author, sponsor, coAuthor, collaborator, editor, mediator, rightsHolder, contributor, funder, stakeholder), mode (\"iri\" when the agent is identified by an IRI/URL, \"name_mbox\" when identified by a name and optional email), and iri, or name and email.";

pub const DISTRIBUTIONS_INSTRUCTION: &str = "Identify the downloadable distributions of the KG (dumps, files, data services). Each suggestion value must be a JSON-encoded object with the keys title, description, mediaType, downloadURL, accessURL, accessService, byteSize, compressionFormat, packagingFormat, hasPolicy, license, rights, spatialResolution, temporalResolution, releaseDate, modificationDate, issued. Use YYYY/MM/DD for dates and leave out keys with no known value.";

pub const SPARQL_ENDPOINT_INSTRUCTION: &str = "Provide the SPARQL endpoints for the KG. Each suggestion value must be a JSON-encoded object with the keys endpointURL, identifier, title, endpointDescription, status. Leave out keys with no known value.";

pub const EXAMPLE_RESOURCE_INSTRUCTION: &str = "Provide example instances in the KG. Each suggestion value must be a JSON-encoded object with the keys title, description, status, accessURL. Leave out keys with no known value.";

pub const LINKED_RESOURCES_INSTRUCTION: &str = "Specify resources the KG links to (e.g. Wikidata, DBpedia). Each suggestion value must be a JSON-encoded object with the keys target (the IRI of the linked dataset) and triples (the integer number of linking triples). Leave out keys with no known value.";

const fn one(
    name: &'static str,
    label: &'static str,
    kind: FieldKind,
    required: bool,
    instruction: &'static str,
) -> FieldSpec {
    FieldSpec {
        name,
        label,
        cardinality: Cardinality::One,
        kind,
        required,
        suggestible: true,
        instruction,
    }
}

const fn many(
    name: &'static str,
    label: &'static str,
    kind: FieldKind,
    required: bool,
    instruction: &'static str,
) -> FieldSpec {
    FieldSpec {
        name,
        label,
        cardinality: Cardinality::Many,
        kind,
        required,
        suggestible: true,
        instruction,
    }
}

/// Every field of the form record, in form order.
pub static FIELD_REGISTRY: &[FieldSpec] = &[
    many("identifier", "Identifier", FieldKind::Scalar, false, "The identifier for KG metadata."),
    FieldSpec {
        name: "type",
        label: "Type",
        cardinality: Cardinality::Many,
        kind: FieldKind::TypeFlags,
        required: true,
        suggestible: false,
        instruction: "The type of object in the description.",
    },
    one("title", "Title", FieldKind::Scalar, true, "The name or formal title for the KG."),
    many("alternativeTitle", "Alternative Title", FieldKind::Scalar, false, "Another name for the KG."),
    many("acronym", "Acronym", FieldKind::Scalar, false, "An acronym used to identify the KG."),
    one("description", "Description", FieldKind::Scalar, true, "Provide a human readable description of the KG. Minimally, the description should be in English, and ideally, there would be descriptions available in other languages."),
    many("homepageURL", "Homepage URL", FieldKind::Iri, false, "A page or document about the KG."),
    many("otherPages", "Other Pages", FieldKind::Iri, false, "Provide additional relevant pages for the KG."),
    many("roles", "Roles", FieldKind::EntityCollection, false, ROLES_INSTRUCTION),
    one("createdDate", "Created Date", FieldKind::Date, false, "Provide the date when the KG is created."),
    many("modifiedDate", "Modified Date", FieldKind::Date, false, "The date when the KG is lastly modified."),
    one("publishedDate", "Published Date", FieldKind::Date, true, "The date when the KG is published."),
    many("vocabulariesUsed", "Vocabularies Used", FieldKind::Iri, true, "Specify the vocabularies used in the knowledge."),
    many("kgSchema", "KG Schema", FieldKind::Iri, false, "To provide a formal specification to validate the KG data."),
    many("primaryReferenceDocument", "Primary Reference Document", FieldKind::Iri, true, "Provide a reference to a document, preprint or data paper describing the KG."),
    many("metaGraph", "Meta Graph", FieldKind::Iri, false, "Provide an illustration of the graph connectivity through its types and relations between instances."),
    many("statistics", "Statistics", FieldKind::Scalar, false, "Number of Triples: Provide a computational representation of the summary statistics of the knowledge graph, such as the number of triples for different properties. See HCLS: https://www.w3.org/TR/hcls-dataset/#s6."),
    many("distributions", "Distributions", FieldKind::EntityCollection, true, DISTRIBUTIONS_INSTRUCTION),
    many("restAPI", "REST API", FieldKind::Iri, false, "Provide a REST API endpoint IRI for the KG."),
    many("sparqlEndpoint", "SPARQL Endpoint", FieldKind::EntityCollection, false, SPARQL_ENDPOINT_INSTRUCTION),
    many("exampleQueries", "Example Queries", FieldKind::Scalar, false, "Provide an exemplar query against the KG."),
    one("version", "Version", FieldKind::Scalar, false, "Specify the version of the dataset, if defined."),
    one("license", "License", FieldKind::Scalar, false, "Provide the license that the KG is released with."),
    many("keywords", "Keywords", FieldKind::Scalar, true, "Provide a set of keywords for the KG."),
    many("category", "Category", FieldKind::Scalar, false, "A main category of the resource. A resource can have multiple themes."),
    many("publicationReferences", "Publication References", FieldKind::Iri, false, "Provide references for the KG."),
    many("language", "Language", FieldKind::Language, true, "Languages represented in the knowledge graph, as BCP-47 language tags (e.g. en, en-US)."),
    many("iriTemplate", "IRI Template", FieldKind::Scalar, false, "Provide IRI Templates, following RFC 6570, that individuals are typically identified by."),
    many("linkedResources", "Linked Resources", FieldKind::EntityCollection, false, LINKED_RESOURCES_INSTRUCTION),
    many("exampleResource", "Example Resource", FieldKind::EntityCollection, false, EXAMPLE_RESOURCE_INSTRUCTION),
    one("accessStatement", "Access Statement", FieldKind::Scalar, true, "Specify any restrictions on the access to the resource, and how to gain legitimate access."),
    many("source", "Source", FieldKind::Iri, false, "Specify the origin or source of data for the KG."),
    many("nameSpace", "Namespace", FieldKind::Iri, false, "The URI namespace that entity URIs in the dataset share (void:uriSpace), e.g. http://dbpedia.org/resource/."),
];

/// Fields checked for presence by a normal submission, in report order.
pub const SUBMISSION_REQUIRED_FIELDS: [&str; 10] = [
    "title",
    "description",
    "type",
    "publishedDate",
    "distributions",
    "primaryReferenceDocument",
    "keywords",
    "language",
    "accessStatement",
    "vocabulariesUsed",
];

/// Nested-entity collections always included in suggestion requests, in order.
pub const ENTITY_COLLECTION_FIELDS: [&str; 5] = [
    "roles",
    "distributions",
    "sparqlEndpoint",
    "exampleResource",
    "linkedResources",
];

/// Look up a field by wire name.
pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    FIELD_REGISTRY.iter().find(|f| f.name == name)
}

/// Human label for a field, falling back to the wire name.
pub fn field_label(name: &str) -> &str {
    field_spec(name).map(|f| f.label).unwrap_or(name)
}

/// All fields with a format validator that hold dates.
pub fn date_fields() -> impl Iterator<Item = &'static FieldSpec> {
    FIELD_REGISTRY.iter().filter(|f| f.kind == FieldKind::Date)
}
