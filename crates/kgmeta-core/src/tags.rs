//! Multi-value ("tag") and single-value field management.
//!
//! Invalid tag values are kept and flagged in an [`InvalidTagIndex`] rather
//! than rejected. Single-value fields reject a second value and any value that
//! fails its format check.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::EditError;
use crate::models::FormRecord;
use crate::schema::{field_spec, FieldSpec};

/// Field name → tag value → validation message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvalidTagIndex(BTreeMap<String, BTreeMap<String, String>>);

impl InvalidTagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str, value: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(|errors| errors.get(value))
            .map(String::as_str)
    }

    pub fn insert(&mut self, field: &str, value: &str, message: String) {
        self.0
            .entry(field.to_string())
            .or_default()
            .insert(value.to_string(), message);
    }

    /// Remove one entry, pruning the field map once it is empty.
    pub fn remove(&mut self, field: &str, value: &str) -> Option<String> {
        let errors = self.0.get_mut(field)?;
        let removed = errors.remove(value);
        if errors.is_empty() {
            self.0.remove(field);
        }
        removed
    }

    pub fn field_errors(&self, field: &str) -> Option<&BTreeMap<String, String>> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// What happened to an added tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOutcome {
    /// Blank input; nothing changed.
    Ignored,
    /// Appended and valid.
    Added,
    /// Appended but flagged invalid with this message.
    Flagged(String),
}

fn multi_value_spec(field: &str) -> Result<&'static FieldSpec, EditError> {
    let spec = field_spec(field).ok_or_else(|| EditError::UnknownField(field.to_string()))?;
    if !spec.is_multi_value() {
        return Err(EditError::NotMultiValue { label: spec.label });
    }
    Ok(spec)
}

fn single_value_spec(field: &str) -> Result<&'static FieldSpec, EditError> {
    let spec = field_spec(field).ok_or_else(|| EditError::UnknownField(field.to_string()))?;
    if !spec.is_single_value() {
        return Err(EditError::NotSingleValue { label: spec.label });
    }
    Ok(spec)
}

/// Append a trimmed value to a multi-value field.
///
/// The value is always appended; a format failure is recorded in `index`.
pub fn add_tag(
    record: &mut FormRecord,
    index: &mut InvalidTagIndex,
    field: &str,
    raw_value: &str,
) -> Result<TagOutcome, EditError> {
    let spec = multi_value_spec(field)?;
    let value = raw_value.trim();
    if value.is_empty() {
        return Ok(TagOutcome::Ignored);
    }
    let values = record
        .values_mut(field)
        .ok_or_else(|| EditError::UnknownField(field.to_string()))?;
    values.push(value.to_string());

    match spec.validate_value(value) {
        Some(message) => {
            tracing::debug!(field, value, %message, "Tag flagged invalid");
            index.insert(field, value, message.clone());
            Ok(TagOutcome::Flagged(message))
        }
        None => {
            index.remove(field, value);
            Ok(TagOutcome::Added)
        }
    }
}

/// Remove the value at `position`, dropping its invalid-index entry.
pub fn remove_tag(
    record: &mut FormRecord,
    index: &mut InvalidTagIndex,
    field: &str,
    position: usize,
) -> Result<String, EditError> {
    let spec = multi_value_spec(field)?;
    let values = record
        .values_mut(field)
        .ok_or_else(|| EditError::UnknownField(field.to_string()))?;
    if position >= values.len() {
        return Err(EditError::IndexOutOfRange {
            kind: spec.label,
            index: position,
        });
    }
    let removed = values.remove(position);
    index.remove(field, &removed);
    Ok(removed)
}

/// Current error for a stored tag.
///
/// Values without an index entry are re-validated on every call, so rule
/// changes apply to previously accepted values.
pub fn tag_error(index: &InvalidTagIndex, field: &str, value: &str) -> Option<String> {
    if let Some(message) = index.get(field, value) {
        return Some(message.to_string());
    }
    field_spec(field).and_then(|spec| spec.validate_value(value))
}

/// Set a single-value field that is currently empty.
///
/// Returns `Ok(false)` for blank input.
pub fn add_single_value(record: &mut FormRecord, field: &str, raw_value: &str) -> Result<bool, EditError> {
    let spec = single_value_spec(field)?;
    let value = raw_value.trim();
    if value.is_empty() {
        return Ok(false);
    }
    let slot = record
        .scalar_mut(field)
        .ok_or_else(|| EditError::UnknownField(field.to_string()))?;
    if !slot.trim().is_empty() {
        return Err(EditError::OnlyOneValue { label: spec.label });
    }
    if let Some(message) = spec.validate_value(value) {
        return Err(EditError::InvalidFormat {
            label: spec.label.to_string(),
            message,
        });
    }
    *slot = value.to_string();
    Ok(true)
}

/// Clear a single-value field to the empty string.
pub fn remove_single_value(record: &mut FormRecord, field: &str) -> Result<(), EditError> {
    single_value_spec(field)?;
    if let Some(slot) = record.scalar_mut(field) {
        slot.clear();
    }
    Ok(())
}

/// Append candidates not already present, in order, through [`add_tag`].
///
/// Returns how many values were appended.
pub fn merge_distinct(
    record: &mut FormRecord,
    index: &mut InvalidTagIndex,
    field: &str,
    candidates: impl IntoIterator<Item = String>,
) -> Result<usize, EditError> {
    multi_value_spec(field)?;
    let mut added = 0;
    for candidate in candidates {
        let value = candidate.trim();
        let present = record
            .values(field)
            .is_some_and(|values| values.iter().any(|v| v == value));
        if value.is_empty() || present {
            tracing::trace!(field, value, "Skipping duplicate or blank candidate");
            continue;
        }
        if add_tag(record, index, field, value)? != TagOutcome::Ignored {
            added += 1;
        }
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_tag_trims_and_appends() {
        let mut record = FormRecord::default();
        let mut index = InvalidTagIndex::new();
        let outcome = add_tag(&mut record, &mut index, "keywords", "  rdf  ").unwrap();
        assert_eq!(outcome, TagOutcome::Added);
        assert_eq!(record.keywords, vec!["rdf"]);
    }

    #[test]
    fn test_add_blank_tag_is_noop() {
        let mut record = FormRecord::default();
        let mut index = InvalidTagIndex::new();
        assert_eq!(
            add_tag(&mut record, &mut index, "keywords", "   ").unwrap(),
            TagOutcome::Ignored
        );
        assert!(record.keywords.is_empty());
    }

    #[test]
    fn test_invalid_tag_kept_and_flagged() {
        let mut record = FormRecord::default();
        let mut index = InvalidTagIndex::new();
        let outcome = add_tag(&mut record, &mut index, "homepageURL", "kg.example.org").unwrap();
        assert!(matches!(outcome, TagOutcome::Flagged(_)));
        assert_eq!(record.homepage_url, vec!["kg.example.org"]);
        assert!(index.get("homepageURL", "kg.example.org").is_some());
    }

    #[test]
    fn test_add_then_remove_restores_prior_state() {
        let mut record = FormRecord::default();
        record.language.push("en".into());
        let mut index = InvalidTagIndex::new();
        let before_record = record.clone();
        let before_index = index.clone();

        add_tag(&mut record, &mut index, "language", "english").unwrap();
        assert!(!index.is_empty());
        let removed = remove_tag(&mut record, &mut index, "language", 1).unwrap();

        assert_eq!(removed, "english");
        assert_eq!(record, before_record);
        assert_eq!(index, before_index);
        assert!(index.field_errors("language").is_none());
    }

    #[test]
    fn test_remove_tag_out_of_range() {
        let mut record = FormRecord::default();
        let mut index = InvalidTagIndex::new();
        assert!(matches!(
            remove_tag(&mut record, &mut index, "keywords", 0),
            Err(EditError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_tag_ops_reject_non_multi_fields() {
        let mut record = FormRecord::default();
        let mut index = InvalidTagIndex::new();
        assert_eq!(
            add_tag(&mut record, &mut index, "title", "x").unwrap_err(),
            EditError::NotMultiValue { label: "Title" }
        );
        assert!(matches!(
            add_tag(&mut record, &mut index, "roles", "x"),
            Err(EditError::NotMultiValue { .. })
        ));
        assert_eq!(
            add_tag(&mut record, &mut index, "nope", "x").unwrap_err(),
            EditError::UnknownField("nope".into())
        );
    }

    #[test]
    fn test_tag_error_lazy_revalidation() {
        let mut record = FormRecord::default();
        record.vocabularies_used.push("foaf".into());
        let index = InvalidTagIndex::new();
        assert!(tag_error(&index, "vocabulariesUsed", "foaf").is_some());
        assert!(tag_error(&index, "vocabulariesUsed", "http://xmlns.com/foaf/0.1/").is_none());
    }

    #[test]
    fn test_tag_error_prefers_recorded_message() {
        let mut index = InvalidTagIndex::new();
        index.insert("keywords", "x", "recorded".into());
        assert_eq!(tag_error(&index, "keywords", "x").as_deref(), Some("recorded"));
    }

    #[test]
    fn test_add_single_value_rejects_second_value() {
        let mut record = FormRecord::default();
        assert!(add_single_value(&mut record, "version", "1.0").unwrap());
        let err = add_single_value(&mut record, "version", "2.0").unwrap_err();
        assert_eq!(err, EditError::OnlyOneValue { label: "Version" });
        assert_eq!(record.version, "1.0");
    }

    #[test]
    fn test_add_single_value_checks_format() {
        let mut record = FormRecord::default();
        let err = add_single_value(&mut record, "publishedDate", "2024-01-01").unwrap_err();
        assert!(matches!(err, EditError::InvalidFormat { .. }));
        assert_eq!(record.published_date, "");
        assert!(add_single_value(&mut record, "publishedDate", "2024/01/01").unwrap());
    }

    #[test]
    fn test_remove_single_value_clears() {
        let mut record = FormRecord::default();
        record.license = "https://opensource.org/licenses/MIT".into();
        remove_single_value(&mut record, "license").unwrap();
        assert_eq!(record.license, "");
        assert!(remove_single_value(&mut record, "keywords").is_err());
    }

    #[test]
    fn test_merge_distinct_dedupes_in_order() {
        let mut record = FormRecord::default();
        record.keywords.push("rdf".into());
        let mut index = InvalidTagIndex::new();
        let added = merge_distinct(
            &mut record,
            &mut index,
            "keywords",
            vec!["owl".into(), "rdf".into(), "owl".into(), " sparql ".into(), "".into()],
        )
        .unwrap();
        assert_eq!(added, 2);
        assert_eq!(record.keywords, vec!["rdf", "owl", "sparql"]);
    }
}
