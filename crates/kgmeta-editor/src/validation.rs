//! Submission-time validation of a record or a raw Turtle document.

use tracing::debug;

use kgmeta_core::schema::date_fields;
use kgmeta_core::{
    check_turtle, field_spec, validate_calendar_date, FormRecord, InvalidDate, ValidationErrors,
    SUBMISSION_REQUIRED_FIELDS,
};

/// Validation errors together with the consolidated user-facing message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: ValidationErrors,
    pub message: String,
}

impl ValidationReport {
    pub fn new(errors: ValidationErrors) -> Self {
        let message = errors.consolidated_message();
        Self { errors, message }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check required fields (in report order) and every populated date.
pub fn validate_record(record: &FormRecord) -> ValidationErrors {
    let missing_fields: Vec<String> = SUBMISSION_REQUIRED_FIELDS
        .iter()
        .filter_map(|name| field_spec(name))
        .filter(|spec| record.is_field_empty(spec))
        .map(|spec| spec.label.to_string())
        .collect();

    let mut invalid_dates = Vec::new();
    for spec in date_fields() {
        let values: Vec<&String> = match (record.scalar(spec.name), record.values(spec.name)) {
            (Some(value), _) => vec![value],
            (None, Some(values)) => values.iter().collect(),
            (None, None) => Vec::new(),
        };
        for value in values.into_iter().filter(|v| !v.trim().is_empty()) {
            if let Some(message) = validate_calendar_date(value) {
                invalid_dates.push(InvalidDate {
                    field: spec.name.to_string(),
                    label: spec.label.to_string(),
                    value: value.clone(),
                    message,
                });
            }
        }
    }

    debug!(
        missing = missing_fields.len(),
        invalid_dates = invalid_dates.len(),
        "Record validated"
    );
    ValidationErrors {
        missing_fields,
        invalid_dates,
        turtle_errors: Vec::new(),
    }
}

/// Check a raw Turtle document. An empty document is itself an error.
pub fn validate_turtle_document(content: &str) -> ValidationErrors {
    ValidationErrors {
        turtle_errors: check_turtle(content),
        ..Default::default()
    }
}
