//! Submission payload handed to the submission backend.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::draft::{EditSession, FormType};
use crate::models::FormRecord;
use crate::suggestions::FieldSuggestions;

/// Whether validation failures block the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionMode {
    #[serde(rename = "NORMAL_SUBMISSION")]
    Normal,
    #[serde(rename = "FORCED_SUBMISSION")]
    Forced,
}

impl SubmissionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionMode::Normal => "NORMAL_SUBMISSION",
            SubmissionMode::Forced => "FORCED_SUBMISSION",
        }
    }
}

/// Which editing mode produced the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionType {
    Regular,
    Llm,
    Turtle,
}

impl From<FormType> for SubmissionType {
    fn from(form_type: FormType) -> Self {
        match form_type {
            FormType::Normal => SubmissionType::Regular,
            FormType::Llm => SubmissionType::Llm,
            FormType::Turtle => SubmissionType::Turtle,
        }
    }
}

/// A populated date field that failed its format check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidDate {
    pub field: String,
    pub label: String,
    pub value: String,
    pub message: String,
}

/// Validation failures recorded on a forced submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationErrors {
    /// Labels of missing required fields, in check order.
    pub missing_fields: Vec<String>,
    #[serde(default)]
    pub invalid_dates: Vec<InvalidDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub turtle_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.missing_fields.is_empty() && self.invalid_dates.is_empty() && self.turtle_errors.is_empty()
    }

    /// One human-readable report covering every failure.
    pub fn consolidated_message(&self) -> String {
        let mut parts = Vec::new();
        if !self.missing_fields.is_empty() {
            parts.push(format!(
                "Please fill in the following required fields: {}",
                self.missing_fields.join(", ")
            ));
        }
        if !self.invalid_dates.is_empty() {
            let dates: Vec<String> = self
                .invalid_dates
                .iter()
                .map(|d| format!("{} ('{}'): {}", d.label, d.value, d.message))
                .collect();
            parts.push(format!("Please correct the following dates: {}", dates.join("; ")));
        }
        if !self.turtle_errors.is_empty() {
            parts.push(format!(
                "Please correct the Turtle document: {}",
                self.turtle_errors.join("; ")
            ));
        }
        parts.join("\n")
    }
}

/// Timing and provenance of a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionMetadata {
    pub submission_type: SubmissionType,
    pub submission_mode: SubmissionMode,
    pub submitted_at: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    pub edit_sessions: Vec<EditSession>,
    pub total_time_spent_seconds: i64,
    pub session_count: usize,
    pub draft_id: Option<Uuid>,
    pub submission_id: String,
    /// Set when the countdown expiry triggered the submission.
    #[serde(default)]
    pub timer_expired: bool,
}

/// The immutable record handed to the submission backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub form_data: FormRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turtle_content: Option<String>,
    pub validation_errors: Option<ValidationErrors>,
    pub ai_suggestions: BTreeMap<String, FieldSuggestions>,
    pub metadata: SubmissionMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_wire_names() {
        assert_eq!(
            serde_json::to_value(SubmissionMode::Forced).unwrap(),
            "FORCED_SUBMISSION"
        );
        assert_eq!(SubmissionMode::Normal.as_str(), "NORMAL_SUBMISSION");
    }

    #[test]
    fn test_submission_type_from_form_type() {
        assert_eq!(SubmissionType::from(FormType::Normal), SubmissionType::Regular);
        assert_eq!(serde_json::to_value(SubmissionType::Llm).unwrap(), "llm");
    }

    #[test]
    fn test_consolidated_message_lists_everything() {
        let errors = ValidationErrors {
            missing_fields: vec!["Published Date".into(), "Keywords".into()],
            invalid_dates: vec![InvalidDate {
                field: "createdDate".into(),
                label: "Created Date".into(),
                value: "2023/02/29".into(),
                message: "Day must be between 01 and 28 for 2023/02".into(),
            }],
            turtle_errors: vec![],
        };
        let message = errors.consolidated_message();
        assert!(message.contains("Published Date, Keywords"));
        assert!(message.contains("Created Date ('2023/02/29')"));
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_validation_errors_wire_names() {
        let errors = ValidationErrors {
            missing_fields: vec!["Keywords".into()],
            ..Default::default()
        };
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["missingFields"], serde_json::json!(["Keywords"]));
        assert!(json.get("turtleErrors").is_none());
    }
}
