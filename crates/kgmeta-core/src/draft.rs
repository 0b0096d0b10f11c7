//! Edit sessions and draft snapshots.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults::UNTITLED_DRAFT_NAME;
use crate::models::FormRecord;
use crate::suggestions::FieldSuggestions;

/// Which editing mode produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormType {
    /// Plain field-by-field editing.
    #[default]
    Normal,
    /// AI-assisted editing.
    Llm,
    /// Raw Turtle text entry.
    Turtle,
}

impl FormType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormType::Normal => "normal",
            FormType::Llm => "llm",
            FormType::Turtle => "turtle",
        }
    }
}

/// One open-to-close span of editing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSession {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: i64,
}

impl EditSession {
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            end_time,
            duration_seconds: (end_time - start_time).num_seconds().max(0),
        }
    }
}

/// Sum of recorded session durations.
pub fn total_duration_seconds(sessions: &[EditSession]) -> i64 {
    sessions.iter().map(|s| s.duration_seconds).sum()
}

/// A reloadable snapshot of an in-progress record.
///
/// Record fields are flattened into the draft object. Turtle drafts carry
/// their content in `turtle_content` and an empty record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub id: Uuid,
    pub name: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub form_type: FormType,
    #[serde(flatten)]
    pub record: FormRecord,
    pub draft_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_license_input: Option<String>,
    #[serde(default)]
    pub ai_suggestions: BTreeMap<String, FieldSuggestions>,
    #[serde(default)]
    pub edit_sessions: Vec<EditSession>,
    #[serde(default)]
    pub total_time_spent_seconds: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turtle_content: Option<String>,
}

impl Draft {
    /// Display name derived from the record title.
    pub fn display_name(record: &FormRecord) -> String {
        let title = record.title.trim();
        if title.is_empty() {
            UNTITLED_DRAFT_NAME.to_string()
        } else {
            title.to_string()
        }
    }
}

/// Sort drafts newest first by save date.
pub fn sort_newest_first(drafts: &mut [Draft]) {
    drafts.sort_by(|a, b| b.date.cmp(&a.date));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn draft(date: DateTime<Utc>, title: &str) -> Draft {
        let id = Uuid::now_v7();
        Draft {
            id,
            name: title.to_string(),
            date,
            form_type: FormType::Normal,
            record: FormRecord {
                title: title.to_string(),
                ..Default::default()
            },
            draft_id: id,
            custom_license_input: None,
            ai_suggestions: BTreeMap::new(),
            edit_sessions: Vec::new(),
            total_time_spent_seconds: 0,
            turtle_content: None,
        }
    }

    #[test]
    fn test_session_duration() {
        let session = EditSession::new(at(0), at(0) + Duration::seconds(95));
        assert_eq!(session.duration_seconds, 95);
    }

    #[test]
    fn test_total_duration() {
        let sessions = vec![EditSession::new(at(0), at(60)), EditSession::new(at(100), at(130))];
        assert_eq!(total_duration_seconds(&sessions), 90);
    }

    #[test]
    fn test_draft_flattens_record() {
        let d = draft(at(0), "QuoteKG");
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["title"], "QuoteKG");
        assert_eq!(json["formType"], "normal");
        assert!(json.get("draftId").is_some());
        assert!(json.get("record").is_none());
        assert!(json.get("turtleContent").is_none());
        let back: Draft = serde_json::from_value(json).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn test_sort_newest_first() {
        let mut drafts = vec![draft(at(0), "old"), draft(at(50), "new"), draft(at(10), "mid")];
        sort_newest_first(&mut drafts);
        let names: Vec<_> = drafts.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(Draft::display_name(&FormRecord::default()), UNTITLED_DRAFT_NAME);
    }
}
