//! Editor events, envelope, and event bus for post-mutation notifications.
//!
//! The editing engine never touches a UI. Anything a UI would react to
//! (focusing the role form after a suggestion was loaded, showing a notice,
//! counting down) is published here as an [`EditorEvent`]; UI layers and
//! tests subscribe independently.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::submission::SubmissionMode;

/// Versioned event envelope.
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    /// Unique event identifier (UUIDv7 for temporal ordering).
    pub event_id: Uuid,
    /// Namespaced event type (e.g. `"field.changed"`, `"timer.expired"`).
    pub event_type: String,
    /// When the event occurred (UTC).
    pub occurred_at: DateTime<Utc>,
    /// Editor session the event belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    /// Payload schema version.
    pub payload_version: u32,
    pub payload: EditorEvent,
}

impl EventEnvelope {
    pub fn new(event: EditorEvent, session_id: Option<Uuid>) -> Self {
        Self {
            event_id: crate::ids::new_v7(),
            event_type: event.namespaced_event_type().to_string(),
            occurred_at: Utc::now(),
            session_id,
            payload_version: 1,
            payload: event,
        }
    }
}

/// Notifications emitted after editor mutations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum EditorEvent {
    /// A form was opened (fresh or from a draft).
    FormOpened {
        #[serde(skip_serializing_if = "Option::is_none")]
        draft_id: Option<Uuid>,
    },
    /// The form was closed without submitting.
    FormClosed { session_seconds: i64 },
    /// A field value changed.
    FieldChanged { field: String },
    /// A tag was kept but flagged invalid.
    TagFlagged {
        field: String,
        value: String,
        message: String,
    },
    /// A transient notice should be shown until `expires_at`.
    Notice {
        message: String,
        expires_at: DateTime<Utc>,
    },
    /// A nested-entity candidate was loaded into its scratch form for review.
    FocusEntityForm { collection: String },
    /// A suggestion response was accepted.
    SuggestionsReceived { fields: Vec<String> },
    /// A late or superseded suggestion response was dropped.
    SuggestionsDiscarded { generation: u64 },
    /// Suggestion request failed.
    SuggestionsFailed { error: String },
    /// Suggestions were applied to a field.
    SuggestionsApplied { field: String, applied: usize },
    /// One countdown second elapsed.
    TimerTick { remaining_secs: u64 },
    /// The countdown reached zero.
    TimerExpired,
    /// Raw Turtle validation finished.
    TurtleChecked { problems: Vec<String> },
    /// A draft was saved.
    DraftSaved { draft_id: Uuid },
    /// Normal submission was blocked.
    SubmissionBlocked { missing_fields: Vec<String>, message: String },
    /// A submission was produced.
    Submitted {
        submission_id: String,
        mode: SubmissionMode,
    },
}

impl EditorEvent {
    /// Namespaced event type for the envelope.
    pub fn namespaced_event_type(&self) -> &'static str {
        match self {
            EditorEvent::FormOpened { .. } => "form.opened",
            EditorEvent::FormClosed { .. } => "form.closed",
            EditorEvent::FieldChanged { .. } => "field.changed",
            EditorEvent::TagFlagged { .. } => "field.tag_flagged",
            EditorEvent::Notice { .. } => "notice.shown",
            EditorEvent::FocusEntityForm { .. } => "entity.focus",
            EditorEvent::SuggestionsReceived { .. } => "suggestions.received",
            EditorEvent::SuggestionsDiscarded { .. } => "suggestions.discarded",
            EditorEvent::SuggestionsFailed { .. } => "suggestions.failed",
            EditorEvent::SuggestionsApplied { .. } => "suggestions.applied",
            EditorEvent::TimerTick { .. } => "timer.tick",
            EditorEvent::TimerExpired => "timer.expired",
            EditorEvent::TurtleChecked { .. } => "turtle.checked",
            EditorEvent::DraftSaved { .. } => "draft.saved",
            EditorEvent::SubmissionBlocked { .. } => "submission.blocked",
            EditorEvent::Submitted { .. } => "submission.completed",
        }
    }
}

/// Broadcast-based event bus for editor notifications.
///
/// Cloning shares the same channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EventEnvelope>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.tx.receiver_count())
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(crate::defaults::EVENT_BUS_CAPACITY)
    }
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all subscribers.
    ///
    /// If there are no active subscribers, the event is silently dropped.
    pub fn emit(&self, event: EditorEvent, session_id: Option<Uuid>) {
        let envelope = EventEnvelope::new(event, session_id);
        tracing::trace!(
            event_type = %envelope.event_type,
            event_id = %envelope.event_id,
            subscriber_count = self.tx.receiver_count(),
            "EventBus emit"
        );
        let _ = self.tx.send(envelope);
    }

    /// Subscribe to receive enveloped events.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
