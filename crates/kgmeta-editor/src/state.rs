//! The form editor state container.
//!
//! [`FormEditorState`] owns everything one editing session touches: the
//! record, the invalid-tag index, one scratch object per nested-entity
//! collection, the current suggestion set, session history, and the
//! countdown. It is mutated only through the named operations below and
//! reports UI-relevant changes on its [`EventBus`].

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use kgmeta_core::defaults::TIME_EXPIRED_NOTICE;
use kgmeta_core::ids::{new_v7, submission_id};
use kgmeta_core::{
    add_single_value, add_tag, field_spec, remove_single_value, remove_tag, tag_error,
    Distribution, Draft, DraftRepository, EditError, EditSession, EditorEvent, EntityEditor,
    Error, EventBus, ExampleResource, FormRecord, FormType, InvalidTagIndex, LicenseChoice,
    LinkedResource, NestedEntity, Result, Role, RoleMode, SaveOutcome, SparqlEndpoint,
    SubmissionMetadata, SubmissionMode, SubmissionPayload, SubmissionSink, SubmissionType,
    SuggestionRequest, SuggestionResponse, SuggestionSet, TagOutcome,
};
use kgmeta_inference::{apply_all, build_request, map_candidate, merge_candidate, ApplyReport, MappedCandidate};

use crate::config::EditorConfig;
use crate::session::{Countdown, SessionTracker, TickOutcome};
use crate::validation::{validate_record, validate_turtle_document, ValidationReport};

/// Wire name used for raw-text edits in field-change events.
pub const TURTLE_CONTENT_FIELD: &str = "turtleContent";

/// Lifecycle of one editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorStatus {
    Editing,
    /// Closed without submitting; may be reopened.
    Closed,
    Submitted,
}

impl EditorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditorStatus::Editing => "editing",
            EditorStatus::Closed => "closed",
            EditorStatus::Submitted => "submitted",
        }
    }
}

/// Identifies one suggestion request. Responses carrying an outdated token
/// are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken {
    pub session: Uuid,
    pub generation: u64,
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.session, self.generation)
    }
}

/// What happened to a suggestion response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptOutcome {
    Accepted { fields: Vec<String> },
    /// The token was stale: form closed, reopened, or superseded.
    Discarded,
    Failed(String),
}

/// Result of applying a single suggestion candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionApplied {
    /// Written into the record.
    Merged { changed: bool },
    /// Loaded into the collection's scratch object for review.
    LoadedForReview { collection: &'static str },
    /// The candidate could not be decoded.
    Unusable,
}

/// Result of a submission attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Submitted(Box<SubmissionPayload>),
    /// Normal submission with validation failures.
    Blocked(ValidationReport),
}

impl SubmissionOutcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self, SubmissionOutcome::Blocked(_))
    }

    pub fn payload(&self) -> Option<&SubmissionPayload> {
        match self {
            SubmissionOutcome::Submitted(payload) => Some(payload),
            SubmissionOutcome::Blocked(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Notice {
    message: String,
    expires_at: DateTime<Utc>,
}

/// Editing state for a single record.
#[derive(Debug)]
pub struct FormEditorState {
    config: EditorConfig,
    events: EventBus,
    status: EditorStatus,
    session_id: Uuid,
    form_type: FormType,
    draft_id: Uuid,
    draft_saved: bool,

    record: FormRecord,
    invalid_tags: InvalidTagIndex,
    custom_license_input: Option<String>,
    turtle_content: String,
    turtle_problems: Vec<String>,
    bypass_validation: bool,
    force_submit: bool,

    role_mode: RoleMode,
    roles: EntityEditor<Role>,
    distributions: EntityEditor<Distribution>,
    sparql_endpoints: EntityEditor<SparqlEndpoint>,
    example_resources: EntityEditor<ExampleResource>,
    linked_resources: EntityEditor<LinkedResource>,

    suggestions: SuggestionSet,
    generation: u64,
    pending_request: Option<RequestToken>,

    sessions: SessionTracker,
    countdown: Countdown,
    notice: Option<Notice>,
}

macro_rules! entity_scratch_ops {
    ($ty:ty, $editor:ident, $view:ident, $scratch:ident, $save:ident, $edit:ident, $remove:ident, $cancel:ident) => {
        pub fn $view(&self) -> &EntityEditor<$ty> {
            &self.$editor
        }

        pub fn $scratch(&mut self) -> &mut $ty {
            &mut self.$editor.current
        }

        /// Append the scratch entity, or replace the one being edited.
        pub fn $save(&mut self) -> std::result::Result<SaveOutcome, EditError> {
            let outcome = self
                .$editor
                .add_or_save(<$ty>::collection_mut(&mut self.record), self.bypass_validation)?;
            self.field_changed(<$ty>::COLLECTION);
            Ok(outcome)
        }

        pub fn $edit(&mut self, index: usize) -> std::result::Result<(), EditError> {
            self.$editor.begin_edit(<$ty>::collection(&self.record), index)
        }

        pub fn $remove(&mut self, index: usize) -> std::result::Result<$ty, EditError> {
            let removed = self
                .$editor
                .remove(<$ty>::collection_mut(&mut self.record), index)?;
            self.field_changed(<$ty>::COLLECTION);
            Ok(removed)
        }

        pub fn $cancel(&mut self) {
            self.$editor.cancel();
        }
    };
}

impl FormEditorState {
    fn blank(config: EditorConfig, form_type: FormType, sessions: SessionTracker) -> Self {
        let countdown = Countdown::new(config.session_duration_secs);
        Self {
            config,
            events: EventBus::default(),
            status: EditorStatus::Editing,
            session_id: new_v7(),
            form_type,
            draft_id: new_v7(),
            draft_saved: false,
            record: FormRecord::default(),
            invalid_tags: InvalidTagIndex::new(),
            custom_license_input: None,
            turtle_content: String::new(),
            turtle_problems: Vec::new(),
            bypass_validation: false,
            force_submit: false,
            role_mode: RoleMode::default(),
            roles: EntityEditor::default(),
            distributions: EntityEditor::default(),
            sparql_endpoints: EntityEditor::default(),
            example_resources: EntityEditor::default(),
            linked_resources: EntityEditor::default(),
            suggestions: SuggestionSet::default(),
            generation: 0,
            pending_request: None,
            sessions,
            countdown,
            notice: None,
        }
    }

    /// Open an empty plain-field form at `now`.
    pub fn open(config: EditorConfig, now: DateTime<Utc>) -> Self {
        Self::open_with_type(config, FormType::Normal, now)
    }

    pub fn open_with_type(config: EditorConfig, form_type: FormType, now: DateTime<Utc>) -> Self {
        let mut state = Self::blank(config, form_type, SessionTracker::default());
        state.start_session(now);
        state
    }

    /// Reopen a saved draft, continuing its session history.
    pub fn from_draft(draft: Draft, config: EditorConfig, now: DateTime<Utc>) -> Self {
        let mut state = Self::blank(
            config,
            draft.form_type,
            SessionTracker::with_history(draft.edit_sessions),
        );
        state.draft_id = draft.draft_id;
        state.draft_saved = true;
        state.record = draft.record;
        state.custom_license_input = draft.custom_license_input;
        state.turtle_content = draft.turtle_content.unwrap_or_default();
        state.suggestions = SuggestionSet::from_raw(draft.ai_suggestions);
        state.start_session(now);
        state
    }

    /// Load a draft by id from `repo` and open it.
    pub async fn load_draft(
        repo: &dyn DraftRepository,
        draft_id: Uuid,
        config: EditorConfig,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let draft = repo.load(draft_id).await?;
        Ok(Self::from_draft(draft, config, now))
    }

    /// Use `events` instead of the editor's own bus.
    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    fn start_session(&mut self, now: DateTime<Utc>) {
        self.sessions.start(now);
        info!(
            subsystem = "editor",
            session_id = %self.session_id,
            draft_id = %self.draft_id,
            form_type = self.form_type.as_str(),
            prior_sessions = self.sessions.history().len(),
            "Form opened"
        );
        let draft_id = self.draft_saved.then_some(self.draft_id);
        self.emit(EditorEvent::FormOpened { draft_id });
    }

    /// End the session without submitting. Pending suggestion responses
    /// will be discarded.
    pub fn close(&mut self, now: DateTime<Utc>) -> Option<EditSession> {
        if self.status != EditorStatus::Editing {
            return None;
        }
        let session = self.sessions.end(now)?;
        self.status = EditorStatus::Closed;
        self.countdown.stop();
        self.pending_request = None;
        info!(
            subsystem = "editor",
            session_id = %self.session_id,
            session_seconds = session.duration_seconds,
            "Form closed"
        );
        self.emit(EditorEvent::FormClosed {
            session_seconds: session.duration_seconds,
        });
        Some(session)
    }

    /// Start a new session on a closed form. The countdown restarts.
    pub fn reopen(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.status != EditorStatus::Closed {
            return Err(Error::InvalidInput(format!(
                "Cannot reopen a form that is {}",
                self.status.as_str()
            )));
        }
        self.status = EditorStatus::Editing;
        self.session_id = new_v7();
        self.countdown = Countdown::new(self.config.session_duration_secs);
        self.start_session(now);
        Ok(())
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn status(&self) -> EditorStatus {
        self.status
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn form_type(&self) -> FormType {
        self.form_type
    }

    pub fn draft_id(&self) -> Uuid {
        self.draft_id
    }

    pub fn record(&self) -> &FormRecord {
        &self.record
    }

    pub fn suggestions(&self) -> &SuggestionSet {
        &self.suggestions
    }

    pub fn custom_license_input(&self) -> Option<&str> {
        self.custom_license_input.as_deref()
    }

    pub fn turtle_content(&self) -> &str {
        &self.turtle_content
    }

    pub fn turtle_problems(&self) -> &[String] {
        &self.turtle_problems
    }

    pub fn bypass_validation(&self) -> bool {
        self.bypass_validation
    }

    pub fn force_submit(&self) -> bool {
        self.force_submit
    }

    pub fn role_mode(&self) -> RoleMode {
        self.role_mode
    }

    pub fn pending_request(&self) -> Option<RequestToken> {
        self.pending_request
    }

    /// Notice text, if one is still within its display window.
    pub fn active_notice(&self, now: DateTime<Utc>) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|n| now < n.expires_at)
            .map(|n| n.message.as_str())
    }

    fn emit(&self, event: EditorEvent) {
        self.events.emit(event, Some(self.session_id));
    }

    fn field_changed(&self, field: &str) {
        self.emit(EditorEvent::FieldChanged {
            field: field.to_string(),
        });
    }

    fn show_notice(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        let message = message.into();
        let expires_at = now + Duration::seconds(self.config.notice_display_secs);
        self.emit(EditorEvent::Notice {
            message: message.clone(),
            expires_at,
        });
        self.notice = Some(Notice { message, expires_at });
    }

    // =========================================================================
    // FIELD EDITING
    // =========================================================================

    /// Overwrite a single-value field with typed text. Format-checked fields
    /// reject invalid values; a blank value clears the field.
    pub fn set_scalar(&mut self, field: &str, value: &str) -> std::result::Result<(), EditError> {
        let spec = field_spec(field).ok_or_else(|| EditError::UnknownField(field.to_string()))?;
        if !spec.is_single_value() {
            return Err(EditError::NotSingleValue { label: spec.label });
        }
        if let Some(message) = spec.validate_value(value) {
            return Err(EditError::InvalidFormat {
                label: spec.label.to_string(),
                message,
            });
        }
        let slot = self
            .record
            .scalar_mut(field)
            .ok_or_else(|| EditError::UnknownField(field.to_string()))?;
        *slot = value.to_string();
        if field == "license" {
            self.custom_license_input = None;
        }
        self.field_changed(field);
        Ok(())
    }

    pub fn add_tag(&mut self, field: &str, value: &str) -> std::result::Result<TagOutcome, EditError> {
        let outcome = add_tag(&mut self.record, &mut self.invalid_tags, field, value)?;
        match &outcome {
            TagOutcome::Ignored => {}
            TagOutcome::Added => self.field_changed(field),
            TagOutcome::Flagged(message) => {
                self.field_changed(field);
                self.emit(EditorEvent::TagFlagged {
                    field: field.to_string(),
                    value: value.trim().to_string(),
                    message: message.clone(),
                });
            }
        }
        Ok(outcome)
    }

    pub fn remove_tag(&mut self, field: &str, position: usize) -> std::result::Result<String, EditError> {
        let removed = remove_tag(&mut self.record, &mut self.invalid_tags, field, position)?;
        self.field_changed(field);
        Ok(removed)
    }

    /// Current error for a stored tag, revalidating values not in the index.
    pub fn tag_error(&self, field: &str, value: &str) -> Option<String> {
        tag_error(&self.invalid_tags, field, value)
    }

    /// Set an empty single-value field. A second value shows the
    /// "only one value" notice.
    pub fn add_single_value(
        &mut self,
        field: &str,
        value: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<bool, EditError> {
        match add_single_value(&mut self.record, field, value) {
            Ok(added) => {
                if added {
                    self.field_changed(field);
                }
                Ok(added)
            }
            Err(err @ EditError::OnlyOneValue { .. }) => {
                self.show_notice(err.to_string(), now);
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    pub fn remove_single_value(&mut self, field: &str) -> std::result::Result<(), EditError> {
        remove_single_value(&mut self.record, field)?;
        if field == "license" {
            self.custom_license_input = None;
        }
        self.field_changed(field);
        Ok(())
    }

    /// Store a license choice. Custom text is kept as the custom input too.
    pub fn set_license(&mut self, choice: LicenseChoice) {
        self.record.license = choice.stored_value().to_string();
        self.custom_license_input = match choice {
            LicenseChoice::Known(_) => None,
            LicenseChoice::Custom(text) => Some(text),
        };
        self.field_changed("license");
    }

    pub fn set_void_dataset(&mut self, enabled: bool) {
        self.record.dataset_types.set_void(enabled);
        self.field_changed("type");
    }

    pub fn set_bypass_validation(&mut self, enabled: bool) {
        self.bypass_validation = enabled;
    }

    /// When set, every submission is forced.
    pub fn set_force_submit(&mut self, enabled: bool) {
        self.force_submit = enabled;
    }

    // =========================================================================
    // NESTED ENTITIES
    // =========================================================================

    pub fn role_editor(&self) -> &EntityEditor<Role> {
        &self.roles
    }

    pub fn role_scratch_mut(&mut self) -> &mut Role {
        &mut self.roles.current
    }

    /// Switch how the scratch role identifies its agent, clearing the
    /// fields of the other mode.
    pub fn set_role_mode(&mut self, mode: RoleMode) {
        self.role_mode = mode;
        Self::clear_other_mode(&mut self.roles.current, mode);
    }

    fn clear_other_mode(role: &mut Role, mode: RoleMode) {
        match mode {
            RoleMode::Iri => {
                role.given_name = None;
                role.email = None;
            }
            RoleMode::NameMbox => role.agent = None,
        }
    }

    pub fn save_role(&mut self) -> std::result::Result<SaveOutcome, EditError> {
        Self::clear_other_mode(&mut self.roles.current, self.role_mode);
        let outcome = self
            .roles
            .add_or_save(&mut self.record.roles, self.bypass_validation)?;
        self.role_mode = RoleMode::default();
        self.field_changed(Role::COLLECTION);
        Ok(outcome)
    }

    pub fn edit_role(&mut self, index: usize) -> std::result::Result<(), EditError> {
        self.roles.begin_edit(&self.record.roles, index)?;
        self.role_mode = self.roles.current.mode();
        Ok(())
    }

    pub fn remove_role(&mut self, index: usize) -> std::result::Result<Role, EditError> {
        let removed = self.roles.remove(&mut self.record.roles, index)?;
        self.field_changed(Role::COLLECTION);
        Ok(removed)
    }

    pub fn cancel_role_edit(&mut self) {
        self.roles.cancel();
        self.role_mode = RoleMode::default();
    }

    entity_scratch_ops!(
        Distribution,
        distributions,
        distribution_editor,
        distribution_scratch_mut,
        save_distribution,
        edit_distribution,
        remove_distribution,
        cancel_distribution_edit
    );

    entity_scratch_ops!(
        SparqlEndpoint,
        sparql_endpoints,
        sparql_endpoint_editor,
        sparql_endpoint_scratch_mut,
        save_sparql_endpoint,
        edit_sparql_endpoint,
        remove_sparql_endpoint,
        cancel_sparql_endpoint_edit
    );

    entity_scratch_ops!(
        ExampleResource,
        example_resources,
        example_resource_editor,
        example_resource_scratch_mut,
        save_example_resource,
        edit_example_resource,
        remove_example_resource,
        cancel_example_resource_edit
    );

    entity_scratch_ops!(
        LinkedResource,
        linked_resources,
        linked_resource_editor,
        linked_resource_scratch_mut,
        save_linked_resource,
        edit_linked_resource,
        remove_linked_resource,
        cancel_linked_resource_edit
    );

    // =========================================================================
    // RAW TEXT (TURTLE) MODE
    // =========================================================================

    pub fn set_turtle_content(&mut self, content: impl Into<String>) {
        self.turtle_content = content.into();
        self.field_changed(TURTLE_CONTENT_FIELD);
    }

    /// Run the structural Turtle check on the current content.
    pub fn check_turtle_now(&mut self) -> &[String] {
        self.turtle_problems = kgmeta_core::check_turtle(&self.turtle_content);
        debug!(problems = self.turtle_problems.len(), "Turtle content checked");
        self.emit(EditorEvent::TurtleChecked {
            problems: self.turtle_problems.clone(),
        });
        &self.turtle_problems
    }

    // =========================================================================
    // SUGGESTIONS
    // =========================================================================

    /// Request for every empty suggestible field plus the entity collections.
    pub fn build_suggestion_request(&self, narrative_text: &str) -> SuggestionRequest {
        build_request(&self.record, narrative_text)
    }

    /// Issue a token for a new request, superseding any in-flight one.
    pub fn begin_suggestion_request(&mut self) -> Result<RequestToken> {
        if self.status != EditorStatus::Editing {
            return Err(Error::InvalidInput(format!(
                "Cannot request suggestions for a form that is {}",
                self.status.as_str()
            )));
        }
        self.generation += 1;
        let token = RequestToken {
            session: self.session_id,
            generation: self.generation,
        };
        if let Some(previous) = self.pending_request.replace(token) {
            debug!(request_token = %previous, "Superseding in-flight suggestion request");
        }
        Ok(token)
    }

    /// Whether a response for `token` may still be applied.
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.status == EditorStatus::Editing
            && token.session == self.session_id
            && self.pending_request == Some(token)
    }

    fn discard(&self, token: RequestToken) -> AcceptOutcome {
        warn!(
            request_token = %token,
            status = self.status.as_str(),
            "Discarding stale suggestion response"
        );
        self.emit(EditorEvent::SuggestionsDiscarded {
            generation: token.generation,
        });
        AcceptOutcome::Discarded
    }

    /// Replace the suggestion set with `response` if `token` is current.
    pub fn accept_suggestions(&mut self, token: RequestToken, response: SuggestionResponse) -> AcceptOutcome {
        if !self.is_current(token) {
            return self.discard(token);
        }
        self.pending_request = None;
        let fields: Vec<String> = response.field_suggestions.keys().cloned().collect();
        self.suggestions = SuggestionSet::from_response(response);
        info!(
            subsystem = "editor",
            request_token = %token,
            field_count = fields.len(),
            "Suggestions received"
        );
        self.emit(EditorEvent::SuggestionsReceived {
            fields: fields.clone(),
        });
        AcceptOutcome::Accepted { fields }
    }

    /// Record a failed request. The suggestion set is left empty.
    pub fn fail_suggestions(&mut self, token: RequestToken, error: &Error) -> AcceptOutcome {
        if !self.is_current(token) {
            return self.discard(token);
        }
        self.pending_request = None;
        self.suggestions.clear();
        warn!(request_token = %token, error = %error, "Suggestion request failed");
        self.emit(EditorEvent::SuggestionsFailed {
            error: error.to_string(),
        });
        AcceptOutcome::Failed(error.to_string())
    }

    fn note_license(&mut self, choice: &Option<LicenseChoice>) {
        match choice {
            Some(LicenseChoice::Custom(text)) => self.custom_license_input = Some(text.clone()),
            Some(LicenseChoice::Known(_)) => self.custom_license_input = None,
            None => {}
        }
    }

    /// "Add all": apply every candidate for `field` by its strategy.
    pub fn apply_all_suggestions(&mut self, field: &str) -> Result<ApplyReport> {
        let suggestions = self
            .suggestions
            .raw(field)
            .cloned()
            .ok_or_else(|| Error::Suggestion(format!("No suggestions for {}", field)))?;
        let report = apply_all(&mut self.record, &mut self.invalid_tags, field, &suggestions)?;
        self.note_license(&report.license);
        if report.applied > 0 {
            self.field_changed(field);
        }
        self.emit(EditorEvent::SuggestionsApplied {
            field: field.to_string(),
            applied: report.applied,
        });
        Ok(report)
    }

    /// "Add one": nested-entity candidates are loaded into the scratch
    /// object for review, everything else is merged directly.
    pub fn apply_suggestion(&mut self, field: &str, index: usize) -> Result<SuggestionApplied> {
        let suggestion = self
            .suggestions
            .raw(field)
            .and_then(|s| s.suggestions.get(index))
            .cloned()
            .ok_or_else(|| Error::Suggestion(format!("No suggestion {} for {}", index, field)))?;

        let Some(candidate) = map_candidate(field, &suggestion)? else {
            debug!(field, index, "Suggestion candidate unusable");
            return Ok(SuggestionApplied::Unusable);
        };

        let collection = match candidate {
            MappedCandidate::Role(role) => {
                self.role_mode = role.mode();
                self.roles.load(role);
                Role::COLLECTION
            }
            MappedCandidate::Distribution(d) => {
                self.distributions.load(d);
                Distribution::COLLECTION
            }
            MappedCandidate::SparqlEndpoint(e) => {
                self.sparql_endpoints.load(e);
                SparqlEndpoint::COLLECTION
            }
            MappedCandidate::ExampleResource(e) => {
                self.example_resources.load(e);
                ExampleResource::COLLECTION
            }
            MappedCandidate::LinkedResource(l) => {
                self.linked_resources.load(l);
                LinkedResource::COLLECTION
            }
            other => {
                if let MappedCandidate::License(choice) = &other {
                    self.note_license(&Some(choice.clone()));
                }
                let changed = merge_candidate(&mut self.record, &mut self.invalid_tags, other)?;
                if changed {
                    self.field_changed(field);
                }
                return Ok(SuggestionApplied::Merged { changed });
            }
        };

        self.emit(EditorEvent::FocusEntityForm {
            collection: collection.to_string(),
        });
        Ok(SuggestionApplied::LoadedForReview { collection })
    }

    /// Apply every field in the suggestion set. Keys that are not form
    /// fields (such as the response-level `error`) and fields that do not
    /// take suggestions are skipped. A field that fails to apply is logged
    /// and left out of the result; the remaining fields are still applied.
    pub fn apply_every_suggestion(&mut self) -> Result<BTreeMap<String, ApplyReport>> {
        let fields: Vec<String> = self.suggestions.fields().map(str::to_string).collect();
        let mut reports = BTreeMap::new();
        for field in fields {
            match field_spec(&field) {
                None => {
                    debug!(field = %field, "Skipping suggestion key that is not a form field");
                    continue;
                }
                Some(spec) if !spec.accepts_suggestions() => {
                    warn!(field = %field, "Skipping suggestions for a field that does not take them");
                    continue;
                }
                Some(_) => {}
            }
            match self.apply_all_suggestions(&field) {
                Ok(report) => {
                    reports.insert(field, report);
                }
                Err(e) => warn!(field = %field, error = %e, "Failed to apply suggestions for field"),
            }
        }
        Ok(reports)
    }

    // =========================================================================
    // COUNTDOWN AND SESSIONS
    // =========================================================================

    /// Advance the countdown by one second.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        if self.status != EditorStatus::Editing {
            return TickOutcome::Inactive;
        }
        let outcome = self.countdown.tick();
        match outcome {
            TickOutcome::Running { remaining_secs } => {
                self.emit(EditorEvent::TimerTick { remaining_secs });
            }
            TickOutcome::Expired => {
                info!(
                    subsystem = "editor",
                    session_id = %self.session_id,
                    remaining_secs = 0_u64,
                    "Session countdown expired"
                );
                self.show_notice(TIME_EXPIRED_NOTICE, now);
                self.emit(EditorEvent::TimerExpired);
            }
            TickOutcome::Inactive => {}
        }
        outcome
    }

    pub fn time_remaining(&self) -> u64 {
        self.countdown.remaining()
    }

    /// Seconds across every session, the open one measured against `now`.
    pub fn total_time_spent_seconds(&self, now: DateTime<Utc>) -> i64 {
        self.sessions.total_seconds(now)
    }

    pub fn edit_sessions(&self, now: DateTime<Utc>) -> Vec<EditSession> {
        self.sessions.sessions_at(now)
    }

    // =========================================================================
    // DRAFTS
    // =========================================================================

    /// Snapshot the editor as a draft. Turtle drafts carry no record fields.
    pub fn to_draft(&self, now: DateTime<Utc>) -> Draft {
        let is_turtle = self.form_type == FormType::Turtle;
        let record = if is_turtle {
            FormRecord::default()
        } else {
            self.record.clone()
        };
        let turtle_content = (is_turtle || !self.turtle_content.is_empty())
            .then(|| self.turtle_content.clone());
        Draft {
            id: new_v7(),
            name: Draft::display_name(&record),
            date: now,
            form_type: self.form_type,
            record,
            draft_id: self.draft_id,
            custom_license_input: self.custom_license_input.clone(),
            ai_suggestions: self.suggestions.raw_map().clone(),
            edit_sessions: self.sessions.sessions_at(now),
            total_time_spent_seconds: self.sessions.total_seconds(now),
            turtle_content,
        }
    }

    #[instrument(skip(self, repo), fields(subsystem = "editor", draft_id = %self.draft_id))]
    pub async fn save_draft(&mut self, repo: &dyn DraftRepository, now: DateTime<Utc>) -> Result<Draft> {
        let draft = self.to_draft(now);
        repo.save(draft.clone()).await?;
        self.draft_saved = true;
        info!(
            name = %draft.name,
            total_time_spent_seconds = draft.total_time_spent_seconds,
            "Draft saved"
        );
        self.emit(EditorEvent::DraftSaved {
            draft_id: self.draft_id,
        });
        Ok(draft)
    }

    // =========================================================================
    // SUBMISSION
    // =========================================================================

    pub fn validate_for_submission(&self) -> ValidationReport {
        let errors = match self.form_type {
            FormType::Turtle => validate_turtle_document(&self.turtle_content),
            FormType::Normal | FormType::Llm => validate_record(&self.record),
        };
        ValidationReport::new(errors)
    }

    /// Validate and submit. The force toggle turns any mode into forced.
    pub fn submit(&mut self, mode: SubmissionMode, now: DateTime<Utc>) -> Result<SubmissionOutcome> {
        self.submit_inner(mode, false, now)
    }

    /// Forced submission after the countdown expired.
    pub fn submit_on_expiry(&mut self, now: DateTime<Utc>) -> Result<SubmissionOutcome> {
        self.submit_inner(SubmissionMode::Forced, true, now)
    }

    fn submit_inner(
        &mut self,
        mode: SubmissionMode,
        timer_expired: bool,
        now: DateTime<Utc>,
    ) -> Result<SubmissionOutcome> {
        if self.status != EditorStatus::Editing {
            return Err(Error::InvalidInput(format!(
                "Cannot submit a form that is {}",
                self.status.as_str()
            )));
        }
        let mode = if self.force_submit {
            SubmissionMode::Forced
        } else {
            mode
        };

        let report = self.validate_for_submission();
        if mode == SubmissionMode::Normal && !report.is_valid() {
            info!(
                subsystem = "editor",
                session_id = %self.session_id,
                missing = report.errors.missing_fields.len(),
                invalid_dates = report.errors.invalid_dates.len(),
                "Submission blocked"
            );
            self.emit(EditorEvent::SubmissionBlocked {
                missing_fields: report.errors.missing_fields.clone(),
                message: report.message.clone(),
            });
            return Ok(SubmissionOutcome::Blocked(report));
        }

        self.sessions.end(now);
        let edit_sessions = self.sessions.history().to_vec();
        let is_turtle = self.form_type == FormType::Turtle;
        let payload = SubmissionPayload {
            form_data: if is_turtle {
                FormRecord::default()
            } else {
                self.record.clone()
            },
            turtle_content: is_turtle.then(|| self.turtle_content.clone()),
            validation_errors: (!report.is_valid()).then_some(report.errors),
            ai_suggestions: self.suggestions.raw_map().clone(),
            metadata: SubmissionMetadata {
                submission_type: SubmissionType::from(self.form_type),
                submission_mode: mode,
                submitted_at: now,
                started_at: self.sessions.first_started_at().unwrap_or(now),
                total_time_spent_seconds: kgmeta_core::total_duration_seconds(&edit_sessions),
                session_count: edit_sessions.len(),
                edit_sessions,
                draft_id: self.draft_saved.then_some(self.draft_id),
                submission_id: submission_id(now),
                timer_expired,
            },
        };

        self.status = EditorStatus::Submitted;
        self.countdown.stop();
        self.pending_request = None;
        info!(
            subsystem = "editor",
            submission_id = %payload.metadata.submission_id,
            submission_mode = mode.as_str(),
            timer_expired,
            "Form submitted"
        );
        self.emit(EditorEvent::Submitted {
            submission_id: payload.metadata.submission_id.clone(),
            mode,
        });
        Ok(SubmissionOutcome::Submitted(Box::new(payload)))
    }

    /// Submit and hand the payload to `sink`.
    pub async fn submit_to(
        &mut self,
        sink: &dyn SubmissionSink,
        mode: SubmissionMode,
        now: DateTime<Utc>,
    ) -> Result<SubmissionOutcome> {
        let outcome = self.submit(mode, now)?;
        if let SubmissionOutcome::Submitted(payload) = &outcome {
            sink.submit(payload).await?;
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use kgmeta_core::{FieldSuggestions, RoleType, Suggestion};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn editor() -> FormEditorState {
        FormEditorState::open(EditorConfig::default(), at(0))
    }

    #[test]
    fn test_second_single_value_shows_notice() {
        let mut state = editor();
        assert!(state.add_single_value("version", "1.0", at(1)).unwrap());
        let err = state.add_single_value("version", "2.0", at(2)).unwrap_err();
        assert!(matches!(err, EditError::OnlyOneValue { label: "Version" }));
        assert_eq!(state.record().version, "1.0");
        assert!(state.active_notice(at(3)).is_some());
        assert!(state.active_notice(at(5)).is_none());
    }

    #[test]
    fn test_flagged_tag_kept_and_reported() {
        let mut state = editor();
        let outcome = state.add_tag("homepageURL", "example.com").unwrap();
        assert!(matches!(outcome, TagOutcome::Flagged(_)));
        assert_eq!(state.record().homepage_url, vec!["example.com"]);
        assert!(state.tag_error("homepageURL", "example.com").is_some());

        state.remove_tag("homepageURL", 0).unwrap();
        assert!(state.record().homepage_url.is_empty());
        assert!(state.tag_error("homepageURL", "https://example.com").is_none());
    }

    #[test]
    fn test_set_scalar_rejects_bad_date() {
        let mut state = editor();
        assert!(state.set_scalar("createdDate", "2023/02/29").is_err());
        state.set_scalar("createdDate", "2024/02/29").unwrap();
        assert_eq!(state.record().created_date, "2024/02/29");
        assert!(matches!(
            state.set_scalar("keywords", "x"),
            Err(EditError::NotSingleValue { .. })
        ));
    }

    #[test]
    fn test_role_mode_switch_clears_other_fields() {
        let mut state = editor();
        state.set_role_mode(RoleMode::NameMbox);
        state.role_scratch_mut().given_name = Some("Ada".into());
        state.role_scratch_mut().agent = Some("https://ada.example.org".into());
        state.save_role().unwrap();

        let saved = &state.record().roles[0];
        assert_eq!(saved.agent, None);
        assert_eq!(saved.given_name.as_deref(), Some("Ada"));
        assert_eq!(state.role_mode(), RoleMode::Iri);

        state.edit_role(0).unwrap();
        assert_eq!(state.role_mode(), RoleMode::NameMbox);
        state.set_role_mode(RoleMode::Iri);
        assert_eq!(state.role_editor().current.given_name, None);
    }

    #[test]
    fn test_bypass_allows_partial_distribution() {
        let mut state = editor();
        state.distribution_scratch_mut().title = "Partial".into();
        assert!(state.save_distribution().is_err());
        state.set_bypass_validation(true);
        assert_eq!(state.save_distribution().unwrap(), SaveOutcome::Appended(0));
        assert_eq!(state.record().distributions[0].title, "Partial");
        assert!(state.remove_distribution(3).is_err());
    }

    #[test]
    fn test_stale_token_discarded_after_close() {
        let mut state = editor();
        let token = state.begin_suggestion_request().unwrap();
        state.close(at(10));
        let mut response = SuggestionResponse::default();
        response
            .field_suggestions
            .insert("title".into(), FieldSuggestions::from_values(["QuoteKG"]));
        assert_eq!(state.accept_suggestions(token, response), AcceptOutcome::Discarded);
        assert!(state.suggestions().is_empty());
        assert!(state.begin_suggestion_request().is_err());
    }

    #[test]
    fn test_newer_request_supersedes_older() {
        let mut state = editor();
        let first = state.begin_suggestion_request().unwrap();
        let second = state.begin_suggestion_request().unwrap();
        assert!(!state.is_current(first));
        assert_eq!(
            state.accept_suggestions(first, SuggestionResponse::default()),
            AcceptOutcome::Discarded
        );
        assert!(matches!(
            state.accept_suggestions(second, SuggestionResponse::default()),
            AcceptOutcome::Accepted { .. }
        ));
        assert_eq!(state.pending_request(), None);
    }

    #[test]
    fn test_apply_role_suggestion_loads_scratch() {
        let mut state = editor();
        let token = state.begin_suggestion_request().unwrap();
        let mut response = SuggestionResponse::default();
        response.field_suggestions.insert(
            "roles".into(),
            FieldSuggestions {
                suggestions: vec![Suggestion::new("publisher").with_role_data(
                    kgmeta_core::RoleSuggestionData {
                        role_type: "publisher".into(),
                        mode: kgmeta_core::RoleDataMode::NameMbox,
                        iri: None,
                        name: Some("KG Lab".into()),
                        email: Some("kg@example.org".into()),
                    },
                )],
                no_suggestions_reason: None,
            },
        );
        state.accept_suggestions(token, response);

        let mut events = state.events().subscribe();
        let applied = state.apply_suggestion("roles", 0).unwrap();
        assert_eq!(applied, SuggestionApplied::LoadedForReview { collection: "roles" });
        assert!(state.record().roles.is_empty());
        assert_eq!(state.role_editor().current.role_type, RoleType::Publisher);
        assert_eq!(state.role_mode(), RoleMode::NameMbox);
        assert_eq!(
            events.try_recv().unwrap().payload,
            EditorEvent::FocusEntityForm {
                collection: "roles".into()
            }
        );
    }

    fn editor_with_suggestions(fields: Vec<(&str, FieldSuggestions)>) -> FormEditorState {
        let mut state = editor();
        let token = state.begin_suggestion_request().unwrap();
        let mut response = SuggestionResponse::default();
        for (field, suggestions) in fields {
            response.field_suggestions.insert(field.into(), suggestions);
        }
        state.accept_suggestions(token, response);
        state
    }

    #[test]
    fn test_apply_every_suggestion_skips_type_flags() {
        let mut state = editor_with_suggestions(vec![
            ("keywords", FieldSuggestions::from_values(["quotes"])),
            ("type", FieldSuggestions::from_values(["void:Dataset"])),
            ("version", FieldSuggestions::from_values(["1.0"])),
        ]);

        let reports = state.apply_every_suggestion().unwrap();
        assert_eq!(state.record().keywords, vec!["quotes"]);
        assert_eq!(state.record().version, "1.0");
        assert_eq!(state.record().dataset_types, kgmeta_core::DatasetTypes::default());
        assert!(!reports.contains_key("type"));
        assert_eq!(reports["version"].applied, 1);
    }

    #[test]
    fn test_apply_distribution_suggestion_loads_scratch() {
        let mut state = editor_with_suggestions(vec![(
            "distributions",
            FieldSuggestions::from_values([
                r#"{"title":"Dump","mediaType":"text/turtle","downloadURL":"https://kg.example.org/dump.ttl"}"#,
                "not json",
            ]),
        )]);

        let mut events = state.events().subscribe();
        let applied = state.apply_suggestion("distributions", 0).unwrap();
        assert_eq!(
            applied,
            SuggestionApplied::LoadedForReview {
                collection: "distributions"
            }
        );
        assert!(state.record().distributions.is_empty());
        let scratch = &state.distribution_editor().current;
        assert_eq!(scratch.title, "Dump");
        assert_eq!(scratch.media_type, "text/turtle");
        assert_eq!(scratch.download_url, "https://kg.example.org/dump.ttl");
        assert_eq!(scratch.access_url, "");
        assert_eq!(
            events.try_recv().unwrap().payload,
            EditorEvent::FocusEntityForm {
                collection: "distributions".into()
            }
        );

        let applied = state.apply_suggestion("distributions", 1).unwrap();
        assert_eq!(applied, SuggestionApplied::Unusable);
        assert!(state.record().distributions.is_empty());
        assert_eq!(state.distribution_editor().current.title, "Dump");
    }

    #[test]
    fn test_apply_missing_suggestion_is_error() {
        let mut state = editor_with_suggestions(vec![("title", FieldSuggestions::from_values(["QuoteKG"]))]);
        assert!(matches!(state.apply_suggestion("title", 3), Err(Error::Suggestion(_))));
        assert!(matches!(state.apply_all_suggestions("acronym"), Err(Error::Suggestion(_))));
    }

    #[test]
    fn test_license_suggestion_custom_text_kept() {
        let mut state = editor();
        let token = state.begin_suggestion_request().unwrap();
        let mut response = SuggestionResponse::default();
        response.field_suggestions.insert(
            "license".into(),
            FieldSuggestions::from_values(["Internal use only"]),
        );
        state.accept_suggestions(token, response);
        let report = state.apply_all_suggestions("license").unwrap();
        assert_eq!(report.applied, 1);
        assert_eq!(state.record().license, "Internal use only");
        assert_eq!(state.custom_license_input(), Some("Internal use only"));
    }

    #[test]
    fn test_apply_every_skips_error_key() {
        let mut state = editor();
        let token = state.begin_suggestion_request().unwrap();
        let mut response = SuggestionResponse::default();
        response
            .field_suggestions
            .insert("keywords".into(), FieldSuggestions::from_values(["quotes", "quotes", "kg"]));
        response
            .field_suggestions
            .insert("error".into(), FieldSuggestions::none("AI response was not valid JSON."));
        state.accept_suggestions(token, response);

        let reports = state.apply_every_suggestion().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports["keywords"].applied, 2);
        assert_eq!(state.record().keywords, vec!["quotes", "kg"]);
    }

    #[test]
    fn test_tick_expires_and_shows_notice() {
        let config = EditorConfig::default().with_session_duration(2);
        let mut state = FormEditorState::open(config, at(0));
        assert_eq!(state.tick(at(1)), TickOutcome::Running { remaining_secs: 1 });
        assert_eq!(state.tick(at(2)), TickOutcome::Expired);
        assert_eq!(state.active_notice(at(3)), Some(TIME_EXPIRED_NOTICE));
        assert_eq!(state.tick(at(3)), TickOutcome::Inactive);
        assert_eq!(state.time_remaining(), 0);
    }

    #[test]
    fn test_close_and_reopen_accumulates_sessions() {
        let mut state = editor();
        state.close(at(100)).unwrap();
        assert_eq!(state.tick(at(101)), TickOutcome::Inactive);
        state.reopen(at(200)).unwrap();
        assert_eq!(state.total_time_spent_seconds(at(230)), 130);
        assert_eq!(state.edit_sessions(at(230)).len(), 2);
        assert!(state.reopen(at(240)).is_err());
    }

    #[test]
    fn test_turtle_draft_omits_record_fields() {
        let mut state = FormEditorState::open_with_type(EditorConfig::default(), FormType::Turtle, at(0));
        state.set_turtle_content("@prefix ex: <http://example.org/> .\nex:kg ex:title \"KG\" .\n");
        let draft = state.to_draft(at(30));
        assert_eq!(draft.form_type, FormType::Turtle);
        assert_eq!(draft.record, FormRecord::default());
        assert!(draft.turtle_content.unwrap().contains("ex:kg"));
        assert_eq!(draft.total_time_spent_seconds, 30);
    }

    #[test]
    fn test_empty_turtle_blocks_normal_submission() {
        let mut state = FormEditorState::open_with_type(EditorConfig::default(), FormType::Turtle, at(0));
        let outcome = state.submit(SubmissionMode::Normal, at(5)).unwrap();
        assert!(outcome.is_blocked());
        assert_eq!(state.status(), EditorStatus::Editing);
    }

    #[test]
    fn test_force_toggle_overrides_mode() {
        let mut state = editor();
        state.set_force_submit(true);
        let outcome = state.submit(SubmissionMode::Normal, at(60)).unwrap();
        let payload = outcome.payload().unwrap();
        assert_eq!(payload.metadata.submission_mode, SubmissionMode::Forced);
        assert!(payload.validation_errors.is_some());
        assert_eq!(payload.metadata.draft_id, None);
        assert_eq!(payload.metadata.session_count, 1);
        assert_eq!(payload.metadata.total_time_spent_seconds, 60);
        assert!(state.submit(SubmissionMode::Forced, at(61)).is_err());
    }
}
