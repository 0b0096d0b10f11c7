//! Centralized default constants for kgmeta.
//!
//! **This module is the single source of truth** for shared default values.
//! All crates reference these constants instead of defining their own magic
//! numbers.

// =============================================================================
// EDITING SESSION
// =============================================================================

/// Countdown duration for one editing session, in seconds (20 minutes).
pub const SESSION_DURATION_SECS: u64 = 1200;

/// Countdown tick interval in milliseconds.
pub const COUNTDOWN_TICK_MS: u64 = 1000;

/// Delay between countdown expiry and the forced submission, in milliseconds.
pub const FORCED_SUBMIT_DELAY_MS: u64 = 2000;

/// How long a transient notice ("only one value allowed") stays visible.
pub const NOTICE_DISPLAY_SECS: i64 = 3;

/// Quiet period before raw-text (turtle) validation runs, in milliseconds.
pub const TURTLE_DEBOUNCE_MS: u64 = 500;

/// Notice shown when the countdown reaches zero.
pub const TIME_EXPIRED_NOTICE: &str =
    "Time expired. Your form will be submitted automatically with its current content.";

// =============================================================================
// VALIDATION
// =============================================================================

/// Lowest accepted year for calendar dates.
pub const DATE_YEAR_MIN: i32 = 1900;

/// Highest accepted year for calendar dates.
pub const DATE_YEAR_MAX: i32 = 2100;

// =============================================================================
// SUGGESTIONS
// =============================================================================

/// Default chat model for structured suggestions.
pub const SUGGEST_MODEL: &str = "gpt-4o-mini";

/// Sampling temperature for structured suggestions.
pub const SUGGEST_TEMPERATURE: f32 = 0.2;

/// Token ceiling for one bulk suggestion response.
pub const SUGGEST_MAX_TOKENS: u32 = 4000;

/// Default OpenAI-compatible API base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default HTTP timeout for suggestion requests, in seconds.
pub const SUGGEST_TIMEOUT_SECS: u64 = 120;

/// Name of the structured output schema sent to the provider.
pub const SUGGEST_SCHEMA_NAME: &str = "bulk_field_suggestions";

/// Message returned in place of suggestions when the provider content is not JSON.
pub const INVALID_JSON_REASON: &str = "AI response was not valid JSON. Please try again.";

/// Field key used for response-level errors.
pub const RESPONSE_ERROR_FIELD: &str = "error";

// =============================================================================
// STORAGE
// =============================================================================

/// Default data directory for drafts and submissions.
pub const DATA_DIR: &str = "./data";

/// File name of the whole-list draft store.
pub const DRAFTS_FILE: &str = "drafts.json";

/// File name of the JSON-lines submission log.
pub const SUBMISSIONS_FILE: &str = "submissions.jsonl";

/// Prefix of generated submission identifiers.
pub const SUBMISSION_ID_PREFIX: &str = "kg-meta-";

/// Display name for drafts without a title.
pub const UNTITLED_DRAFT_NAME: &str = "Untitled draft";

// =============================================================================
// EVENTS
// =============================================================================

/// Broadcast buffer capacity for the editor event bus.
pub const EVENT_BUS_CAPACITY: usize = 256;
