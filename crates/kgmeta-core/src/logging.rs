//! Structured logging schema and field name constants for kgmeta.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation can query by the same names across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded operation, requires operator attention |
//! | WARN  | Recoverable issue, candidate skipped or response discarded |
//! | INFO  | Lifecycle events (form open/close, draft saved, submission) |
//! | DEBUG | Decision points (fields selected, strategy chosen) |
//! | TRACE | Per-candidate and per-tick iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "core", "inference", "db", "editor", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "mapper", "request_builder", "openai", "draft_store", "countdown"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "add_tag", "apply_all", "save_draft", "submit"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Draft UUID being operated on.
pub const DRAFT_ID: &str = "draft_id";

/// Submission identifier (`kg-meta-<millis>`).
pub const SUBMISSION_ID: &str = "submission_id";

/// Form field name.
pub const FIELD: &str = "field";

/// Editor session UUID.
pub const SESSION_ID: &str = "session_id";

/// Suggestion request generation counter.
pub const REQUEST_TOKEN: &str = "request_token";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of suggestion candidates considered.
pub const CANDIDATE_COUNT: &str = "candidate_count";

/// Number of field definitions sent to a suggestion provider.
pub const FIELD_COUNT: &str = "field_count";

/// Byte length of a prompt.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

/// Seconds left on the editing countdown.
pub const REMAINING_SECS: &str = "remaining_secs";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Submission mode ("NORMAL_SUBMISSION", "FORCED_SUBMISSION").
pub const SUBMISSION_MODE: &str = "submission_mode";

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
