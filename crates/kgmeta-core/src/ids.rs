//! Identifier helpers for drafts, sessions, events, and submissions.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::defaults::SUBMISSION_ID_PREFIX;

/// Generate a new time-ordered UUIDv7 identifier.
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// Extract the embedded creation time from a UUIDv7.
///
/// Returns `None` for other UUID versions.
pub fn extract_timestamp(uuid: &Uuid) -> Option<DateTime<Utc>> {
    if uuid.get_version_num() != 7 {
        return None;
    }
    let bytes = uuid.as_bytes();
    let millis = ((bytes[0] as i64) << 40)
        | ((bytes[1] as i64) << 32)
        | ((bytes[2] as i64) << 24)
        | ((bytes[3] as i64) << 16)
        | ((bytes[4] as i64) << 8)
        | (bytes[5] as i64);
    Utc.timestamp_millis_opt(millis).single()
}

/// Build a submission identifier of the form `kg-meta-<unix millis>`.
pub fn submission_id(now: DateTime<Utc>) -> String {
    format!("{}{}", SUBMISSION_ID_PREFIX, now.timestamp_millis())
}
