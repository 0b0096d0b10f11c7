//! Edit-session history and the session countdown.

use chrono::{DateTime, Utc};

use kgmeta_core::{total_duration_seconds, EditSession};

/// Closed edit sessions plus the currently open one, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionTracker {
    history: Vec<EditSession>,
    current_start: Option<DateTime<Utc>>,
}

impl SessionTracker {
    /// Tracker continuing an existing session history.
    pub fn with_history(history: Vec<EditSession>) -> Self {
        Self {
            history,
            current_start: None,
        }
    }

    /// Open a session at `now`. Already-open sessions are left alone.
    pub fn start(&mut self, now: DateTime<Utc>) {
        if self.current_start.is_none() {
            self.current_start = Some(now);
        }
    }

    /// Close the open session and append it to the history.
    pub fn end(&mut self, now: DateTime<Utc>) -> Option<EditSession> {
        let start = self.current_start.take()?;
        let session = EditSession::new(start, now);
        self.history.push(session.clone());
        Some(session)
    }

    pub fn is_open(&self) -> bool {
        self.current_start.is_some()
    }

    pub fn history(&self) -> &[EditSession] {
        &self.history
    }

    /// History plus the open session measured up to `now`.
    pub fn sessions_at(&self, now: DateTime<Utc>) -> Vec<EditSession> {
        let mut sessions = self.history.clone();
        if let Some(start) = self.current_start {
            sessions.push(EditSession::new(start, now));
        }
        sessions
    }

    /// Seconds across every session, the open one measured against `now`.
    pub fn total_seconds(&self, now: DateTime<Utc>) -> i64 {
        let open = self
            .current_start
            .map_or(0, |start| (now - start).num_seconds().max(0));
        total_duration_seconds(&self.history) + open
    }

    /// Start of the first recorded session.
    pub fn first_started_at(&self) -> Option<DateTime<Utc>> {
        self.history
            .first()
            .map(|s| s.start_time)
            .or(self.current_start)
    }
}

/// Result of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running { remaining_secs: u64 },
    /// The countdown just reached zero and is now inactive.
    Expired,
    Inactive,
}

/// Whole-second countdown, decremented by explicit ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: u64,
    active: bool,
}

impl Countdown {
    pub fn new(duration_secs: u64) -> Self {
        Self {
            remaining: duration_secs,
            active: duration_secs > 0,
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.active {
            return TickOutcome::Inactive;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.active = false;
            TickOutcome::Expired
        } else {
            TickOutcome::Running {
                remaining_secs: self.remaining,
            }
        }
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}
