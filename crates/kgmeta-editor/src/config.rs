//! Editor timing configuration.

use std::time::Duration;

use kgmeta_core::defaults;

/// Environment variable overriding the session countdown (seconds).
pub const ENV_SESSION_DURATION: &str = "KGMETA_SESSION_DURATION_SECS";
/// Environment variable overriding the countdown tick (milliseconds).
pub const ENV_TICK_MS: &str = "KGMETA_COUNTDOWN_TICK_MS";
/// Environment variable overriding the forced-submit delay (milliseconds).
pub const ENV_FORCED_SUBMIT_DELAY_MS: &str = "KGMETA_FORCED_SUBMIT_DELAY_MS";
/// Environment variable overriding the notice window (seconds).
pub const ENV_NOTICE_DISPLAY_SECS: &str = "KGMETA_NOTICE_DISPLAY_SECS";
/// Environment variable overriding the turtle debounce window (milliseconds).
pub const ENV_TURTLE_DEBOUNCE_MS: &str = "KGMETA_TURTLE_DEBOUNCE_MS";

/// Timing knobs for an editing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Countdown length in seconds.
    pub session_duration_secs: u64,
    /// Countdown tick interval in milliseconds.
    pub tick_ms: u64,
    /// Pause between expiry and the forced submission, in milliseconds.
    pub forced_submit_delay_ms: u64,
    /// How long transient notices stay visible, in seconds.
    pub notice_display_secs: i64,
    /// Quiet period before raw-text validation, in milliseconds.
    pub turtle_debounce_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            session_duration_secs: defaults::SESSION_DURATION_SECS,
            tick_ms: defaults::COUNTDOWN_TICK_MS,
            forced_submit_delay_ms: defaults::FORCED_SUBMIT_DELAY_MS,
            notice_display_secs: defaults::NOTICE_DISPLAY_SECS,
            turtle_debounce_ms: defaults::TURTLE_DEBOUNCE_MS,
        }
    }
}

impl EditorConfig {
    /// Create configuration from environment variables.
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `KGMETA_SESSION_DURATION_SECS` | `1200` | Session countdown |
    /// | `KGMETA_COUNTDOWN_TICK_MS` | `1000` | Countdown tick interval |
    /// | `KGMETA_FORCED_SUBMIT_DELAY_MS` | `2000` | Delay before forced submission |
    /// | `KGMETA_NOTICE_DISPLAY_SECS` | `3` | Notice display window |
    /// | `KGMETA_TURTLE_DEBOUNCE_MS` | `500` | Raw-text validation debounce |
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            session_duration_secs: env_or(ENV_SESSION_DURATION, base.session_duration_secs),
            tick_ms: env_or(ENV_TICK_MS, base.tick_ms).max(1),
            forced_submit_delay_ms: env_or(ENV_FORCED_SUBMIT_DELAY_MS, base.forced_submit_delay_ms),
            notice_display_secs: env_or(ENV_NOTICE_DISPLAY_SECS, base.notice_display_secs),
            turtle_debounce_ms: env_or(ENV_TURTLE_DEBOUNCE_MS, base.turtle_debounce_ms),
        }
    }

    pub fn with_session_duration(mut self, secs: u64) -> Self {
        self.session_duration_secs = secs;
        self
    }

    pub fn with_tick_ms(mut self, ms: u64) -> Self {
        self.tick_ms = ms.max(1);
        self
    }

    pub fn with_forced_submit_delay(mut self, ms: u64) -> Self {
        self.forced_submit_delay_ms = ms;
        self
    }

    pub fn with_notice_display(mut self, secs: i64) -> Self {
        self.notice_display_secs = secs;
        self
    }

    pub fn with_turtle_debounce(mut self, ms: u64) -> Self {
        self.turtle_debounce_ms = ms;
        self
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn forced_submit_delay(&self) -> Duration {
        Duration::from_millis(self.forced_submit_delay_ms)
    }

    pub fn turtle_debounce(&self) -> Duration {
        Duration::from_millis(self.turtle_debounce_ms)
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
