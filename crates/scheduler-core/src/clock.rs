//! A small clock abstraction so scheduling stays deterministic in tests.

use chrono::Utc;

#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    /// Wall clock.
    #[default]
    System,
    /// Frozen at the given millisecond timestamp.
    Fixed(i64),
}

impl Clock {
    /// A clock frozen at the given unix second.
    #[must_use]
    pub fn fixed_at_secs(secs: i64) -> Self {
        Clock::Fixed(secs * 1_000)
    }

    /// Current unix time in seconds.
    #[must_use]
    pub fn now_secs(&self) -> i64 {
        match self {
            Clock::System => Utc::now().timestamp(),
            Clock::Fixed(ms) => ms / 1_000,
        }
    }

    /// Current unix time in milliseconds.
    #[must_use]
    pub fn now_millis(&self) -> i64 {
        match self {
            Clock::System => Utc::now().timestamp_millis(),
            Clock::Fixed(ms) => *ms,
        }
    }

    /// Advance a fixed clock; has no effect on the system clock.
    pub fn advance_secs(&mut self, secs: i64) {
        if let Clock::Fixed(ms) = self {
            *ms += secs * 1_000;
        }
    }

    /// Advance a fixed clock by milliseconds; no effect on the system clock.
    pub fn advance_millis(&mut self, millis: i64) {
        if let Clock::Fixed(ms) = self {
            *ms += millis;
        }
    }
}
