//! Link liveness: heartbeat pacing on the controller, silence watchdog on
//! the puppet.

use crate::time::{Duration, Instant};

/// Decides when the controller owes the puppet a heartbeat.
pub struct HeartbeatTimer {
    interval: Duration,
    last_sent: Option<Instant>,
}

impl HeartbeatTimer {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_sent: None,
        }
    }

    /// A heartbeat is due if none has been sent yet or the interval has elapsed.
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        self.last_sent
            .map_or(true, |sent| now.saturating_duration_since(sent) >= self.interval)
    }

    /// Record a heartbeat handed to the transport.
    pub fn mark_sent(&mut self, now: Instant) {
        self.last_sent = Some(now);
    }
}

/// Fires once when the link has been silent longer than the timeout.
pub struct LinkWatchdog {
    timeout: Duration,
    last_seen: Instant,
    expired: bool,
}

impl LinkWatchdog {
    /// Start watching as of `now`.
    #[must_use]
    pub const fn new(timeout: Duration, now: Instant) -> Self {
        Self {
            timeout,
            last_seen: now,
            expired: false,
        }
    }

    /// Record an accepted frame.
    pub fn feed(&mut self, now: Instant) {
        self.last_seen = now;
        self.expired = false;
    }

    /// Returns `true` exactly once per silence period, on the first poll where
    /// the silence is strictly longer than the timeout.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.expired || self.silence(now) <= self.timeout {
            return false;
        }
        self.expired = true;
        true
    }

    #[must_use]
    pub fn silence(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_seen)
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expired
    }
}
