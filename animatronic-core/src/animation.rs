//! Non-blocking blink, wave, and jaw animations.
//!
//! Each animation is a phase timer advanced with explicit timestamps; callers
//! apply the returned angles.

use crate::time::{Duration, Instant};
use crate::types::{Angle, Channel};

/// Channels driven by the wave animation.
pub const WAVE_CHANNELS: [Channel; 3] = [Channel::Wave1, Channel::Wave2, Channel::Wave3];

pub const WAVE_POSE_A: [Angle; 3] = [Angle::clamped(60), Angle::clamped(120), Angle::NEUTRAL];
pub const WAVE_POSE_B: [Angle; 3] = [Angle::clamped(120), Angle::clamped(60), Angle::NEUTRAL];
pub const WAVE_REST: [Angle; 3] = [Angle::NEUTRAL; 3];

pub const JAW_OPEN: Angle = Angle::clamped(30);
pub const JAW_CLOSED: Angle = Angle::NEUTRAL;

/// Jaw angle for the requested level.
#[must_use]
pub const fn jaw_angle(open: bool) -> Angle {
    if open {
        JAW_OPEN
    } else {
        JAW_CLOSED
    }
}

/// Single eyelid close-and-reopen.
pub struct Blink {
    duration: Duration,
    closed_at: Option<Instant>,
}

impl Blink {
    /// Eyelid angle while closed.
    pub const CLOSED: Angle = Angle::MIN;

    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            closed_at: None,
        }
    }

    /// Start a blink. Returns `false` (and changes nothing) if one is already running.
    pub fn trigger(&mut self, now: Instant) -> bool {
        if self.closed_at.is_some() {
            return false;
        }
        self.closed_at = Some(now);
        true
    }

    /// Returns `true` once, when the eyelid should reopen.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.closed_at {
            Some(closed) if now.saturating_duration_since(closed) >= self.duration => {
                self.closed_at = None;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    pub fn cancel(&mut self) {
        self.closed_at = None;
    }
}

/// Alternating two-pose wave.
pub struct Wave {
    interval: Duration,
    active: bool,
    showing_b: bool,
    last_switch: Instant,
}

impl Wave {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            active: false,
            showing_b: false,
            last_switch: Instant::ZERO,
        }
    }

    /// Apply the requested level. Returns the angles to write on a change:
    /// the first pose on activation, neutral on deactivation.
    pub fn set_active(&mut self, active: bool, now: Instant) -> Option<[Angle; 3]> {
        match (self.active, active) {
            (false, true) => {
                self.active = true;
                self.showing_b = false;
                self.last_switch = now;
                Some(WAVE_POSE_A)
            }
            (true, false) => {
                self.reset();
                Some(WAVE_REST)
            }
            _ => None,
        }
    }

    /// Returns the next pose when the interval has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<[Angle; 3]> {
        if !self.active || now.saturating_duration_since(self.last_switch) < self.interval {
            return None;
        }
        self.showing_b = !self.showing_b;
        self.last_switch = now;
        Some(if self.showing_b { WAVE_POSE_B } else { WAVE_POSE_A })
    }

    /// Stop without emitting anything; the caller neutralizes.
    pub fn reset(&mut self) {
        self.active = false;
        self.showing_b = false;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }
}
