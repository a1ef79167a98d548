//! Multi-press and chord gestures on the controller buttons.

use heapless::Deque;

use crate::debounce::Edge;
use crate::time::{Duration, Instant};

/// Press history capacity; also the largest usable press count.
const HISTORY: usize = 8;

/// N presses within a rolling window.
pub struct UnlockCombo {
    presses: Deque<Instant, HISTORY>,
    window: Duration,
    required: usize,
}

impl UnlockCombo {
    /// `required` is clamped to `1..=8`.
    #[must_use]
    pub fn new(window: Duration, required: usize) -> Self {
        Self {
            presses: Deque::new(),
            window,
            required: required.clamp(1, HISTORY),
        }
    }

    /// Record an accepted press. Returns `true` when the combo completes,
    /// which also clears the history.
    pub fn press(&mut self, now: Instant) -> bool {
        self.evict(now);
        if self.presses.is_full() {
            self.presses.pop_front();
        }
        let _ = self.presses.push_back(now);

        if self.presses.len() >= self.required {
            self.presses.clear();
            true
        } else {
            false
        }
    }

    /// Presses still inside the window as of the last update.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.presses.len()
    }

    pub fn clear(&mut self) {
        self.presses.clear();
    }

    fn evict(&mut self, now: Instant) {
        while let Some(&oldest) = self.presses.front() {
            if now.saturating_duration_since(oldest) < self.window {
                break;
            }
            self.presses.pop_front();
        }
    }
}

/// Result of one emergency chord sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Chord {
    /// Chord not held.
    Idle,
    /// Emit an emergency stop now.
    Fire,
    /// Held inside the cooldown after firing.
    Holding,
}

/// Both-buttons emergency chord with a re-emission cooldown.
pub struct EmergencyGesture {
    cooldown: Duration,
    last_fire: Option<Instant>,
}

impl EmergencyGesture {
    #[must_use]
    pub const fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_fire: None,
        }
    }

    /// Sample the chord from raw button levels.
    pub fn update(&mut self, held: bool, now: Instant) -> Chord {
        if !held {
            return Chord::Idle;
        }
        match self.last_fire {
            Some(fired) if now.saturating_duration_since(fired) < self.cooldown => Chord::Holding,
            _ => {
                self.last_fire = Some(now);
                Chord::Fire
            }
        }
    }
}

/// Press-and-release within a duration band.
pub struct ShortPress {
    min: Duration,
    max: Duration,
    pressed_at: Option<Instant>,
}

impl ShortPress {
    #[must_use]
    pub const fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max,
            pressed_at: None,
        }
    }

    /// Feed one debounced edge. Returns `true` on the release that ends a
    /// short press.
    pub fn update(&mut self, edge: Option<Edge>, now: Instant) -> bool {
        match edge {
            Some(Edge::Pressed) => {
                self.pressed_at = Some(now);
                false
            }
            Some(Edge::Released) => self.pressed_at.take().is_some_and(|pressed| {
                let held = now.saturating_duration_since(pressed);
                held >= self.min && held <= self.max
            }),
            None => false,
        }
    }

    /// Forget a press in progress.
    pub fn cancel(&mut self) {
        self.pressed_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn combo() -> UnlockCombo {
        UnlockCombo::new(Duration::from_millis(2_000), 3)
    }

    #[test]
    fn test_three_presses_within_window_unlock() {
        let mut combo = combo();
        assert!(!combo.press(at(0)));
        assert!(!combo.press(at(900)));
        assert!(combo.press(at(1_999)));
        assert_eq!(combo.pending(), 0);
    }

    #[test]
    fn test_two_presses_do_not_unlock() {
        let mut combo = combo();
        assert!(!combo.press(at(0)));
        assert!(!combo.press(at(300)));
        assert_eq!(combo.pending(), 2);
    }

    #[test]
    fn test_three_presses_spanning_window_do_not_unlock() {
        let mut combo = combo();
        assert!(!combo.press(at(0)));
        assert!(!combo.press(at(1_250)));
        assert!(!combo.press(at(2_500)));
        assert_eq!(combo.pending(), 2);
    }

    #[test]
    fn test_press_exactly_window_old_is_evicted() {
        let mut combo = combo();
        combo.press(at(0));
        combo.press(at(1_000));
        assert!(!combo.press(at(2_000)));
        assert!(combo.press(at(2_100)));
    }

    #[test]
    fn test_emergency_cooldown() {
        let mut chord = EmergencyGesture::new(Duration::from_millis(500));
        assert_eq!(chord.update(false, at(0)), Chord::Idle);
        assert_eq!(chord.update(true, at(10)), Chord::Fire);
        assert_eq!(chord.update(true, at(60)), Chord::Holding);
        assert_eq!(chord.update(true, at(509)), Chord::Holding);
        assert_eq!(chord.update(true, at(510)), Chord::Fire);
    }

    #[test]
    fn test_emergency_release_inside_cooldown_still_suppresses() {
        let mut chord = EmergencyGesture::new(Duration::from_millis(500));
        assert_eq!(chord.update(true, at(0)), Chord::Fire);
        assert_eq!(chord.update(false, at(100)), Chord::Idle);
        assert_eq!(chord.update(true, at(200)), Chord::Holding);
    }

    #[test]
    fn test_short_press_band() {
        let mut press = ShortPress::new(Duration::from_millis(50), Duration::from_millis(1_000));

        press.update(Some(Edge::Pressed), at(0));
        assert!(press.update(Some(Edge::Released), at(200)));

        press.update(Some(Edge::Pressed), at(1_000));
        assert!(!press.update(Some(Edge::Released), at(1_030)));

        press.update(Some(Edge::Pressed), at(2_000));
        assert!(!press.update(Some(Edge::Released), at(3_500)));

        assert!(!press.update(Some(Edge::Released), at(4_000)));
    }
}
