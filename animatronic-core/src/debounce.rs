//! Button debouncing.

use crate::time::{Duration, Instant};

/// An accepted transition of a debounced button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Pressed,
    Released,
}

/// Lockout debouncer.
///
/// A change of the raw level is accepted only if at least `interval` has
/// passed since the previous accepted change. The first change after
/// construction is accepted immediately.
#[derive(Clone, Copy, Debug)]
pub struct Debouncer {
    interval: Duration,
    pressed: bool,
    last_change: Option<Instant>,
}

impl Debouncer {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            pressed: false,
            last_change: None,
        }
    }

    /// Feed one raw sample. Returns the edge if the change was accepted.
    pub fn update(&mut self, raw: bool, now: Instant) -> Option<Edge> {
        if raw == self.pressed {
            return None;
        }
        if let Some(last) = self.last_change {
            if now.saturating_duration_since(last) < self.interval {
                return None;
            }
        }

        self.pressed = raw;
        self.last_change = Some(now);
        Some(if raw { Edge::Pressed } else { Edge::Released })
    }

    /// Debounced level.
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn test_first_press_is_immediate() {
        let mut button = Debouncer::new(Duration::from_millis(40));
        assert_eq!(button.update(true, at(0)), Some(Edge::Pressed));
        assert!(button.is_pressed());
    }

    #[test]
    fn test_bounce_inside_interval_is_ignored() {
        let mut button = Debouncer::new(Duration::from_millis(40));
        assert_eq!(button.update(true, at(100)), Some(Edge::Pressed));
        assert_eq!(button.update(false, at(110)), None);
        assert_eq!(button.update(true, at(120)), None);
        assert_eq!(button.update(false, at(139)), None);
        assert_eq!(button.update(false, at(140)), Some(Edge::Released));
    }

    #[test]
    fn test_one_press_event_per_hold() {
        let mut button = Debouncer::new(Duration::from_millis(40));
        let presses = (0..20)
            .filter(|i| button.update(true, at(i * 50)) == Some(Edge::Pressed))
            .count();
        assert_eq!(presses, 1);
    }
}
