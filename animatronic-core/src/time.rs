//! Millisecond timestamps and the clock seam.
//!
//! Every state machine in this crate takes `now` explicitly, so host tests
//! drive time by hand and nothing ever sleeps inside a step function.

use core::future::Future;
use core::ops::Add;

pub use core::time::Duration;

/// Milliseconds since boot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Instant(u64);

impl Instant {
    pub const ZERO: Instant = Instant(0);

    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Time elapsed since `earlier`, or zero if `earlier` is in the future.
    #[must_use]
    pub fn saturating_duration_since(self, earlier: Instant) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Instant {
        let millis = u64::try_from(rhs.as_millis()).unwrap_or(u64::MAX);
        Instant(self.0.saturating_add(millis))
    }
}

/// Time source and pacing for the node loops.
pub trait Clock {
    /// Current time.
    fn now(&self) -> Instant;

    /// Suspend the calling loop for `duration`.
    fn delay(&self, duration: Duration) -> impl Future<Output = ()>;
}
