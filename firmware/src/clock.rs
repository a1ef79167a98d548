//! [`Clock`] backed by the embassy time driver.

use animatronic_core::{Clock, Duration, Instant};
use embassy_time::Timer;

/// Milliseconds since boot from `embassy_time`.
#[derive(Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::from_millis(embassy_time::Instant::now().as_millis())
    }

    async fn delay(&self, duration: Duration) {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        Timer::after_millis(millis).await;
    }
}
