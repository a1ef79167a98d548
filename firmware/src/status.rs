//! On-board LED showing the node's link state.

use animatronic_core::{LinkHealth, SafetyState, TickReport};
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::Output;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};

/// What the LED shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum LinkStatus {
    /// Slow blink.
    Locked,
    /// Solid on.
    Active,
    /// Fast blink: sends are failing.
    Degraded,
    /// Off: the node gave up on its hardware.
    Fault,
}

impl LinkStatus {
    #[must_use]
    pub fn from_report(report: &TickReport) -> Self {
        match (report.locked, report.health) {
            (_, LinkHealth::Degraded) => Self::Degraded,
            (true, LinkHealth::Healthy) => Self::Locked,
            (false, LinkHealth::Healthy) => Self::Active,
        }
    }

    #[must_use]
    pub fn from_safety(state: SafetyState) -> Self {
        match state {
            SafetyState::Locked => Self::Locked,
            SafetyState::Active => Self::Active,
        }
    }

    fn period(self) -> Duration {
        match self {
            Self::Locked => Duration::from_millis(500),
            Self::Degraded => Duration::from_millis(100),
            Self::Active | Self::Fault => Duration::from_millis(250),
        }
    }
}

/// Drive `led` from the latest status forever.
pub async fn drive_led(
    mut led: Output<'_>,
    signal: &Signal<CriticalSectionRawMutex, LinkStatus>,
) -> ! {
    let mut status = LinkStatus::Locked;

    loop {
        match status {
            LinkStatus::Active => led.set_high(),
            LinkStatus::Fault => led.set_low(),
            LinkStatus::Locked | LinkStatus::Degraded => led.toggle(),
        }

        if let Either::First(next) = select(signal.wait(), Timer::after(status.period())).await {
            status = next;
        }
    }
}
