//! Controller node: samples the sticks and buttons, detects gestures, and
//! streams sequenced frames to the puppet.
//!
//! Each [`Controller::tick`] runs one polling step. Per tick, at most one
//! command frame goes out (resend, emergency stop, unlock, or data), plus a
//! heartbeat whenever one is due.

use animatronic_proto::{Command, ControlFrame, ToggleState};

use crate::debounce::{Debouncer, Edge};
use crate::gesture::{Chord, EmergencyGesture, ShortPress, UnlockCombo};
use crate::heartbeat::HeartbeatTimer;
use crate::input::{Button, InputSampler};
use crate::mapping::{ControlMapping, DEFAULT_CONTROL_MAPPING};
use crate::sender::{LinkHealth, ReliableSender};
use crate::store::{restore, StateStore};
use crate::time::{Clock, Duration, Instant};
use crate::transport::Transport;

/// Controller timing and gesture settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Pause between ticks.
    pub poll_interval: Duration,
    pub debounce: Duration,
    /// Minimum spacing between emergency stop frames while the chord is held.
    pub emergency_cooldown: Duration,
    pub unlock_window: Duration,
    pub unlock_presses: usize,
    /// Hold time band for the wave toggle press.
    pub short_press_min: Duration,
    pub short_press_max: Duration,
    pub heartbeat_interval: Duration,
    /// Consecutive send failures before the link counts as degraded.
    pub degraded_after: u8,
}

impl ControllerConfig {
    pub const DEFAULT: ControllerConfig = ControllerConfig {
        poll_interval: Duration::from_millis(50),
        debounce: Duration::from_millis(40),
        emergency_cooldown: Duration::from_millis(500),
        unlock_window: Duration::from_millis(2_000),
        unlock_presses: 3,
        short_press_min: Duration::from_millis(50),
        short_press_max: Duration::from_millis(1_000),
        heartbeat_interval: Duration::from_millis(1_500),
        degraded_after: 3,
    };
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A frame that reached the transport this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Emitted {
    EmergencyStop,
    Unlock,
    Data { seq: u16 },
    /// The previously failed frame went out.
    Resent,
}

/// Summary of one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    pub emitted: Option<Emitted>,
    pub heartbeat: bool,
    /// The wave toggle flipped.
    pub toggled: bool,
    pub send_failed: bool,
    pub locked: bool,
    pub health: LinkHealth,
}

pub struct Controller<S, T, P> {
    sampler: S,
    sender: ReliableSender<T>,
    store: P,
    config: ControllerConfig,
    mapping: ControlMapping,
    primary: Debouncer,
    secondary: Debouncer,
    combo: UnlockCombo,
    emergency: EmergencyGesture,
    short_press: ShortPress,
    heartbeat: HeartbeatTimer,
    locked: bool,
    toggles: ToggleState,
    blink_requested: bool,
    unlock_requested: bool,
}

impl<S: InputSampler, T: Transport, P: StateStore> Controller<S, T, P> {
    /// Build a locked controller with the default stick mapping, restoring
    /// the toggles from `store`.
    pub fn new(sampler: S, transport: T, store: P, config: ControllerConfig) -> Self {
        Self::with_mapping(sampler, transport, store, config, DEFAULT_CONTROL_MAPPING)
    }

    pub fn with_mapping(
        sampler: S,
        transport: T,
        mut store: P,
        config: ControllerConfig,
        mapping: ControlMapping,
    ) -> Self {
        let toggles = restore(&mut store);
        Self {
            sampler,
            sender: ReliableSender::new(transport, config.degraded_after),
            store,
            config,
            mapping,
            primary: Debouncer::new(config.debounce),
            secondary: Debouncer::new(config.debounce),
            combo: UnlockCombo::new(config.unlock_window, config.unlock_presses),
            emergency: EmergencyGesture::new(config.emergency_cooldown),
            short_press: ShortPress::new(config.short_press_min, config.short_press_max),
            heartbeat: HeartbeatTimer::new(config.heartbeat_interval),
            locked: true,
            toggles,
            blink_requested: false,
            unlock_requested: false,
        }
    }

    /// Run one polling step.
    pub async fn tick(&mut self, now: Instant) -> TickReport {
        let mut report = TickReport::default();

        let primary_raw = self.sampler.read_button(Button::Primary);
        let secondary_raw = self.sampler.read_button(Button::Secondary);
        let primary = self.primary.update(primary_raw, now);
        let secondary = self.secondary.update(secondary_raw, now);

        match self.emergency.update(primary_raw && secondary_raw, now) {
            Chord::Fire => self.emergency_stop(&mut report).await,
            Chord::Holding => self.short_press.cancel(),
            Chord::Idle => self.step(primary, secondary, now, &mut report).await,
        }

        if self.heartbeat.is_due(now) {
            match self.sender.send_heartbeat().await {
                Ok(()) => {
                    self.heartbeat.mark_sent(now);
                    report.heartbeat = true;
                }
                Err(_) => report.send_failed = true,
            }
        }

        report.locked = self.locked;
        report.health = self.sender.health();
        report
    }

    /// Tick forever at the configured pace.
    pub async fn run<C: Clock>(&mut self, clock: &C) -> ! {
        loop {
            let report = self.tick(clock.now()).await;
            trace!("tick: {}", report);
            clock.delay(self.config.poll_interval).await;
        }
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    #[must_use]
    pub fn link_health(&self) -> LinkHealth {
        self.sender.health()
    }

    #[must_use]
    pub fn toggles(&self) -> ToggleState {
        self.toggles
    }

    /// Counter value the next data frame will carry.
    #[must_use]
    pub fn seq(&self) -> u16 {
        self.sender.seq()
    }

    pub fn sender(&self) -> &ReliableSender<T> {
        &self.sender
    }

    pub fn sampler_mut(&mut self) -> &mut S {
        &mut self.sampler
    }

    pub fn transport_mut(&mut self) -> &mut T {
        self.sender.transport_mut()
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    async fn emergency_stop(&mut self, report: &mut TickReport) {
        warn!("emergency stop");
        self.locked = true;
        self.combo.clear();
        self.short_press.cancel();
        self.blink_requested = false;
        self.unlock_requested = false;
        self.sender.clear_pending();

        match self.sender.send_control(ControlFrame::emergency_stop()).await {
            Ok(()) => report.emitted = Some(Emitted::EmergencyStop),
            Err(_) => report.send_failed = true,
        }
    }

    async fn step(
        &mut self,
        primary: Option<Edge>,
        secondary: Option<Edge>,
        now: Instant,
        report: &mut TickReport,
    ) {
        if primary == Some(Edge::Pressed) {
            if self.combo.press(now) {
                debug!("unlock combo complete");
                self.unlock_requested = true;
            } else if !self.locked {
                self.blink_requested = true;
            }
        }

        // Toggles are only honored once unlocked.
        if self.short_press.update(secondary, now) && !self.locked {
            self.toggle_wave();
            report.toggled = true;
        }

        if let Some(result) = self.sender.flush_pending().await {
            match result {
                Ok(frame) => {
                    if frame.command() == Command::Unlock {
                        self.unlocked();
                    }
                    report.emitted = Some(Emitted::Resent);
                }
                Err(_) => report.send_failed = true,
            }
            return;
        }

        if self.unlock_requested {
            // A failed unlock stays pending in the sender.
            self.unlock_requested = false;
            match self.sender.send_control(ControlFrame::unlock()).await {
                Ok(()) => {
                    self.unlocked();
                    report.emitted = Some(Emitted::Unlock);
                }
                Err(_) => report.send_failed = true,
            }
            return;
        }

        if self.locked {
            return;
        }

        let frame = ControlFrame {
            positions: self.mapping.sample(&mut self.sampler),
            eye_blink: Some(self.blink_requested),
            wave_active: Some(self.toggles.wave_active),
            jaw_open: Some(self.toggles.jaw_open),
            ..ControlFrame::empty()
        };
        // A failed frame keeps the blink in the pending copy.
        self.blink_requested = false;

        match self.sender.send_data(frame).await {
            Ok(seq) => report.emitted = Some(Emitted::Data { seq }),
            Err(_) => report.send_failed = true,
        }
    }

    fn unlocked(&mut self) {
        if self.locked {
            info!("unlocked");
        }
        self.locked = false;
    }

    fn toggle_wave(&mut self) {
        self.toggles = self.toggles.toggled();
        info!(
            "wave {}, jaw {}",
            self.toggles.wave_active, self.toggles.jaw_open
        );
        if let Err(e) = self.store.save(&self.toggles) {
            warn!("failed to persist toggles: {}", e);
        }
    }
}
