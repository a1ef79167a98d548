//! Puppet node: watchdog, lock/unlock safety state machine, and animation
//! sequencing over the actuator channels.
//!
//! The puppet is `Locked` on boot, after an emergency stop, and whenever the
//! link has been silent longer than the watchdog timeout. Entering `Locked`
//! always drives every channel to neutral first. Data frames are honored
//! only while `Active`.

use animatronic_proto::{parse_frame, Command, DataFields, DecodeError, MAX_FRAME_SIZE};

use crate::actuator::{ActuatorDriver, ActuatorError, Actuators};
use crate::animation::{jaw_angle, Blink, Wave, WAVE_CHANNELS};
use crate::heartbeat::LinkWatchdog;
use crate::time::{Clock, Duration, Instant};
use crate::transport::Transport;
use crate::types::{Angle, Channel};

/// Puppet timing and retry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PuppetConfig {
    /// Silence longer than this locks the puppet.
    pub watchdog_timeout: Duration,
    /// How long the eyelid stays closed.
    pub blink_duration: Duration,
    /// Time between wave poses.
    pub wave_interval: Duration,
    /// Driver init attempts before giving up.
    pub init_attempts: u8,
    pub init_retry_delay: Duration,
    /// Neutral rounds issued after init gives up.
    pub fallback_rounds: u8,
    /// Pause after a transport receive error.
    pub receive_backoff: Duration,
}

impl PuppetConfig {
    pub const DEFAULT: PuppetConfig = PuppetConfig {
        watchdog_timeout: Duration::from_millis(4_000),
        blink_duration: Duration::from_millis(150),
        wave_interval: Duration::from_millis(200),
        init_attempts: 5,
        init_retry_delay: Duration::from_millis(1_000),
        fallback_rounds: 5,
        receive_backoff: Duration::from_millis(100),
    };
}

impl Default for PuppetConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafetyState {
    Locked,
    Active,
}

/// Why the puppet last entered `Locked`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LockReason {
    Boot,
    EmergencyStop,
    LinkLost,
}

/// What one datagram or service pass did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PuppetEvent {
    Heartbeat,
    EmergencyStop,
    Unlocked,
    /// Data frame applied to the channels.
    Applied,
    /// Data frame dropped because the puppet is locked.
    Ignored,
    /// Datagram failed to decode.
    Rejected(DecodeError),
    /// Watchdog expired; channels neutral, puppet locked.
    LinkLost,
}

/// Informational link counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    pub accepted: u32,
    pub decode_errors: u32,
    /// Data frames repeating the previous sequence number.
    pub duplicates: u32,
    /// Forward gaps in data sequence numbers.
    pub missed: u32,
    pub watchdog_expiries: u32,
}

/// The actuator driver never came up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HardwareInitError {
    pub attempts: u8,
    pub last: ActuatorError,
}

impl core::fmt::Display for HardwareInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "actuator init failed after {} attempts: {}",
            self.attempts, self.last
        )
    }
}

/// Data sequence numbers further ahead than this count as reordering, not loss.
const MAX_FORWARD_GAP: u16 = 0x8000;

pub struct Puppet<T, D> {
    transport: T,
    actuators: Actuators<D>,
    config: PuppetConfig,
    state: SafetyState,
    lock_reason: LockReason,
    watchdog: LinkWatchdog,
    blink: Blink,
    wave: Wave,
    jaw_open: bool,
    last_data_seq: Option<u16>,
    stats: LinkStats,
}

impl<T: Transport, D: ActuatorDriver> Puppet<T, D> {
    pub fn new(transport: T, driver: D, config: PuppetConfig, now: Instant) -> Self {
        Self {
            transport,
            actuators: Actuators::new(driver),
            config,
            state: SafetyState::Locked,
            lock_reason: LockReason::Boot,
            watchdog: LinkWatchdog::new(config.watchdog_timeout, now),
            blink: Blink::new(config.blink_duration),
            wave: Wave::new(config.wave_interval),
            jaw_open: false,
            last_data_seq: None,
            stats: LinkStats::default(),
        }
    }

    /// Bring the driver up, retrying with a delay between attempts.
    ///
    /// On success every channel is neutral. When all attempts fail, neutral
    /// is issued `fallback_rounds` times on a best-effort basis and the error
    /// is returned.
    pub async fn start<C: Clock>(&mut self, clock: &C) -> Result<(), HardwareInitError> {
        let attempts = self.config.init_attempts.max(1);
        let mut last = ActuatorError::Bus;

        for attempt in 1..=attempts {
            match self.actuators.init() {
                Ok(()) => {
                    info!("actuator driver ready (attempt {})", attempt);
                    let _ = self.actuators.neutral_all();
                    return Ok(());
                }
                Err(e) => {
                    warn!("actuator init attempt {}/{} failed: {}", attempt, attempts, e);
                    last = e;
                    if attempt < attempts {
                        clock.delay(self.config.init_retry_delay).await;
                    }
                }
            }
        }

        error!("actuator driver unavailable, issuing neutral fallback");
        for _ in 0..self.config.fallback_rounds {
            let _ = self.actuators.neutral_all();
        }
        Err(HardwareInitError { attempts, last })
    }

    /// Receive and handle at most one datagram, then run the watchdog and
    /// animations.
    ///
    /// Returns the most significant event: a watchdog expiry outranks the
    /// datagram's own outcome.
    pub async fn process_one<C: Clock>(&mut self, clock: &C) -> Option<PuppetEvent> {
        let mut buf = [0u8; MAX_FRAME_SIZE];

        let received = match self.transport.receive(&mut buf).await {
            Ok(Some(len)) => {
                let len = len.min(buf.len());
                Some(self.handle_datagram(&buf[..len], clock.now()))
            }
            Ok(None) => None,
            Err(e) => {
                warn!("receive failed: {}", e);
                clock.delay(self.config.receive_backoff).await;
                None
            }
        };

        self.service(clock.now()).or(received)
    }

    /// Run forever.
    pub async fn run<C: Clock>(&mut self, clock: &C) -> ! {
        loop {
            let _ = self.process_one(clock).await;
        }
    }

    /// Decode and act on one datagram.
    pub fn handle_datagram(&mut self, bytes: &[u8], now: Instant) -> PuppetEvent {
        let frame = match parse_frame(bytes) {
            Ok(frame) => frame,
            Err(e) => {
                self.stats.decode_errors = self.stats.decode_errors.wrapping_add(1);
                warn!("dropping datagram: {}", e);
                return PuppetEvent::Rejected(e);
            }
        };

        // The silence that just ended may already have outlasted the
        // timeout; lock before this frame is classified.
        self.expire_if_silent(now);
        self.watchdog.feed(now);
        self.stats.accepted = self.stats.accepted.wrapping_add(1);

        match frame.command() {
            Command::Heartbeat { seq } => {
                trace!("heartbeat seq={}", seq);
                PuppetEvent::Heartbeat
            }
            Command::EmergencyStop => {
                self.lock(LockReason::EmergencyStop);
                PuppetEvent::EmergencyStop
            }
            Command::Unlock => {
                if self.state == SafetyState::Locked {
                    info!("unlocked");
                    self.state = SafetyState::Active;
                }
                PuppetEvent::Unlocked
            }
            Command::Data(data) => {
                self.track_seq(data.seq);
                if self.state == SafetyState::Locked {
                    debug!("locked, ignoring data");
                    return PuppetEvent::Ignored;
                }
                self.apply(&data, now);
                PuppetEvent::Applied
            }
        }
    }

    /// Watchdog check and animation tick. Call every loop iteration.
    pub fn service(&mut self, now: Instant) -> Option<PuppetEvent> {
        if self.expire_if_silent(now) {
            return Some(PuppetEvent::LinkLost);
        }

        if self.blink.poll(now) {
            let _ = self.actuators.set(Channel::EyeBlink, Angle::NEUTRAL);
        }
        if self.state == SafetyState::Active {
            if let Some(pose) = self.wave.poll(now) {
                self.write_wave(pose);
            }
        }
        None
    }

    #[must_use]
    pub fn state(&self) -> SafetyState {
        self.state
    }

    #[must_use]
    pub fn lock_reason(&self) -> LockReason {
        self.lock_reason
    }

    #[must_use]
    pub fn angle(&self, channel: Channel) -> Angle {
        self.actuators.angle(channel)
    }

    pub fn actuators(&self) -> &Actuators<D> {
        &self.actuators
    }

    #[must_use]
    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    #[must_use]
    pub fn wave_active(&self) -> bool {
        self.wave.is_active()
    }

    #[must_use]
    pub fn jaw_open(&self) -> bool {
        self.jaw_open
    }

    #[must_use]
    pub fn is_blinking(&self) -> bool {
        self.blink.is_closed()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Lock on watchdog expiry. Returns `true` if it fired.
    fn expire_if_silent(&mut self, now: Instant) -> bool {
        if !self.watchdog.poll(now) {
            return false;
        }
        self.stats.watchdog_expiries = self.stats.watchdog_expiries.wrapping_add(1);
        warn!(
            "link silent for {} ms, locking",
            self.watchdog.silence(now).as_millis() as u64
        );
        self.lock(LockReason::LinkLost);
        true
    }

    /// Stop every animation, drive all channels neutral, then lock.
    fn lock(&mut self, reason: LockReason) {
        self.blink.cancel();
        self.wave.reset();
        self.jaw_open = false;
        if let Err(e) = self.actuators.neutral_all() {
            error!("neutral on lock incomplete: {}", e);
        }
        if self.state != SafetyState::Locked {
            info!("locked: {}", reason);
        }
        self.state = SafetyState::Locked;
        self.lock_reason = reason;
    }

    fn apply(&mut self, data: &DataFields, now: Instant) {
        let p = &data.positions;
        for (value, channel) in [
            (p.eye_h, Channel::EyeH),
            (p.eye_v, Channel::EyeV),
            (p.neck_lr, Channel::NeckLr),
            (p.neck_ud, Channel::NeckUd),
            (p.torso_rot, Channel::Torso),
        ] {
            if let Some(degrees) = value {
                let _ = self.actuators.set_degrees(channel, i32::from(degrees));
            }
        }

        if data.eye_blink == Some(true) && self.blink.trigger(now) {
            let _ = self.actuators.set(Channel::EyeBlink, Blink::CLOSED);
        }

        if let Some(active) = data.wave_active {
            if let Some(pose) = self.wave.set_active(active, now) {
                self.write_wave(pose);
            }
        }

        if let Some(open) = data.jaw_open {
            self.jaw_open = open;
            let _ = self.actuators.set(Channel::Jaw, jaw_angle(open));
        }
    }

    fn write_wave(&mut self, pose: [Angle; 3]) {
        for (channel, angle) in WAVE_CHANNELS.into_iter().zip(pose) {
            let _ = self.actuators.set(channel, angle);
        }
    }

    fn track_seq(&mut self, seq: Option<u16>) {
        let Some(seq) = seq else { return };
        if let Some(last) = self.last_data_seq {
            let gap = seq.wrapping_sub(last.wrapping_add(1));
            if seq == last {
                self.stats.duplicates = self.stats.duplicates.wrapping_add(1);
            } else if gap > 0 && gap < MAX_FORWARD_GAP {
                self.stats.missed = self.stats.missed.wrapping_add(u32::from(gap));
            }
        }
        self.last_data_seq = Some(seq);
    }
}
