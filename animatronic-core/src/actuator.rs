//! Actuator driver trait and the single owner of all channel writes.

use crate::types::{Angle, Channel, CHANNEL_COUNT};

/// Error type for actuator operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuatorError {
    /// Bus transfer failed.
    Bus,
    /// Driver chip did not acknowledge its address.
    NotFound,
    /// Channel not wired on this driver.
    InvalidChannel,
}

impl core::fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus => write!(f, "bus error"),
            Self::NotFound => write!(f, "driver not found"),
            Self::InvalidChannel => write!(f, "invalid channel"),
        }
    }
}

/// Hardware that positions the ten angle-driven channels.
pub trait ActuatorDriver {
    /// Bring the driver chip up. Called again on retry.
    fn init(&mut self) -> Result<(), ActuatorError>;

    /// Command one channel.
    fn set_channel_angle(&mut self, channel: Channel, angle: Angle) -> Result<(), ActuatorError>;
}

/// Owns the driver and mirrors the last commanded angle of every channel.
///
/// All channel writes go through here. The mirror records intent, so it holds
/// the commanded angle even when the bus write failed.
pub struct Actuators<D> {
    driver: D,
    angles: [Angle; CHANNEL_COUNT],
    faults: u32,
}

impl<D: ActuatorDriver> Actuators<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            angles: [Angle::NEUTRAL; CHANNEL_COUNT],
            faults: 0,
        }
    }

    pub fn init(&mut self) -> Result<(), ActuatorError> {
        self.driver.init()
    }

    /// Command one channel and record it in the mirror.
    pub fn set(&mut self, channel: Channel, angle: Angle) -> Result<(), ActuatorError> {
        self.angles[channel.index()] = angle;
        self.driver.set_channel_angle(channel, angle).map_err(|e| {
            self.faults = self.faults.wrapping_add(1);
            warn!("channel {} write failed: {}", channel, e);
            e
        })
    }

    /// Command one channel from an unclamped value.
    pub fn set_degrees(&mut self, channel: Channel, degrees: i32) -> Result<(), ActuatorError> {
        self.set(channel, Angle::clamped(degrees))
    }

    /// Drive every channel to neutral. Keeps going past failures and
    /// reports the last one.
    pub fn neutral_all(&mut self) -> Result<(), ActuatorError> {
        let mut result = Ok(());
        for channel in Channel::ALL {
            if let Err(e) = self.set(channel, Angle::NEUTRAL) {
                result = Err(e);
            }
        }
        result
    }

    #[must_use]
    pub fn angle(&self, channel: Channel) -> Angle {
        self.angles[channel.index()]
    }

    #[must_use]
    pub fn angles(&self) -> &[Angle; CHANNEL_COUNT] {
        &self.angles
    }

    /// Number of failed channel writes since construction.
    #[must_use]
    pub fn faults(&self) -> u32 {
        self.faults
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
