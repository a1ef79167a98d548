//! Angles and actuator channels.

use animatronic_proto::NEUTRAL_DEGREES;

/// Number of actuator channels driven by the puppet.
pub const CHANNEL_COUNT: usize = 10;

/// Actuator angle in whole degrees, always within [0, 180].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Angle(u8);

impl Angle {
    pub const MIN: Angle = Angle(0);
    pub const MAX: Angle = Angle(180);
    pub const NEUTRAL: Angle = Angle(NEUTRAL_DEGREES as u8);

    /// Clamp an arbitrary value into range.
    #[must_use]
    pub const fn clamped(degrees: i32) -> Self {
        if degrees < 0 {
            Self::MIN
        } else if degrees > 180 {
            Self::MAX
        } else {
            Self(degrees as u8)
        }
    }

    #[must_use]
    pub const fn degrees(self) -> u8 {
        self.0
    }
}

impl Default for Angle {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl From<Angle> for i16 {
    fn from(angle: Angle) -> i16 {
        i16::from(angle.0)
    }
}

/// The ten actuator channels, numbered as wired on the PWM driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Channel {
    EyeH = 0,
    EyeV = 1,
    EyeBlink = 2,
    NeckLr = 3,
    NeckUd = 4,
    Jaw = 5,
    Torso = 6,
    Wave1 = 7,
    Wave2 = 8,
    Wave3 = 9,
}

impl Channel {
    pub const ALL: [Channel; CHANNEL_COUNT] = [
        Channel::EyeH,
        Channel::EyeV,
        Channel::EyeBlink,
        Channel::NeckLr,
        Channel::NeckUd,
        Channel::Jaw,
        Channel::Torso,
        Channel::Wave1,
        Channel::Wave2,
        Channel::Wave3,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}
