//! PCA9685 16-channel PWM driver as an [`ActuatorDriver`].
//!
//! Runs the chip at 50 Hz and maps 0-180 degrees onto a 500-2500 us pulse.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, I2c};

use crate::actuator::{ActuatorDriver, ActuatorError};
use crate::types::{Angle, Channel};

/// Default 7-bit bus address (all address pins low).
pub const DEFAULT_ADDRESS: u8 = 0x40;

const MODE1: u8 = 0x00;
const PRESCALE: u8 = 0xFE;
const LED0_ON_L: u8 = 0x06;

const MODE1_SLEEP: u8 = 0x10;
const MODE1_AWAKE: u8 = 0x00;
/// Restart, auto-increment, respond to all-call.
const MODE1_RUN: u8 = 0xA1;

/// Prescaler for 50 Hz from the 25 MHz internal oscillator.
const PRESCALE_50HZ: u8 = 0x79;

const PWM_STEPS: u32 = 4096;

/// Pulse widths for a standard hobby servo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoCalibration {
    pub min_pulse_us: u32,
    pub max_pulse_us: u32,
    pub period_us: u32,
}

pub const DEFAULT_CALIBRATION: ServoCalibration = ServoCalibration {
    min_pulse_us: 500,
    max_pulse_us: 2_500,
    period_us: 20_000,
};

impl ServoCalibration {
    /// PWM off-count for an angle.
    #[must_use]
    pub fn ticks(&self, angle: Angle) -> u16 {
        let span = self.max_pulse_us.saturating_sub(self.min_pulse_us);
        let pulse_us = self.min_pulse_us + u32::from(angle.degrees()) * span / 180;
        let ticks = pulse_us * PWM_STEPS / self.period_us.max(1);
        ticks.min(PWM_STEPS - 1) as u16
    }
}

pub struct Pca9685<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    calibration: ServoCalibration,
}

impl<I2C: I2c, D: DelayNs> Pca9685<I2C, D> {
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            i2c,
            delay,
            address: DEFAULT_ADDRESS,
            calibration: DEFAULT_CALIBRATION,
        }
    }

    #[must_use]
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    #[must_use]
    pub fn with_calibration(mut self, calibration: ServoCalibration) -> Self {
        self.calibration = calibration;
        self
    }

    /// Give the bus and delay back.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), ActuatorError> {
        self.i2c.write(self.address, bytes).map_err(bus_error)
    }
}

fn bus_error<E: embedded_hal::i2c::Error>(e: E) -> ActuatorError {
    match e.kind() {
        ErrorKind::NoAcknowledge(_) => ActuatorError::NotFound,
        _ => ActuatorError::Bus,
    }
}

impl<I2C: I2c, D: DelayNs> ActuatorDriver for Pca9685<I2C, D> {
    fn init(&mut self) -> Result<(), ActuatorError> {
        self.write(&[MODE1, MODE1_SLEEP])?;
        self.delay.delay_ms(10);
        self.write(&[PRESCALE, PRESCALE_50HZ])?;
        self.write(&[MODE1, MODE1_AWAKE])?;
        self.delay.delay_ms(5);
        self.write(&[MODE1, MODE1_RUN])
    }

    fn set_channel_angle(&mut self, channel: Channel, angle: Angle) -> Result<(), ActuatorError> {
        let index = u8::try_from(channel.index()).map_err(|_| ActuatorError::InvalidChannel)?;
        if index >= 16 {
            return Err(ActuatorError::InvalidChannel);
        }
        let [off_l, off_h] = self.calibration.ticks(angle).to_le_bytes();
        self.write(&[LED0_ON_L + 4 * index, 0, 0, off_l, off_h])
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use embedded_hal::i2c::{ErrorType, NoAcknowledgeSource, Operation};
    use std::vec;
    use std::vec::Vec;

    #[derive(Default)]
    struct MockI2c {
        writes: Vec<(u8, Vec<u8>)>,
        error: Option<ErrorKind>,
    }

    impl ErrorType for MockI2c {
        type Error = ErrorKind;
    }

    impl I2c for MockI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if let Some(e) = self.error {
                return Err(e);
            }
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.writes.push((address, bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockDelay {
        total_ns: u64,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }

    #[test]
    fn test_calibration_ticks() {
        let cal = DEFAULT_CALIBRATION;
        assert_eq!(cal.ticks(Angle::MIN), 102);
        assert_eq!(cal.ticks(Angle::NEUTRAL), 307);
        assert_eq!(cal.ticks(Angle::MAX), 512);
    }

    #[test]
    fn test_init_sequence() {
        let mut pwm = Pca9685::new(MockI2c::default(), MockDelay::default());
        pwm.init().unwrap();
        let (i2c, delay) = pwm.release();

        assert_eq!(
            i2c.writes,
            vec![
                (0x40, vec![0x00, 0x10]),
                (0x40, vec![0xFE, 0x79]),
                (0x40, vec![0x00, 0x00]),
                (0x40, vec![0x00, 0xA1]),
            ]
        );
        assert_eq!(delay.total_ns, 15_000_000);
    }

    #[test]
    fn test_channel_register_and_pulse() {
        let mut pwm = Pca9685::new(MockI2c::default(), MockDelay::default()).with_address(0x41);
        pwm.set_channel_angle(Channel::Torso, Angle::NEUTRAL).unwrap();
        let (i2c, _) = pwm.release();

        // Channel 6 starts at 0x06 + 24; 307 = 0x0133.
        assert_eq!(i2c.writes, vec![(0x41, vec![0x1E, 0, 0, 0x33, 0x01])]);
    }

    #[test]
    fn test_missing_chip_maps_to_not_found() {
        let mut pwm = Pca9685::new(
            MockI2c {
                error: Some(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)),
                ..MockI2c::default()
            },
            MockDelay::default(),
        );
        assert_eq!(pwm.init(), Err(ActuatorError::NotFound));
    }

    #[test]
    fn test_bus_fault_maps_to_bus() {
        let mut pwm = Pca9685::new(
            MockI2c {
                error: Some(ErrorKind::ArbitrationLoss),
                ..MockI2c::default()
            },
            MockDelay::default(),
        );
        assert_eq!(
            pwm.set_channel_angle(Channel::EyeH, Angle::MAX),
            Err(ActuatorError::Bus)
        );
    }
}
