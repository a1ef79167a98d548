//! Stick and button sampling on the controller.
//!
//! # Pins
//!
//! - GPIO 26 (ADC0): left stick X
//! - GPIO 27 (ADC1): left stick Y
//! - GPIO 28 (ADC2): right stick X
//! - GPIO 14: primary button, active low
//! - GPIO 15: secondary button, active low
//!
//! The right stick's Y axis is not wired and always reads centered.

use animatronic_core::{Axis, Button, InputSampler, SamplerError, DEFAULT_AXIS_MAPPING};
use embassy_rp::adc::{Adc, Async, Channel};
use embassy_rp::gpio::Input;

/// ADC sticks plus pulled-up buttons.
pub struct StickSampler<'d> {
    adc: Adc<'d, Async>,
    left_x: Channel<'d>,
    left_y: Channel<'d>,
    right_x: Channel<'d>,
    primary: Input<'d>,
    secondary: Input<'d>,
}

impl<'d> StickSampler<'d> {
    #[must_use]
    pub fn new(
        adc: Adc<'d, Async>,
        left_x: Channel<'d>,
        left_y: Channel<'d>,
        right_x: Channel<'d>,
        primary: Input<'d>,
        secondary: Input<'d>,
    ) -> Self {
        Self {
            adc,
            left_x,
            left_y,
            right_x,
            primary,
            secondary,
        }
    }
}

impl InputSampler for StickSampler<'_> {
    fn read_axis(&mut self, axis: Axis) -> Result<u16, SamplerError> {
        let channel = match axis {
            Axis::LeftX => &mut self.left_x,
            Axis::LeftY => &mut self.left_y,
            Axis::RightX => &mut self.right_x,
            Axis::RightY => return Ok(DEFAULT_AXIS_MAPPING.center),
        };
        self.adc.blocking_read(channel).map_err(|_| SamplerError::Adc)
    }

    #[inline]
    fn read_button(&mut self, button: Button) -> bool {
        match button {
            Button::Primary => self.primary.is_low(),
            Button::Secondary => self.secondary.is_low(),
        }
    }
}
