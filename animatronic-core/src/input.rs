//! Input sampler trait and error types.

/// Analog stick axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    LeftX,
    LeftY,
    RightX,
    RightY,
}

/// Physical buttons on the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// Blink, unlock combo, half of the emergency chord.
    Primary,
    /// Wave toggle, other half of the emergency chord.
    Secondary,
}

/// Error type for sampler reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SamplerError {
    /// ADC conversion failed.
    Adc,
}

impl core::fmt::Display for SamplerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Adc => write!(f, "adc conversion failed"),
        }
    }
}

/// Source of raw stick and button readings.
///
/// Axes read on a nominal 0-4095 scale. Buttons report the raw level with
/// active-low wiring already folded into `true` = pressed; debouncing happens
/// in [`crate::debounce`].
pub trait InputSampler {
    /// Read one stick axis.
    fn read_axis(&mut self, axis: Axis) -> Result<u16, SamplerError>;

    /// Read the raw, undebounced level of a button.
    fn read_button(&mut self, button: Button) -> bool;
}
