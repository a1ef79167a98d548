//! Stick-to-position mapping.
//!
//! Raw ADC readings on a nominal 0-4095 scale map linearly onto [0, 180]
//! degrees with a dead zone around center that snaps to neutral.

use animatronic_proto::Positions;

use crate::input::{Axis, InputSampler, SamplerError};
use crate::types::Angle;

/// Conversion from one raw axis reading to an angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisMapping {
    /// Raw reading at rest.
    pub center: u16,
    /// Readings closer to center than this snap to neutral.
    pub dead_zone: u16,
    /// Raw reading at full deflection.
    pub full_scale: u16,
    /// Mirror the output around neutral.
    pub invert: bool,
}

pub const DEFAULT_AXIS_MAPPING: AxisMapping = AxisMapping {
    center: 2048,
    dead_zone: 50,
    full_scale: 4095,
    invert: false,
};

impl Default for AxisMapping {
    fn default() -> Self {
        DEFAULT_AXIS_MAPPING
    }
}

impl AxisMapping {
    #[must_use]
    pub fn map(&self, raw: u16) -> Angle {
        let offset = i32::from(raw) - i32::from(self.center);
        if offset.abs() < i32::from(self.dead_zone) {
            return Angle::NEUTRAL;
        }

        let full_scale = i32::from(self.full_scale.max(1));
        let degrees = i32::from(raw) * 180 / full_scale;
        let degrees = if self.invert { 180 - degrees } else { degrees };
        Angle::clamped(degrees)
    }

    /// Map a sampler result; a failed read holds neutral.
    #[must_use]
    pub fn map_reading(&self, reading: Result<u16, SamplerError>) -> Angle {
        match reading {
            Ok(raw) => self.map(raw),
            Err(e) => {
                debug!("axis read failed: {}", e);
                Angle::NEUTRAL
            }
        }
    }
}

/// A stick axis and how it converts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisBinding {
    pub axis: Axis,
    pub mapping: AxisMapping,
}

impl AxisBinding {
    #[must_use]
    pub const fn new(axis: Axis) -> Self {
        Self {
            axis,
            mapping: DEFAULT_AXIS_MAPPING,
        }
    }

    #[must_use]
    pub const fn inverted(mut self) -> Self {
        self.mapping.invert = !self.mapping.invert;
        self
    }
}

/// Which axis drives which position field. Unbound fields are left out of
/// data frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlMapping {
    pub eye_h: Option<AxisBinding>,
    pub eye_v: Option<AxisBinding>,
    pub neck_lr: Option<AxisBinding>,
    pub neck_ud: Option<AxisBinding>,
    pub torso_rot: Option<AxisBinding>,
}

/// Left stick drives the eyes with the neck following; right stick X turns the torso.
pub const DEFAULT_CONTROL_MAPPING: ControlMapping = ControlMapping {
    eye_h: Some(AxisBinding::new(Axis::LeftX)),
    eye_v: Some(AxisBinding::new(Axis::LeftY)),
    neck_lr: Some(AxisBinding::new(Axis::LeftX)),
    neck_ud: Some(AxisBinding::new(Axis::LeftY)),
    torso_rot: Some(AxisBinding::new(Axis::RightX)),
};

impl Default for ControlMapping {
    fn default() -> Self {
        DEFAULT_CONTROL_MAPPING
    }
}

impl ControlMapping {
    /// Sample every bound axis once and build the position fields.
    pub fn sample<S: InputSampler>(&self, sampler: &mut S) -> Positions {
        let mut readings: [Option<Result<u16, SamplerError>>; 4] = [None; 4];
        let mut position = |binding: Option<AxisBinding>| {
            binding.map(|b| {
                let slot = &mut readings[axis_slot(b.axis)];
                let reading = *slot.get_or_insert_with(|| sampler.read_axis(b.axis));
                i16::from(b.mapping.map_reading(reading))
            })
        };

        Positions {
            eye_h: position(self.eye_h),
            eye_v: position(self.eye_v),
            neck_lr: position(self.neck_lr),
            neck_ud: position(self.neck_ud),
            torso_rot: position(self.torso_rot),
        }
    }
}

const fn axis_slot(axis: Axis) -> usize {
    match axis {
        Axis::LeftX => 0,
        Axis::LeftY => 1,
        Axis::RightX => 2,
        Axis::RightY => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Button;

    struct FixedSampler {
        axes: [Result<u16, SamplerError>; 4],
        reads: usize,
    }

    impl InputSampler for FixedSampler {
        fn read_axis(&mut self, axis: Axis) -> Result<u16, SamplerError> {
            self.reads += 1;
            self.axes[axis_slot(axis)]
        }

        fn read_button(&mut self, _button: Button) -> bool {
            false
        }
    }

    #[test]
    fn test_dead_zone_snaps_to_neutral() {
        let m = DEFAULT_AXIS_MAPPING;
        assert_eq!(m.map(2048), Angle::NEUTRAL);
        assert_eq!(m.map(1999), Angle::NEUTRAL);
        assert_eq!(m.map(2097), Angle::NEUTRAL);
        assert_ne!(m.map(2098), Angle::NEUTRAL);
    }

    #[test]
    fn test_linear_span() {
        let m = DEFAULT_AXIS_MAPPING;
        assert_eq!(m.map(0), Angle::MIN);
        assert_eq!(m.map(4095), Angle::MAX);
        assert_eq!(m.map(1024).degrees(), 45);
        assert_eq!(m.map(u16::MAX), Angle::MAX);
    }

    #[test]
    fn test_inverted_axis() {
        let m = AxisBinding::new(Axis::LeftX).inverted().mapping;
        assert_eq!(m.map(0), Angle::MAX);
        assert_eq!(m.map(4095), Angle::MIN);
        assert_eq!(m.map(2048), Angle::NEUTRAL);
    }

    #[test]
    fn test_failed_read_holds_neutral() {
        let m = DEFAULT_AXIS_MAPPING;
        assert_eq!(m.map_reading(Err(SamplerError::Adc)), Angle::NEUTRAL);
    }

    #[test]
    fn test_default_mapping_samples_each_axis_once() {
        let mut sampler = FixedSampler {
            axes: [Ok(4095), Ok(0), Err(SamplerError::Adc), Ok(4095)],
            reads: 0,
        };
        let positions = DEFAULT_CONTROL_MAPPING.sample(&mut sampler);

        assert_eq!(positions.eye_h, Some(180));
        assert_eq!(positions.neck_lr, Some(180));
        assert_eq!(positions.eye_v, Some(0));
        assert_eq!(positions.neck_ud, Some(0));
        assert_eq!(positions.torso_rot, Some(90));
        assert_eq!(sampler.reads, 3);
    }

    #[test]
    fn test_unbound_fields_are_omitted() {
        let mapping = ControlMapping {
            neck_lr: None,
            neck_ud: None,
            ..DEFAULT_CONTROL_MAPPING
        };
        let mut sampler = FixedSampler {
            axes: [Ok(2048); 4],
            reads: 0,
        };
        let positions = mapping.sample(&mut sampler);

        assert_eq!(positions.neck_lr, None);
        assert_eq!(positions.eye_h, Some(90));
    }
}
