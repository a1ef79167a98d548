//! Persisted toggle state.

use crate::parser::{parse_record, DecodeError};

/// Latched animation toggles that survive a controller power cycle.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ToggleState {
    pub wave_active: bool,
    pub jaw_open: bool,
}

impl ToggleState {
    pub const WAVE_ACTIVE_KEY: &'static [u8] = b"wave_active";
    pub const JAW_OPEN_KEY: &'static [u8] = b"jaw_open";

    /// Both toggles flipped together; the jaw follows the wave.
    #[must_use]
    pub const fn toggled(self) -> Self {
        let wave_active = !self.wave_active;
        Self {
            wave_active,
            jaw_open: wave_active,
        }
    }

    /// Decode a stored record.
    ///
    /// # Errors
    ///
    /// Any [`DecodeError`] from the record parser.
    pub fn decode(line: &[u8]) -> Result<Self, DecodeError> {
        parse_record(line)
    }

    /// Decode a stored record, falling back to defaults when it is missing or corrupt.
    #[must_use]
    pub fn decode_or_default(line: Option<&[u8]>) -> Self {
        line.and_then(|line| Self::decode(line).ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::{Serialize, MAX_RECORD_SIZE};

    #[test]
    fn test_toggled_keeps_jaw_with_wave() {
        let on = ToggleState::default().toggled();
        assert!(on.wave_active && on.jaw_open);

        let off = on.toggled();
        assert_eq!(off, ToggleState::default());

        let skewed = ToggleState {
            wave_active: false,
            jaw_open: true,
        };
        assert_eq!(skewed.toggled(), on);
    }

    #[test]
    fn test_stored_record_restores() {
        let state = ToggleState {
            wave_active: true,
            jaw_open: true,
        };
        let mut buf = [0u8; MAX_RECORD_SIZE];
        let len = state.serialize(&mut buf).unwrap();

        assert_eq!(ToggleState::decode_or_default(Some(&buf[..len])), state);
    }

    #[test]
    fn test_missing_or_corrupt_falls_back() {
        assert_eq!(ToggleState::decode_or_default(None), ToggleState::default());
        assert_eq!(
            ToggleState::decode_or_default(Some(b"Swave_active:1*00\n")),
            ToggleState::default()
        );
        assert_eq!(
            ToggleState::decode_or_default(Some(&[0xFF; 32])),
            ToggleState::default()
        );
    }
}
