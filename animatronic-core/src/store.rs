//! Persistence of the controller's toggle state.

use animatronic_proto::{DecodeError, Serialize, ToggleState, MAX_RECORD_SIZE};

/// Error type for state store operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Nothing has been stored yet.
    Missing,
    /// Stored record did not decode.
    Corrupt,
    /// Storage medium failed.
    Io,
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Missing => write!(f, "no stored state"),
            Self::Corrupt => write!(f, "stored state corrupt"),
            Self::Io => write!(f, "storage i/o error"),
        }
    }
}

impl From<DecodeError> for StoreError {
    fn from(_: DecodeError) -> Self {
        StoreError::Corrupt
    }
}

/// Persistent home of the wave/jaw toggles.
pub trait StateStore {
    fn load(&mut self) -> Result<ToggleState, StoreError>;

    fn save(&mut self, state: &ToggleState) -> Result<(), StoreError>;
}

/// Load the stored toggles, falling back to defaults on any failure.
pub fn restore<S: StateStore>(store: &mut S) -> ToggleState {
    match store.load() {
        Ok(state) => {
            info!("restored toggles: wave={} jaw={}", state.wave_active, state.jaw_open);
            state
        }
        Err(e) => {
            warn!("toggle state unavailable ({}), using defaults", e);
            ToggleState::default()
        }
    }
}

/// RAM-only store holding the encoded record. Contents are lost on reset.
pub struct VolatileStore {
    record: [u8; MAX_RECORD_SIZE],
    len: usize,
}

impl VolatileStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            record: [0; MAX_RECORD_SIZE],
            len: 0,
        }
    }

    /// The stored record line, if any.
    #[must_use]
    pub fn record(&self) -> Option<&[u8]> {
        (self.len > 0).then(|| &self.record[..self.len])
    }
}

impl Default for VolatileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore for VolatileStore {
    fn load(&mut self) -> Result<ToggleState, StoreError> {
        let record = self.record().ok_or(StoreError::Missing)?;
        Ok(ToggleState::decode(record)?)
    }

    fn save(&mut self, state: &ToggleState) -> Result<(), StoreError> {
        self.len = state
            .serialize(&mut self.record)
            .map_err(|_| StoreError::Io)?;
        Ok(())
    }
}
