//! Toggle record kept in the last 4 KiB flash sector.
//!
//! The sector is reserved in `memory.x`. An erased sector reads as `0xFF`
//! and is reported as [`StoreError::Missing`].

use animatronic_core::{StateStore, StoreError};
use animatronic_proto::{Serialize, ToggleState, MAX_RECORD_SIZE};
use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;

/// Size of the Pico's QSPI flash.
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Offset of the record sector from the start of flash.
pub const RECORD_OFFSET: u32 = (FLASH_SIZE - ERASE_SIZE) as u32;

const ERASED: u8 = 0xFF;

/// [`StateStore`] over the on-board flash.
pub struct FlashStore<'d> {
    flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>,
}

impl<'d> FlashStore<'d> {
    #[must_use]
    pub fn new(flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>) -> Self {
        Self { flash }
    }
}

impl StateStore for FlashStore<'_> {
    fn load(&mut self) -> Result<ToggleState, StoreError> {
        let mut buf = [0u8; MAX_RECORD_SIZE];
        self.flash
            .blocking_read(RECORD_OFFSET, &mut buf)
            .map_err(|_| StoreError::Io)?;

        if buf[0] == ERASED {
            return Err(StoreError::Missing);
        }
        let end = buf
            .iter()
            .position(|&b| b == b'\n')
            .ok_or(StoreError::Corrupt)?;
        Ok(ToggleState::decode(&buf[..=end])?)
    }

    fn save(&mut self, state: &ToggleState) -> Result<(), StoreError> {
        // Unused tail bytes stay erased.
        let mut buf = [ERASED; MAX_RECORD_SIZE];
        state.serialize(&mut buf).map_err(|_| StoreError::Io)?;

        self.flash
            .blocking_erase(RECORD_OFFSET, RECORD_OFFSET + ERASE_SIZE as u32)
            .map_err(|_| StoreError::Io)?;
        self.flash
            .blocking_write(RECORD_OFFSET, &buf)
            .map_err(|_| StoreError::Io)
    }
}
