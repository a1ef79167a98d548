//! CRC-8 integrity check for frames and records.
//!
//! Every encoded line ends in `*XX` where `XX` is the CRC-8/SMBUS of the
//! payload bytes between the prefix and the `*`. The radio links this codec
//! runs over drop bits silently, so a frame is never acted upon unless the
//! checksum matches.

use crc::{Crc, CRC_8_SMBUS};

static CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);

/// CRC-8/SMBUS of a complete payload.
#[inline]
#[must_use]
pub fn checksum(payload: &[u8]) -> u8 {
    CRC8.checksum(payload)
}

/// Running checksum, fed while a line is being written.
pub struct ChecksumDigest {
    digest: crc::Digest<'static, u8>,
}

impl ChecksumDigest {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            digest: CRC8.digest(),
        }
    }

    #[inline]
    pub fn update(&mut self, bytes: &[u8]) {
        self.digest.update(bytes);
    }

    #[inline]
    #[must_use]
    pub fn finalize(self) -> u8 {
        self.digest.finalize()
    }
}

impl Default for ChecksumDigest {
    fn default() -> Self {
        Self::new()
    }
}
