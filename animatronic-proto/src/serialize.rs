//! Line serialization for frames and toggle records.
//!
//! # Format
//!
//! ```text
//! <prefix><key>:<value>,<key>:<value>*<checksum>\n
//! ```
//!
//! Only present fields are written, in canonical order. The checksum covers
//! everything between the prefix and `*`.
//!
//! # Example
//!
//! ```
//! use animatronic_proto::{ControlFrame, Serialize, MAX_FRAME_SIZE};
//!
//! let mut buf = [0u8; MAX_FRAME_SIZE];
//! let len = ControlFrame::unlock().serialize(&mut buf).unwrap();
//! assert!(buf[..len].starts_with(b"Funlock:1*"));
//! ```

use crate::checksum::ChecksumDigest;
use crate::fmt::{write_hex_u8, write_i16, write_u16};
use crate::frame::{ControlFrame, FieldValue};
use crate::record::ToggleState;

/// Prefix byte of a control frame line.
pub const FRAME_PREFIX: u8 = b'F';

/// Prefix byte of a persisted toggle record line.
pub const RECORD_PREFIX: u8 = b'S';

/// Largest encoded control frame.
///
/// Every field present with its widest value takes 162 bytes; the rest is
/// headroom for the transport's own framing.
pub const MAX_FRAME_SIZE: usize = 192;

/// Largest encoded toggle record: `Swave_active:1,jaw_open:1*XX\n` is 29 bytes.
pub const MAX_RECORD_SIZE: usize = 32;

/// Error type for serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerializeError {
    /// The output buffer cannot hold the largest possible line.
    BufferTooSmall,
    /// The writer rejected the output.
    WriteError,
}

impl core::fmt::Display for SerializeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::WriteError => write!(f, "write error"),
        }
    }
}

/// Writes `key:value` pairs into a buffer while accumulating the checksum.
struct LineWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
    digest: ChecksumDigest,
    pairs: usize,
}

impl<'a> LineWriter<'a> {
    fn new(buf: &'a mut [u8], prefix: u8) -> Self {
        buf[0] = prefix;
        Self {
            buf,
            pos: 1,
            digest: ChecksumDigest::new(),
            pairs: 0,
        }
    }

    fn write(&mut self, bytes: &[u8]) {
        let end = self.pos + bytes.len();
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.digest.update(bytes);
        self.pos = end;
    }

    fn pair(&mut self, key: &[u8], value: FieldValue) {
        if self.pairs > 0 {
            self.write(b",");
        }
        self.write(key);
        self.write(b":");

        let mut tmp = [0u8; 6];
        let len = match value {
            FieldValue::Flag(flag) => {
                tmp[0] = if flag { b'1' } else { b'0' };
                1
            }
            FieldValue::Degrees(degrees) => write_i16(&mut tmp, degrees),
            FieldValue::Sequence(seq) => write_u16(&mut tmp, seq),
        };
        self.write(&tmp[..len]);
        self.pairs += 1;
    }

    /// Append `*<checksum>\n` and return the total line length.
    fn finish(self) -> usize {
        let checksum = self.digest.finalize();
        let mut pos = self.pos;
        self.buf[pos] = b'*';
        pos += 1;
        pos += write_hex_u8(&mut self.buf[pos..], checksum);
        self.buf[pos] = b'\n';
        pos + 1
    }
}

/// Serialization into the line format.
pub trait Serialize {
    /// Buffer size that always fits this value.
    const MAX_SIZE: usize;

    /// Serialize into `buf`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// [`SerializeError::BufferTooSmall`] if `buf` is shorter than [`Self::MAX_SIZE`].
    fn serialize(&self, buf: &mut [u8]) -> Result<usize, SerializeError>;

    /// Serialize into a `heapless::Vec`.
    ///
    /// # Errors
    ///
    /// [`SerializeError::BufferTooSmall`] if `N` is too small.
    #[cfg(feature = "heapless")]
    fn serialize_to_vec<const N: usize>(&self) -> Result<heapless::Vec<u8, N>, SerializeError> {
        let mut vec = heapless::Vec::new();
        vec.resize(N, 0)
            .map_err(|_| SerializeError::BufferTooSmall)?;
        let len = self.serialize(&mut vec)?;
        vec.truncate(len);
        Ok(vec)
    }

    /// Serialize into a `core::fmt::Write` sink such as `heapless::String`.
    ///
    /// # Errors
    ///
    /// [`SerializeError::WriteError`] if the sink rejects the text.
    fn serialize_fmt<W: core::fmt::Write>(&self, writer: &mut W) -> Result<(), SerializeError>;
}

impl Serialize for ControlFrame {
    const MAX_SIZE: usize = MAX_FRAME_SIZE;

    fn serialize(&self, buf: &mut [u8]) -> Result<usize, SerializeError> {
        if buf.len() < Self::MAX_SIZE {
            return Err(SerializeError::BufferTooSmall);
        }

        let mut line = LineWriter::new(buf, FRAME_PREFIX);
        for (field, value) in self.fields() {
            line.pair(field.key(), value);
        }
        Ok(line.finish())
    }

    fn serialize_fmt<W: core::fmt::Write>(&self, writer: &mut W) -> Result<(), SerializeError> {
        let mut buf = [0u8; MAX_FRAME_SIZE];
        let len = self.serialize(&mut buf)?;
        write_line(writer, &buf[..len])
    }
}

impl Serialize for ToggleState {
    const MAX_SIZE: usize = MAX_RECORD_SIZE;

    fn serialize(&self, buf: &mut [u8]) -> Result<usize, SerializeError> {
        if buf.len() < Self::MAX_SIZE {
            return Err(SerializeError::BufferTooSmall);
        }

        let mut line = LineWriter::new(buf, RECORD_PREFIX);
        line.pair(ToggleState::WAVE_ACTIVE_KEY, FieldValue::Flag(self.wave_active));
        line.pair(ToggleState::JAW_OPEN_KEY, FieldValue::Flag(self.jaw_open));
        Ok(line.finish())
    }

    fn serialize_fmt<W: core::fmt::Write>(&self, writer: &mut W) -> Result<(), SerializeError> {
        let mut buf = [0u8; MAX_RECORD_SIZE];
        let len = self.serialize(&mut buf)?;
        write_line(writer, &buf[..len])
    }
}

fn write_line<W: core::fmt::Write>(writer: &mut W, line: &[u8]) -> Result<(), SerializeError> {
    let text = core::str::from_utf8(line).map_err(|_| SerializeError::WriteError)?;
    writer.write_str(text).map_err(|_| SerializeError::WriteError)
}
