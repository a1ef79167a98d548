//! Fluent construction of data frames.
//!
//! # Example
//!
//! ```
//! use animatronic_proto::{FrameBuilder, MAX_FRAME_SIZE};
//!
//! let mut buf = [0u8; MAX_FRAME_SIZE];
//! let len = FrameBuilder::data()
//!     .eyes(120, 60)
//!     .neck(120, 60)
//!     .torso(90)
//!     .wave(true)
//!     .seq(42)
//!     .serialize(&mut buf)
//!     .unwrap();
//! assert!(buf[..len].starts_with(b"Feye_h:120,eye_v:60,"));
//! ```

use crate::frame::ControlFrame;
use crate::serialize::{Serialize, SerializeError};

/// Builder for data frames. Fields that are never set are omitted on the wire.
#[derive(Debug, Clone, Default)]
pub struct FrameBuilder {
    frame: ControlFrame,
}

impl FrameBuilder {
    /// Start an empty data frame.
    #[must_use]
    pub const fn data() -> Self {
        Self {
            frame: ControlFrame::empty(),
        }
    }

    #[must_use]
    pub fn eyes(mut self, horizontal: i16, vertical: i16) -> Self {
        self.frame.positions.eye_h = Some(horizontal);
        self.frame.positions.eye_v = Some(vertical);
        self
    }

    #[must_use]
    pub fn neck(mut self, left_right: i16, up_down: i16) -> Self {
        self.frame.positions.neck_lr = Some(left_right);
        self.frame.positions.neck_ud = Some(up_down);
        self
    }

    #[must_use]
    pub fn torso(mut self, rotation: i16) -> Self {
        self.frame.positions.torso_rot = Some(rotation);
        self
    }

    /// Request a single blink.
    #[must_use]
    pub fn blink(mut self) -> Self {
        self.frame.eye_blink = Some(true);
        self
    }

    #[must_use]
    pub fn wave(mut self, active: bool) -> Self {
        self.frame.wave_active = Some(active);
        self
    }

    #[must_use]
    pub fn jaw(mut self, open: bool) -> Self {
        self.frame.jaw_open = Some(open);
        self
    }

    #[must_use]
    pub fn seq(mut self, seq: u16) -> Self {
        self.frame.seq = Some(seq);
        self
    }

    /// Get the frame without serializing.
    #[must_use]
    pub fn build(self) -> ControlFrame {
        self.frame
    }

    /// Serialize into `buf`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// [`SerializeError::BufferTooSmall`] if the buffer is too small.
    pub fn serialize(self, buf: &mut [u8]) -> Result<usize, SerializeError> {
        self.frame.serialize(buf)
    }

    /// Serialize to a `heapless::Vec`.
    #[cfg(feature = "heapless")]
    pub fn serialize_to_vec<const N: usize>(self) -> Result<heapless::Vec<u8, N>, SerializeError> {
        self.frame.serialize_to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Command, Positions};
    use crate::parser::parse_frame;
    use crate::serialize::MAX_FRAME_SIZE;

    #[test]
    fn test_builder_sets_only_requested_fields() {
        let frame = FrameBuilder::data().torso(45).blink().build();

        assert_eq!(frame.positions.torso_rot, Some(45));
        assert_eq!(frame.positions.eye_h, None);
        assert_eq!(frame.eye_blink, Some(true));
        assert_eq!(frame.wave_active, None);
        assert_eq!(frame.seq, None);
    }

    #[test]
    fn test_built_frame_is_a_data_frame() {
        let mut buf = [0u8; MAX_FRAME_SIZE];
        let len = FrameBuilder::data()
            .eyes(10, 20)
            .neck(10, 20)
            .torso(30)
            .wave(false)
            .jaw(false)
            .seq(7)
            .serialize(&mut buf)
            .unwrap();

        match parse_frame(&buf[..len]).unwrap().command() {
            Command::Data(data) => {
                assert_eq!(
                    data.positions,
                    Positions {
                        eye_h: Some(10),
                        eye_v: Some(20),
                        neck_lr: Some(10),
                        neck_ud: Some(20),
                        torso_rot: Some(30),
                    }
                );
                assert_eq!(data.seq, Some(7));
                assert_eq!(data.jaw_open, Some(false));
            }
            other => panic!("unexpected class {:?}", other),
        }
    }

    #[cfg(feature = "heapless")]
    #[test]
    fn test_serialize_to_vec() {
        let line = FrameBuilder::data().blink().serialize_to_vec::<MAX_FRAME_SIZE>().unwrap();
        assert!(line.starts_with(b"Feye_blink:1*"));
        assert_eq!(line.last(), Some(&b'\n'));

        assert_eq!(
            FrameBuilder::data().serialize_to_vec::<8>(),
            Err(SerializeError::BufferTooSmall)
        );
    }
}
