//! Control frame types, parsing, and serialization for the animatronic link.
//!
//! The controller and the puppet exchange one frame per datagram:
//!
//! - **Types**
//!   - [`ControlFrame`] - flat optional-field record as it travels
//!   - [`Command`] - a frame classified as heartbeat, emergency stop, unlock, or data
//!   - [`ToggleState`] - persisted wave/jaw toggles
//!
//! - **Parsing**
//!   - [`parse_frame()`] - decode and verify a frame line
//!   - [`parse_record()`] - decode a stored toggle record
//!
//! - **Serialization**
//!   - [`Serialize`] trait
//!   - [`FrameBuilder`] - fluent data frame builder
//!
//! # Frame Format
//!
//! ```text
//! F<key>:<value>,<key>:<value>*<checksum>\n
//! ```
//!
//! - `F` - frame prefix (`S` for toggle records)
//! - keys - `heartbeat`, `emergency_stop`, `unlock`, `eye_h`, `eye_v`,
//!   `neck_lr`, `neck_ud`, `torso_rot`, `eye_blink`, `wave_active`,
//!   `jaw_open`, `seq`
//! - flags are `1`/`0`, positions signed decimal degrees, `seq` unsigned 16-bit
//! - `checksum` - 2 hex digits, CRC-8/SMBUS of the bytes between prefix and `*`
//!
//! # Example
//!
//! ```
//! use animatronic_proto::{parse_frame, Command, FrameBuilder, MAX_FRAME_SIZE};
//!
//! let mut buf = [0u8; MAX_FRAME_SIZE];
//! let len = FrameBuilder::data().torso(135).seq(1).serialize(&mut buf).unwrap();
//!
//! match parse_frame(&buf[..len]).unwrap().command() {
//!     Command::Data(data) => assert_eq!(data.positions.torso_rot, Some(135)),
//!     _ => unreachable!(),
//! }
//! ```
//!
//! # Features
//!
//! - **`std`**: standard library support (for host testing)
//! - **`defmt`**: defmt formatting (for embedded logging)
//! - **`heapless`**: `serialize_to_vec()` methods

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod builder;
pub mod checksum;
mod fmt;
pub mod frame;
pub mod parser;
pub mod record;
pub mod serialize;

pub use builder::FrameBuilder;
pub use checksum::{checksum, ChecksumDigest};
pub use frame::{Command, ControlFrame, DataFields, Field, FieldValue, Positions, NEUTRAL_DEGREES};
pub use parser::{parse_frame, parse_record, DecodeError};
pub use record::ToggleState;
pub use serialize::{
    Serialize, SerializeError, FRAME_PREFIX, MAX_FRAME_SIZE, MAX_RECORD_SIZE, RECORD_PREFIX,
};
