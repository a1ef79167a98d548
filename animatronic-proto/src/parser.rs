//! Line parser for frames and toggle records.
//!
//! Accepts the format written by [`crate::serialize`]; a trailing `\n` or
//! `\r\n` is optional and the checksum may use either hex case.

use crate::checksum::checksum;
use crate::fmt::{parse_bool, parse_hex_u8, parse_i16, parse_u16};
use crate::frame::{ControlFrame, Field, FieldSet, FieldValue};
use crate::record::ToggleState;
use crate::serialize::{FRAME_PREFIX, RECORD_PREFIX};

/// Why an inbound line was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Nothing but line terminators.
    Empty,
    /// Wrong or missing prefix byte.
    Prefix,
    /// Checksum missing, malformed, or wrong.
    Checksum,
    /// A pair without a `:` separator.
    Syntax,
    /// Key not part of the format.
    UnknownField,
    /// The same key appeared twice.
    DuplicateField,
    /// Value does not parse for its key.
    Value,
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let reason = match self {
            Self::Empty => "empty line",
            Self::Prefix => "bad prefix",
            Self::Checksum => "checksum mismatch",
            Self::Syntax => "malformed pair",
            Self::UnknownField => "unknown field",
            Self::DuplicateField => "duplicate field",
            Self::Value => "invalid value",
        };
        f.write_str(reason)
    }
}

/// Decode one control frame line.
///
/// # Example
///
/// ```
/// use animatronic_proto::{parse_frame, Command, ControlFrame, Serialize, MAX_FRAME_SIZE};
///
/// let mut buf = [0u8; MAX_FRAME_SIZE];
/// let len = ControlFrame::heartbeat(Some(3)).serialize(&mut buf).unwrap();
///
/// let frame = parse_frame(&buf[..len]).unwrap();
/// assert_eq!(frame.command(), Command::Heartbeat { seq: Some(3) });
/// ```
pub fn parse_frame(line: &[u8]) -> Result<ControlFrame, DecodeError> {
    let payload = verified_payload(line, FRAME_PREFIX)?;

    let mut frame = ControlFrame::empty();
    let mut seen = FieldSet::default();

    for pair in pairs(payload) {
        let (key, raw) = pair?;
        let field = Field::from_key(key).ok_or(DecodeError::UnknownField)?;
        if !seen.insert(field) {
            return Err(DecodeError::DuplicateField);
        }
        let value = parse_value(field, raw).ok_or(DecodeError::Value)?;
        frame.set(field, value);
    }

    Ok(frame)
}

/// Decode one persisted toggle record line.
///
/// Keys missing from an otherwise valid record keep their `false` default.
pub fn parse_record(line: &[u8]) -> Result<ToggleState, DecodeError> {
    let payload = verified_payload(line, RECORD_PREFIX)?;

    let mut state = ToggleState::default();
    let mut seen = [false; 2];

    for pair in pairs(payload) {
        let (key, raw) = pair?;
        let (slot, target) = match key {
            k if k == ToggleState::WAVE_ACTIVE_KEY => (0, &mut state.wave_active),
            k if k == ToggleState::JAW_OPEN_KEY => (1, &mut state.jaw_open),
            _ => return Err(DecodeError::UnknownField),
        };
        if core::mem::replace(&mut seen[slot], true) {
            return Err(DecodeError::DuplicateField);
        }
        *target = parse_bool(raw).ok_or(DecodeError::Value)?;
    }

    Ok(state)
}

fn parse_value(field: Field, raw: &[u8]) -> Option<FieldValue> {
    match field {
        Field::EyeH | Field::EyeV | Field::NeckLr | Field::NeckUd | Field::TorsoRot => {
            parse_i16(raw).map(FieldValue::Degrees)
        }
        Field::Seq => parse_u16(raw).map(FieldValue::Sequence),
        Field::Heartbeat
        | Field::EmergencyStop
        | Field::Unlock
        | Field::EyeBlink
        | Field::WaveActive
        | Field::JawOpen => parse_bool(raw).map(FieldValue::Flag),
    }
}

/// Strip trailing CR and/or LF.
#[inline]
fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Check prefix and checksum, returning the payload between them.
fn verified_payload(line: &[u8], prefix: u8) -> Result<&[u8], DecodeError> {
    let line = strip_line_ending(line);

    let (&first, rest) = line.split_first().ok_or(DecodeError::Empty)?;
    if first != prefix {
        return Err(DecodeError::Prefix);
    }

    let star = rest
        .iter()
        .rposition(|&b| b == b'*')
        .ok_or(DecodeError::Checksum)?;
    let (payload, tail) = (&rest[..star], &rest[star + 1..]);

    let received = parse_hex_u8(tail).ok_or(DecodeError::Checksum)?;
    if checksum(payload) != received {
        return Err(DecodeError::Checksum);
    }

    Ok(payload)
}

/// Split a payload into `key:value` pairs.
fn pairs(payload: &[u8]) -> impl Iterator<Item = Result<(&[u8], &[u8]), DecodeError>> {
    payload
        .split(|&b| b == b',')
        .filter(move |_| !payload.is_empty())
        .map(|pair| {
            let colon = pair
                .iter()
                .position(|&b| b == b':')
                .ok_or(DecodeError::Syntax)?;
            Ok((&pair[..colon], &pair[colon + 1..]))
        })
}
