//! Control frame: the record carried by every datagram on the link.

/// Neutral actuator position in degrees.
pub const NEUTRAL_DEGREES: i16 = 90;

/// A single key of the key/value wire format.
///
/// The declaration order is the canonical order fields are written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    Heartbeat,
    EmergencyStop,
    Unlock,
    EyeH,
    EyeV,
    NeckLr,
    NeckUd,
    TorsoRot,
    EyeBlink,
    WaveActive,
    JawOpen,
    Seq,
}

impl Field {
    /// Every field, in canonical wire order.
    pub const ALL: [Field; 12] = [
        Field::Heartbeat,
        Field::EmergencyStop,
        Field::Unlock,
        Field::EyeH,
        Field::EyeV,
        Field::NeckLr,
        Field::NeckUd,
        Field::TorsoRot,
        Field::EyeBlink,
        Field::WaveActive,
        Field::JawOpen,
        Field::Seq,
    ];

    /// Wire key for this field.
    #[must_use]
    pub const fn key(self) -> &'static [u8] {
        match self {
            Field::Heartbeat => b"heartbeat",
            Field::EmergencyStop => b"emergency_stop",
            Field::Unlock => b"unlock",
            Field::EyeH => b"eye_h",
            Field::EyeV => b"eye_v",
            Field::NeckLr => b"neck_lr",
            Field::NeckUd => b"neck_ud",
            Field::TorsoRot => b"torso_rot",
            Field::EyeBlink => b"eye_blink",
            Field::WaveActive => b"wave_active",
            Field::JawOpen => b"jaw_open",
            Field::Seq => b"seq",
        }
    }

    /// Look a field up by its wire key.
    #[must_use]
    pub fn from_key(key: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// The five direct position commands, in degrees.
///
/// Values are carried as sent; the puppet clamps them to [0, 180].
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Positions {
    pub eye_h: Option<i16>,
    pub eye_v: Option<i16>,
    pub neck_lr: Option<i16>,
    pub neck_ud: Option<i16>,
    pub torso_rot: Option<i16>,
}

impl Positions {
    /// Every position set to the same angle.
    #[must_use]
    pub const fn uniform(degrees: i16) -> Self {
        Self {
            eye_h: Some(degrees),
            eye_v: Some(degrees),
            neck_lr: Some(degrees),
            neck_ud: Some(degrees),
            torso_rot: Some(degrees),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.eye_h.is_none()
            && self.eye_v.is_none()
            && self.neck_lr.is_none()
            && self.neck_ud.is_none()
            && self.torso_rot.is_none()
    }
}

/// Payload of a data frame: positions plus animation controls.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataFields {
    pub positions: Positions,
    pub eye_blink: Option<bool>,
    pub wave_active: Option<bool>,
    pub jaw_open: Option<bool>,
    pub seq: Option<u16>,
}

/// A decoded frame after classification.
///
/// Control and safety classes take priority over data:
/// heartbeat > emergency stop > unlock > data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Heartbeat { seq: Option<u16> },
    EmergencyStop,
    Unlock,
    Data(DataFields),
}

/// Flat optional-field record, exactly as it travels on the wire.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlFrame {
    pub heartbeat: Option<bool>,
    pub emergency_stop: Option<bool>,
    pub unlock: Option<bool>,
    pub positions: Positions,
    pub eye_blink: Option<bool>,
    pub wave_active: Option<bool>,
    pub jaw_open: Option<bool>,
    pub seq: Option<u16>,
}

/// Value of one field, as read from or written to the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FieldValue {
    Flag(bool),
    Degrees(i16),
    Sequence(u16),
}

impl ControlFrame {
    /// Liveness ping.
    #[must_use]
    pub const fn heartbeat(seq: Option<u16>) -> Self {
        Self {
            heartbeat: Some(true),
            seq,
            ..Self::empty()
        }
    }

    /// Freeze every actuator at neutral and lock the puppet.
    #[must_use]
    pub const fn emergency_stop() -> Self {
        Self {
            emergency_stop: Some(true),
            ..Self::empty()
        }
    }

    /// Leave the locked state.
    #[must_use]
    pub const fn unlock() -> Self {
        Self {
            unlock: Some(true),
            ..Self::empty()
        }
    }

    /// A frame with no fields.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            heartbeat: None,
            emergency_stop: None,
            unlock: None,
            positions: Positions {
                eye_h: None,
                eye_v: None,
                neck_lr: None,
                neck_ud: None,
                torso_rot: None,
            },
            eye_blink: None,
            wave_active: None,
            jaw_open: None,
            seq: None,
        }
    }

    /// Classify the frame by field family.
    #[must_use]
    pub fn command(&self) -> Command {
        if self.heartbeat == Some(true) {
            Command::Heartbeat { seq: self.seq }
        } else if self.emergency_stop == Some(true) {
            Command::EmergencyStop
        } else if self.unlock == Some(true) {
            Command::Unlock
        } else {
            Command::Data(DataFields {
                positions: self.positions,
                eye_blink: self.eye_blink,
                wave_active: self.wave_active,
                jaw_open: self.jaw_open,
                seq: self.seq,
            })
        }
    }

    /// Whether this frame carries the sequence counter (data and heartbeat frames).
    #[must_use]
    pub fn is_sequenced(&self) -> bool {
        matches!(self.command(), Command::Heartbeat { .. } | Command::Data(_))
    }

    /// Read one field.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<FieldValue> {
        match field {
            Field::Heartbeat => self.heartbeat.map(FieldValue::Flag),
            Field::EmergencyStop => self.emergency_stop.map(FieldValue::Flag),
            Field::Unlock => self.unlock.map(FieldValue::Flag),
            Field::EyeH => self.positions.eye_h.map(FieldValue::Degrees),
            Field::EyeV => self.positions.eye_v.map(FieldValue::Degrees),
            Field::NeckLr => self.positions.neck_lr.map(FieldValue::Degrees),
            Field::NeckUd => self.positions.neck_ud.map(FieldValue::Degrees),
            Field::TorsoRot => self.positions.torso_rot.map(FieldValue::Degrees),
            Field::EyeBlink => self.eye_blink.map(FieldValue::Flag),
            Field::WaveActive => self.wave_active.map(FieldValue::Flag),
            Field::JawOpen => self.jaw_open.map(FieldValue::Flag),
            Field::Seq => self.seq.map(FieldValue::Sequence),
        }
    }

    /// Write one field. Returns `false` if the value kind does not match the field.
    pub fn set(&mut self, field: Field, value: FieldValue) -> bool {
        match (field, value) {
            (Field::Heartbeat, FieldValue::Flag(v)) => self.heartbeat = Some(v),
            (Field::EmergencyStop, FieldValue::Flag(v)) => self.emergency_stop = Some(v),
            (Field::Unlock, FieldValue::Flag(v)) => self.unlock = Some(v),
            (Field::EyeH, FieldValue::Degrees(v)) => self.positions.eye_h = Some(v),
            (Field::EyeV, FieldValue::Degrees(v)) => self.positions.eye_v = Some(v),
            (Field::NeckLr, FieldValue::Degrees(v)) => self.positions.neck_lr = Some(v),
            (Field::NeckUd, FieldValue::Degrees(v)) => self.positions.neck_ud = Some(v),
            (Field::TorsoRot, FieldValue::Degrees(v)) => self.positions.torso_rot = Some(v),
            (Field::EyeBlink, FieldValue::Flag(v)) => self.eye_blink = Some(v),
            (Field::WaveActive, FieldValue::Flag(v)) => self.wave_active = Some(v),
            (Field::JawOpen, FieldValue::Flag(v)) => self.jaw_open = Some(v),
            (Field::Seq, FieldValue::Sequence(v)) => self.seq = Some(v),
            _ => return false,
        }
        true
    }

    /// Present fields, in canonical order.
    pub fn fields(&self) -> impl Iterator<Item = (Field, FieldValue)> + '_ {
        Field::ALL
            .into_iter()
            .filter_map(move |field| self.get(field).map(|value| (field, value)))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields().next().is_none()
    }
}

/// Tracks which fields have been seen while decoding.
#[derive(Clone, Copy, Default)]
pub(crate) struct FieldSet(u16);

impl FieldSet {
    /// Mark `field` as seen. Returns `false` if it was already present.
    pub(crate) fn insert(&mut self, field: Field) -> bool {
        let fresh = self.0 & field.bit() == 0;
        self.0 |= field.bit();
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_keys_are_unique_and_resolvable() {
        for field in Field::ALL {
            assert_eq!(Field::from_key(field.key()), Some(field));
        }
        assert_eq!(Field::from_key(b"eye_x"), None);
    }

    #[test]
    fn test_heartbeat_wins_over_everything() {
        let frame = ControlFrame {
            heartbeat: Some(true),
            emergency_stop: Some(true),
            unlock: Some(true),
            positions: Positions::uniform(10),
            seq: Some(4),
            ..ControlFrame::default()
        };
        assert_eq!(frame.command(), Command::Heartbeat { seq: Some(4) });
    }

    #[test]
    fn test_emergency_wins_over_unlock_and_data() {
        let frame = ControlFrame {
            emergency_stop: Some(true),
            unlock: Some(true),
            positions: Positions::uniform(10),
            ..ControlFrame::default()
        };
        assert_eq!(frame.command(), Command::EmergencyStop);
    }

    #[test]
    fn test_false_flags_fall_through_to_data() {
        let frame = ControlFrame {
            heartbeat: Some(false),
            emergency_stop: Some(false),
            unlock: Some(false),
            eye_blink: Some(true),
            ..ControlFrame::default()
        };
        match frame.command() {
            Command::Data(data) => assert_eq!(data.eye_blink, Some(true)),
            other => panic!("unexpected class {:?}", other),
        }
    }

    #[test]
    fn test_sequenced_classes() {
        assert!(ControlFrame::heartbeat(None).is_sequenced());
        assert!(ControlFrame::default().is_sequenced());
        assert!(!ControlFrame::emergency_stop().is_sequenced());
        assert!(!ControlFrame::unlock().is_sequenced());
    }

    #[test]
    fn test_set_rejects_mismatched_value_kind() {
        let mut frame = ControlFrame::empty();
        assert!(!frame.set(Field::EyeH, FieldValue::Flag(true)));
        assert!(frame.set(Field::EyeH, FieldValue::Degrees(45)));
        assert_eq!(frame.positions.eye_h, Some(45));
    }

    #[test]
    fn test_fields_follow_canonical_order() {
        let frame = ControlFrame {
            seq: Some(1),
            positions: Positions {
                torso_rot: Some(5),
                ..Positions::default()
            },
            heartbeat: Some(true),
            ..ControlFrame::default()
        };
        let mut fields = frame.fields().map(|(field, _)| field);
        assert_eq!(fields.next(), Some(Field::Heartbeat));
        assert_eq!(fields.next(), Some(Field::TorsoRot));
        assert_eq!(fields.next(), Some(Field::Seq));
        assert_eq!(fields.next(), None);
    }
}
