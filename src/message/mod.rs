#![doc = r#"
Structured MIDI messages and the wire codec.

[`MidiMessage`] is a closed sum over the recognized channel and system
message kinds, one variant per wire layout. [`MidiMessage::encode`]
produces the raw byte form and [`MidiMessage::decode`] reverses it; the
two are inverses for every kind except note off, which deliberately
shares the note-on status family (`9n` with zero velocity) on the wire.

# Example
```rust
use midiwire::message::MidiMessage;

let msg = MidiMessage::Pitchbend { chan: 1, value: 5888 };
let raw = msg.encode().unwrap();

assert_eq!(raw, [0xE1, 0x00, 0x2E]);
assert_eq!(MidiMessage::decode(&raw).unwrap(), msg);
```
"#]

mod status;
pub use status::*;

use thiserror::Error;

/// An error produced while decoding raw bytes, or while validating
/// fields during encoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The first byte is not a recognized status byte.
    #[error("unknown status byte 0x{0:02X}")]
    UnknownStatus(u8),
    /// Fewer data bytes than the status demands, or an unterminated sysex.
    #[error("truncated message")]
    Truncated,
    /// A numeric field is outside the range its wire layout can carry.
    #[error("field `{0}` out of range")]
    FieldOutOfRange(&'static str),
    /// Bytes were left over after a complete message.
    #[error("{0} trailing byte(s) after a complete message")]
    TrailingData(usize),
}

#[doc = r#"
A single MIDI channel or system message.

Channel fields (`chan`) are in `0..=15`; seven-bit data fields (`note`,
`velocity`, `pressure`, `number`, `value`, `program`) are in `0..=127`;
the pitchbend `value` is 14-bit, `0..=16383`. [`MidiMessage::encode`]
checks these ranges defensively.

With the `serde` feature enabled, messages (de)serialize as a mapping
with a `type` field naming the kind, e.g.
`{"type": "noteOn", "chan": 0, "note": 60, "velocity": 69}`.
"#]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "camelCase"))]
pub enum MidiMessage {
    /// Key pressed: status `9n`, data `note, velocity`
    NoteOn {
        /// Channel, 0-15
        chan: u8,
        /// Key number, 0-127
        note: u8,
        /// Strike velocity, 1-127 (zero would read back as a note off)
        velocity: u8,
    },
    /// Key released. Travels as `9n note 00`; `velocity` is carried for
    /// symmetry but always encodes to zero.
    NoteOff {
        /// Channel, 0-15
        chan: u8,
        /// Key number, 0-127
        note: u8,
        /// Release velocity; forced to zero on the wire
        velocity: u8,
    },
    /// Channel pressure: status `Dn`, data `pressure`
    Aftertouch {
        /// Channel, 0-15
        chan: u8,
        /// Pressure amount, 0-127
        pressure: u8,
    },
    /// Control change: status `Bn`, data `number, value`
    Control {
        /// Channel, 0-15
        chan: u8,
        /// Controller number, 0-127
        number: u8,
        /// Controller value, 0-127
        value: u8,
    },
    /// Program change: status `Cn`, data `program`
    Program {
        /// Channel, 0-15
        chan: u8,
        /// Program number, 0-127
        program: u8,
    },
    /// Pitch bend: status `En`, 14-bit value as LSB then MSB
    Pitchbend {
        /// Channel, 0-15
        chan: u8,
        /// Bend amount, 0-16383 (8192 is center)
        value: u16,
    },
    /// System exclusive: `F0`, vendor data bytes, `F7`.
    ///
    /// `data` holds the interior bytes only; the framing bytes are added
    /// by [`encode`](Self::encode) and stripped by [`decode`](Self::decode).
    /// A leading `F0`/trailing `F7` already present in `data` is tolerated
    /// and normalized away when encoding.
    Sysex {
        /// Interior data bytes, each 0-127
        data: Vec<u8>,
    },
    /// Song position pointer: status `F2`, one data byte.
    ///
    /// The standard defines a 14-bit two-byte position; this codec keeps
    /// the observed single-byte form.
    SongPointer {
        /// Position, 0-127
        value: u8,
    },
    /// Song select: status `F3`, one data byte
    SongSelect {
        /// Song number, 0-127
        value: u8,
    },
    /// Tune request, status `F6` only
    TuneRequest,
    /// Timing clock, status `F8` only
    Clock,
    /// Start, status `FA` only
    Start,
    /// Continue, status `FB` only
    Continue,
    /// Stop, status `FC` only
    Stop,
    /// Active sensing, status `FE` only
    ActiveSense,
    /// System reset, status `FF` only
    Reset,
}

/// Builds a channel status byte, checking the channel range.
const fn status_byte(kind: ChannelStatus, chan: u8) -> Result<u8, DecodeError> {
    if chan > 0x0F {
        return Err(DecodeError::FieldOutOfRange("chan"));
    }
    Ok(((kind as u8) << 4) | chan)
}

/// Checks that a data byte fits in seven bits.
const fn data_byte(field: &'static str, value: u8) -> Result<u8, DecodeError> {
    if value > 0x7F {
        return Err(DecodeError::FieldOutOfRange(field));
    }
    Ok(value)
}

/// Strips optional sysex framing from caller-supplied data.
fn sysex_interior(data: &[u8]) -> &[u8] {
    let data = data.strip_prefix(&[SYSEX_START]).unwrap_or(data);
    data.strip_suffix(&[SYSEX_END]).unwrap_or(data)
}

/// Splits fixed-length message data, rejecting short and long input.
fn data_bytes<const N: usize>(data: &[u8]) -> Result<[u8; N], DecodeError> {
    if data.len() < N {
        return Err(DecodeError::Truncated);
    }
    if data.len() > N {
        return Err(DecodeError::TrailingData(data.len() - N));
    }
    let mut out = [0u8; N];
    for (slot, &byte) in out.iter_mut().zip(data) {
        // a set high bit here is a new status byte, so the message ended early
        if byte > 0x7F {
            return Err(DecodeError::Truncated);
        }
        *slot = byte;
    }
    Ok(out)
}

impl MidiMessage {
    /// Encodes this message into its raw wire bytes.
    ///
    /// # Errors
    /// [`DecodeError::FieldOutOfRange`] when a field does not fit its wire
    /// layout. Upstream callers are expected to validate; this is checked
    /// again here.
    pub fn encode(&self) -> Result<Vec<u8>, DecodeError> {
        use MidiMessage::*;
        Ok(match self {
            NoteOn {
                chan,
                note,
                velocity,
            } => vec![
                status_byte(ChannelStatus::NoteOn, *chan)?,
                data_byte("note", *note)?,
                data_byte("velocity", *velocity)?,
            ],
            // note off shares the note-on family, velocity pinned to zero
            NoteOff { chan, note, .. } => vec![
                status_byte(ChannelStatus::NoteOn, *chan)?,
                data_byte("note", *note)?,
                0x00,
            ],
            Aftertouch { chan, pressure } => vec![
                status_byte(ChannelStatus::Aftertouch, *chan)?,
                data_byte("pressure", *pressure)?,
            ],
            Control {
                chan,
                number,
                value,
            } => vec![
                status_byte(ChannelStatus::Control, *chan)?,
                data_byte("number", *number)?,
                data_byte("value", *value)?,
            ],
            Program { chan, program } => vec![
                status_byte(ChannelStatus::Program, *chan)?,
                data_byte("program", *program)?,
            ],
            Pitchbend { chan, value } => {
                if *value > 0x3FFF {
                    return Err(DecodeError::FieldOutOfRange("value"));
                }
                vec![
                    status_byte(ChannelStatus::PitchBend, *chan)?,
                    (value & 0x7F) as u8,
                    ((value >> 7) & 0x7F) as u8,
                ]
            }
            Sysex { data } => {
                let interior = sysex_interior(data);
                let mut raw = Vec::with_capacity(interior.len() + 2);
                raw.push(SYSEX_START);
                for &byte in interior {
                    raw.push(data_byte("data", byte)?);
                }
                raw.push(SYSEX_END);
                raw
            }
            SongPointer { value } => {
                vec![SystemStatus::SongPointer.into(), data_byte("value", *value)?]
            }
            SongSelect { value } => {
                vec![SystemStatus::SongSelect.into(), data_byte("value", *value)?]
            }
            TuneRequest => vec![SystemStatus::TuneRequest.into()],
            Clock => vec![SystemStatus::Clock.into()],
            Start => vec![SystemStatus::Start.into()],
            Continue => vec![SystemStatus::Continue.into()],
            Stop => vec![SystemStatus::Stop.into()],
            ActiveSense => vec![SystemStatus::ActiveSense.into()],
            Reset => vec![SystemStatus::Reset.into()],
        })
    }

    /// Decodes exactly one message from raw wire bytes.
    ///
    /// # Errors
    /// - [`DecodeError::UnknownStatus`] for a leading byte outside the
    ///   recognized status table
    /// - [`DecodeError::Truncated`] for short input or an unterminated sysex
    /// - [`DecodeError::TrailingData`] for bytes past the end of a complete
    ///   fixed-length message
    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let (&status, data) = raw.split_first().ok_or(DecodeError::Truncated)?;

        if status >= 0xF0 {
            return Self::decode_system(status, data);
        }
        if status < 0x80 {
            return Err(DecodeError::UnknownStatus(status));
        }

        let kind = ChannelStatus::try_from(status >> 4)
            .map_err(|_| DecodeError::UnknownStatus(status))?;
        let chan = status & 0x0F;

        use MidiMessage::*;
        Ok(match kind {
            ChannelStatus::NoteOn => {
                let [note, velocity] = data_bytes(data)?;
                if velocity == 0 {
                    NoteOff {
                        chan,
                        note,
                        velocity,
                    }
                } else {
                    NoteOn {
                        chan,
                        note,
                        velocity,
                    }
                }
            }
            ChannelStatus::Control => {
                let [number, value] = data_bytes(data)?;
                Control {
                    chan,
                    number,
                    value,
                }
            }
            ChannelStatus::Program => {
                let [program] = data_bytes(data)?;
                Program { chan, program }
            }
            ChannelStatus::Aftertouch => {
                let [pressure] = data_bytes(data)?;
                Aftertouch { chan, pressure }
            }
            ChannelStatus::PitchBend => {
                let [lsb, msb] = data_bytes(data)?;
                Pitchbend {
                    chan,
                    value: lsb as u16 | ((msb as u16) << 7),
                }
            }
        })
    }

    fn decode_system(status: u8, data: &[u8]) -> Result<Self, DecodeError> {
        let kind =
            SystemStatus::try_from(status).map_err(|_| DecodeError::UnknownStatus(status))?;

        use MidiMessage::*;
        Ok(match kind {
            SystemStatus::SysexStart => {
                let (&last, interior) = data.split_last().ok_or(DecodeError::Truncated)?;
                if last != SYSEX_END {
                    return Err(DecodeError::Truncated);
                }
                // an interior byte with the high bit set ends the message early
                if interior.iter().any(|&byte| byte > 0x7F) {
                    return Err(DecodeError::Truncated);
                }
                Sysex {
                    data: interior.to_vec(),
                }
            }
            // a terminator cannot lead a message
            SystemStatus::SysexEnd => return Err(DecodeError::UnknownStatus(status)),
            SystemStatus::SongPointer => {
                let [value] = data_bytes(data)?;
                SongPointer { value }
            }
            SystemStatus::SongSelect => {
                let [value] = data_bytes(data)?;
                SongSelect { value }
            }
            SystemStatus::TuneRequest => Self::status_only(TuneRequest, data)?,
            SystemStatus::Clock => Self::status_only(Clock, data)?,
            SystemStatus::Start => Self::status_only(Start, data)?,
            SystemStatus::Continue => Self::status_only(Continue, data)?,
            SystemStatus::Stop => Self::status_only(Stop, data)?,
            SystemStatus::ActiveSense => Self::status_only(ActiveSense, data)?,
            SystemStatus::Reset => Self::status_only(Reset, data)?,
        })
    }

    fn status_only(msg: Self, data: &[u8]) -> Result<Self, DecodeError> {
        if !data.is_empty() {
            return Err(DecodeError::TrailingData(data.len()));
        }
        Ok(msg)
    }
}

#[test]
fn note_off_forces_zero_velocity_on_the_wire() {
    let msg = MidiMessage::NoteOff {
        chan: 3,
        note: 60,
        velocity: 100,
    };
    assert_eq!(msg.encode().unwrap(), [0x93, 0x3C, 0x00]);
}

#[test]
fn channel_out_of_range_is_caught() {
    let msg = MidiMessage::NoteOn {
        chan: 16,
        note: 60,
        velocity: 1,
    };
    assert_eq!(msg.encode(), Err(DecodeError::FieldOutOfRange("chan")));
}

#[test]
fn data_fields_out_of_range_are_caught() {
    let msg = MidiMessage::Control {
        chan: 0,
        number: 128,
        value: 0,
    };
    assert_eq!(msg.encode(), Err(DecodeError::FieldOutOfRange("number")));

    let msg = MidiMessage::Pitchbend {
        chan: 0,
        value: 0x4000,
    };
    assert_eq!(msg.encode(), Err(DecodeError::FieldOutOfRange("value")));

    let msg = MidiMessage::Sysex {
        data: vec![0x00, 0x90],
    };
    assert_eq!(msg.encode(), Err(DecodeError::FieldOutOfRange("data")));
}

#[test]
fn sysex_framing_in_data_is_normalized() {
    let framed = MidiMessage::Sysex {
        data: vec![0xF0, 0x00, 0x20, 0x08, 0xF7],
    };
    let interior = MidiMessage::Sysex {
        data: vec![0x00, 0x20, 0x08],
    };
    assert_eq!(framed.encode().unwrap(), interior.encode().unwrap());
    assert_eq!(interior.encode().unwrap(), [0xF0, 0x00, 0x20, 0x08, 0xF7]);
}

#[test]
fn empty_input_is_truncated() {
    assert_eq!(MidiMessage::decode(&[]), Err(DecodeError::Truncated));
}

#[test]
fn data_byte_cannot_lead_a_message() {
    assert_eq!(
        MidiMessage::decode(&[0x3C, 0x45]),
        Err(DecodeError::UnknownStatus(0x3C))
    );
}

#[test]
fn unrecognized_status_families_fail() {
    // dedicated note-off family is deliberately absent from this design
    assert_eq!(
        MidiMessage::decode(&[0x80, 0x3C, 0x40]),
        Err(DecodeError::UnknownStatus(0x80))
    );
    // polyphonic aftertouch
    assert_eq!(
        MidiMessage::decode(&[0xA0, 0x3C, 0x40]),
        Err(DecodeError::UnknownStatus(0xA0))
    );
    // MTC quarter frame
    assert_eq!(
        MidiMessage::decode(&[0xF1, 0x00]),
        Err(DecodeError::UnknownStatus(0xF1))
    );
    // a lone terminator is not a message
    assert_eq!(
        MidiMessage::decode(&[0xF7]),
        Err(DecodeError::UnknownStatus(0xF7))
    );
}

#[test]
fn short_and_long_fixed_messages_fail() {
    assert_eq!(
        MidiMessage::decode(&[0x90, 0x3C]),
        Err(DecodeError::Truncated)
    );
    assert_eq!(
        MidiMessage::decode(&[0xC2]),
        Err(DecodeError::Truncated)
    );
    assert_eq!(
        MidiMessage::decode(&[0x90, 0x3C, 0x45, 0x00]),
        Err(DecodeError::TrailingData(1))
    );
    assert_eq!(
        MidiMessage::decode(&[0xF8, 0x00]),
        Err(DecodeError::TrailingData(1))
    );
}

#[test]
fn status_byte_inside_data_reads_as_truncation() {
    assert_eq!(
        MidiMessage::decode(&[0x90, 0x3C, 0xF8]),
        Err(DecodeError::Truncated)
    );
}

#[test]
fn unterminated_sysex_is_truncated() {
    assert_eq!(
        MidiMessage::decode(&[0xF0, 0x01, 0x02]),
        Err(DecodeError::Truncated)
    );
    assert_eq!(MidiMessage::decode(&[0xF0]), Err(DecodeError::Truncated));
}

#[test]
fn empty_sysex_is_valid() {
    let msg = MidiMessage::decode(&[0xF0, 0xF7]).unwrap();
    assert_eq!(msg, MidiMessage::Sysex { data: vec![] });
    assert_eq!(msg.encode().unwrap(), [0xF0, 0xF7]);
}
