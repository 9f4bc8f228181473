//! Wire-format vectors for every message kind, expressed in the hex text
//! form, plus the round-trip and asymmetry properties the codec promises.

use midiwire::prelude::*;
use pretty_assertions::assert_eq;

/// Asserts that `msg` encodes to exactly the bytes spelled in `text`, and
/// that those bytes decode back to `expected` (which differs from `msg`
/// only for the note-off family).
fn check(msg: MidiMessage, text: &str, expected: MidiMessage) {
    let raw = hex::parse(text).unwrap();
    assert_eq!(msg.encode().unwrap(), raw, "encoding {msg:?}");
    assert_eq!(MidiMessage::decode(&raw).unwrap(), expected, "decoding {text}");
}

fn check_symmetric(msg: MidiMessage, text: &str) {
    check(msg.clone(), text, msg);
}

#[test]
fn note_on() {
    check_symmetric(
        MidiMessage::NoteOn {
            chan: 0,
            note: 60,
            velocity: 69,
        },
        "90 3C 45",
    );
}

#[test]
fn note_off_shares_the_note_on_family() {
    // 90, not 80: note off is note on with zero velocity in this design
    check_symmetric(
        MidiMessage::NoteOff {
            chan: 0,
            note: 60,
            velocity: 0,
        },
        "90 3C 00",
    );
}

#[test]
fn zero_velocity_note_on_decodes_as_note_off() {
    let raw = MidiMessage::NoteOn {
        chan: 0,
        note: 60,
        velocity: 0,
    }
    .encode()
    .unwrap();
    assert_eq!(
        MidiMessage::decode(&raw).unwrap(),
        MidiMessage::NoteOff {
            chan: 0,
            note: 60,
            velocity: 0,
        }
    );
}

#[test]
fn aftertouch() {
    check_symmetric(
        MidiMessage::Aftertouch {
            chan: 0,
            pressure: 87,
        },
        "D0 57",
    );
}

#[test]
fn control() {
    check_symmetric(
        MidiMessage::Control {
            chan: 2,
            number: 74,
            value: 116,
        },
        "B2 4A 74",
    );
}

#[test]
fn program() {
    check_symmetric(MidiMessage::Program { chan: 2, program: 7 }, "C2 07");
}

#[test]
fn pitchbend_packs_lsb_then_msb() {
    check_symmetric(
        MidiMessage::Pitchbend {
            chan: 1,
            value: 5888,
        },
        "E1 00 2E",
    );
}

#[test]
fn pitchbend_round_trips_across_the_full_14_bit_range() {
    for value in 0..=16383u16 {
        let msg = MidiMessage::Pitchbend { chan: 9, value };
        let raw = msg.encode().unwrap();
        assert_eq!(raw.len(), 3);
        let MidiMessage::Pitchbend { value: decoded, .. } =
            MidiMessage::decode(&raw).unwrap()
        else {
            panic!("pitchbend decoded as something else");
        };
        assert_eq!(decoded, value);
    }
}

#[test]
fn sysex() {
    check_symmetric(
        MidiMessage::Sysex {
            data: vec![0, 32, 8, 16, 127, 0, 1],
        },
        "F0 00 20 08 10 7F 00 01 F7",
    );
}

#[test]
fn sysex_with_framed_data_hits_the_same_wire_bytes() {
    // the historical caller shape: data already bracketed by F0/F7
    check(
        MidiMessage::Sysex {
            data: vec![240, 0, 32, 8, 16, 127, 0, 1, 247],
        },
        "F0 00 20 08 10 7F 00 01 F7",
        MidiMessage::Sysex {
            data: vec![0, 32, 8, 16, 127, 0, 1],
        },
    );
}

#[test]
fn sysex_missing_terminator_is_truncated() {
    let raw = hex::parse("F0 00 20 08 10 7F 00 01").unwrap();
    assert_eq!(MidiMessage::decode(&raw), Err(DecodeError::Truncated));
}

#[test]
fn song_pointer_and_song_select_stay_single_byte() {
    check_symmetric(MidiMessage::SongPointer { value: 1 }, "F2 01");
    check_symmetric(MidiMessage::SongSelect { value: 1 }, "F3 01");
}

#[test]
fn status_only_messages() {
    check_symmetric(MidiMessage::TuneRequest, "F6");
    check_symmetric(MidiMessage::Clock, "F8");
    check_symmetric(MidiMessage::Start, "FA");
    check_symmetric(MidiMessage::Continue, "FB");
    check_symmetric(MidiMessage::Stop, "FC");
    check_symmetric(MidiMessage::ActiveSense, "FE");
    check_symmetric(MidiMessage::Reset, "FF");
}

#[test]
fn channel_messages_round_trip_on_every_channel() {
    for chan in 0..16u8 {
        for msg in [
            MidiMessage::NoteOn {
                chan,
                note: 127,
                velocity: 1,
            },
            MidiMessage::NoteOff {
                chan,
                note: 0,
                velocity: 0,
            },
            MidiMessage::Aftertouch { chan, pressure: 64 },
            MidiMessage::Control {
                chan,
                number: 64,
                value: 127,
            },
            MidiMessage::Program { chan, program: 127 },
            MidiMessage::Pitchbend { chan, value: 8192 },
        ] {
            let raw = msg.encode().unwrap();
            assert_eq!(MidiMessage::decode(&raw).unwrap(), msg);
            // channel rides the low nibble of the status byte
            assert_eq!(raw[0] & 0x0F, chan);
        }
    }
}

#[test]
fn decoded_text_renders_back_to_itself() {
    for text in ["90 3C 45", "B2 4A 74", "E1 00 2E", "F0 00 20 08 10 7F 00 01 F7", "F6"] {
        let raw = hex::parse(text).unwrap();
        let recoded = MidiMessage::decode(&raw).unwrap().encode().unwrap();
        assert_eq!(hex::render(&recoded), text);
    }
}

#[cfg(feature = "serde")]
mod serde_shape {
    use midiwire::message::MidiMessage;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn messages_tag_their_kind_in_a_type_field() {
        let msg = MidiMessage::NoteOn {
            chan: 0,
            note: 60,
            velocity: 69,
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "noteOn", "chan": 0, "note": 60, "velocity": 69})
        );

        assert_eq!(
            serde_json::to_value(MidiMessage::TuneRequest).unwrap(),
            json!({"type": "tuneRequest"})
        );

        // `continue` is a keyword in source but not on the wire
        assert_eq!(
            serde_json::to_value(MidiMessage::Continue).unwrap(),
            json!({"type": "continue"})
        );
    }

    #[test]
    fn messages_parse_from_the_tagged_shape() {
        let msg: MidiMessage = serde_json::from_value(json!({
            "type": "pitchbend",
            "chan": 1,
            "value": 5888,
        }))
        .unwrap();
        assert_eq!(msg, MidiMessage::Pitchbend { chan: 1, value: 5888 });

        let msg: MidiMessage = serde_json::from_value(json!({
            "type": "sysex",
            "data": [0, 32, 8],
        }))
        .unwrap();
        assert_eq!(msg, MidiMessage::Sysex { data: vec![0, 32, 8] });
    }
}
