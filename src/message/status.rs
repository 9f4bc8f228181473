use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Start-of-exclusive status byte.
pub const SYSEX_START: u8 = 0xF0;
/// End-of-exclusive status byte, terminates every sysex message.
pub const SYSEX_END: u8 = 0xF7;

#[doc = r#"
The status nibble of a channel message.

Channel messages carry this in the high nibble of the status byte and the
channel (0-15) in the low nibble. Note that there is no `NoteOff` entry:
a note off travels on the wire as a note on with zero velocity, so `0x8`
is not a recognized nibble here.
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum ChannelStatus {
    /// Note on (and, with zero velocity, note off)
    NoteOn = 0x9,
    /// Control change
    Control = 0xB,
    /// Program change
    Program = 0xC,
    /// Channel pressure (non-polyphonic aftertouch)
    Aftertouch = 0xD,
    /// Pitch bend, 14-bit value split over two data bytes
    PitchBend = 0xE,
}

impl ChannelStatus {
    /// The number of data bytes following the status byte.
    pub const fn data_len(&self) -> usize {
        match self {
            Self::Program | Self::Aftertouch => 1,
            Self::NoteOn | Self::Control | Self::PitchBend => 2,
        }
    }
}

#[doc = r#"
A recognized system status byte (`0xF0..=0xFF`).

System messages carry no channel. The bytes missing from this set
(`F1`, `F4`, `F5`, `F9`, `FD`) are undefined or unsupported and decode
to [`DecodeError::UnknownStatus`](super::DecodeError::UnknownStatus).
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum SystemStatus {
    /// Start of a system-exclusive message
    SysexStart = 0xF0,
    /// Song position pointer
    SongPointer = 0xF2,
    /// Song select
    SongSelect = 0xF3,
    /// Tune request
    TuneRequest = 0xF6,
    /// End of a system-exclusive message
    SysexEnd = 0xF7,
    /// Timing clock
    Clock = 0xF8,
    /// Start playback
    Start = 0xFA,
    /// Continue playback
    Continue = 0xFB,
    /// Stop playback
    Stop = 0xFC,
    /// Active sensing keep-alive
    ActiveSense = 0xFE,
    /// System reset
    Reset = 0xFF,
}

#[test]
fn channel_nibbles_round_trip() {
    for nibble in [0x9u8, 0xB, 0xC, 0xD, 0xE] {
        let status = ChannelStatus::try_from(nibble).unwrap();
        assert_eq!(u8::from(status), nibble);
    }
    // dedicated note-off and poly aftertouch families are not in this design
    assert!(ChannelStatus::try_from(0x8u8).is_err());
    assert!(ChannelStatus::try_from(0xAu8).is_err());
}

#[test]
fn undefined_system_bytes_are_rejected() {
    for byte in [0xF1u8, 0xF4, 0xF5, 0xF9, 0xFD] {
        assert!(SystemStatus::try_from(byte).is_err());
    }
}
