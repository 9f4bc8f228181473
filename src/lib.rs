#![doc = r#"
Encode and decode MIDI channel/system messages, and schedule raw messages
for delayed, cancellable delivery to an output device.

The crate has four parts:

- [`hex`]: whitespace-separated two-digit hex text ⇄ raw bytes
- [`port`]: match a port descriptor against a pattern specification
- [`message`]: structured [`MidiMessage`](message::MidiMessage) ⇄ wire bytes
- [`scheduler`]: time-ordered, cancellable dispatch to a send capability

Device discovery and transport I/O are not provided; the scheduler talks to
anything implementing [`Connection`](scheduler::Connection).

# Example
```rust
use midiwire::prelude::*;

let raw = hex::parse("90 3C 45").unwrap();
let msg = MidiMessage::decode(&raw).unwrap();

assert_eq!(
    msg,
    MidiMessage::NoteOn { chan: 0, note: 60, velocity: 69 }
);
assert_eq!(msg.encode().unwrap(), raw);
```
"#]
#![warn(missing_docs)]

pub mod hex;
pub mod message;
pub mod port;
pub mod scheduler;

mod micros;
pub use micros::Micros;

/// Commonly used types, glob-importable.
pub mod prelude {
    pub use crate::Micros;
    pub use crate::hex::{self, ParseError};
    pub use crate::message::{DecodeError, MidiMessage};
    pub use crate::port::{MatchSpec, PortDescriptor};
    pub use crate::scheduler::{
        Clock, Command, Connection, FireReport, Scheduler, SendError, SystemClock, VirtualClock,
    };
}
