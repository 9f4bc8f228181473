#![doc = r#"
Time-ordered, cancellable delivery of raw MIDI messages.

A [`Scheduler`] owns a queue of pending [`Command`]s, each a raw payload
due at an absolute instant on the scheduler's own timeline. Driving the
timeline forward with [`Scheduler::advance_to`] fires every due command,
in non-decreasing due-time order (enqueue order breaks ties), by handing
its payload to a [`Connection`]. [`Scheduler::clear_all`] cancels every
pending command; commands already fired are unaffected.

The scheduler never looks at a wall clock itself. [`SystemClock`] drives
it in real time via [`Scheduler::run_until_idle`]; [`VirtualClock`] drives
it deterministically in tests.

# Example
```rust
use midiwire::scheduler::{Command, Connection, Scheduler, SendError};
use midiwire::Micros;

struct Log(Vec<Vec<u8>>);
impl Connection for Log {
    fn send_raw(&mut self, bytes: &[u8]) -> Result<(), SendError> {
        self.0.push(bytes.to_vec());
        Ok(())
    }
}

let scheduler = Scheduler::new();
scheduler.schedule(Command::evenly_spaced(
    vec![vec![0x90, 0x3C, 0x45], vec![0x90, 0x3C, 0x00]],
    Micros::from_ms(100),
));

let mut log = Log(Vec::new());
let report = scheduler.advance_to(Micros::from_ms(100), &mut log);
assert_eq!(report.fired, 2);
assert_eq!(log.0[1], [0x90, 0x3C, 0x00]);
```
"#]

use crate::Micros;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Mutex;
use thiserror::Error;

/// A transport failure reported by a [`Connection`].
///
/// The transport's own error detail is carried as text; from the
/// scheduler's point of view the failure is opaque.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("transport send failed: {0}")]
pub struct SendError(pub String);

/// The send capability the scheduler fires commands into.
///
/// Provided by a transport/connection collaborator; this crate never
/// opens devices itself. The call is assumed synchronous — if it blocks,
/// subsequent commands are delayed, not dropped.
pub trait Connection {
    /// Sends one raw MIDI message.
    fn send_raw(&mut self, bytes: &[u8]) -> Result<(), SendError>;
}

impl<F> Connection for F
where
    F: FnMut(&[u8]) -> Result<(), SendError>,
{
    fn send_raw(&mut self, bytes: &[u8]) -> Result<(), SendError> {
        self(bytes)
    }
}

/// A raw message payload due a fixed offset after its scheduling call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Delay from the moment [`Scheduler::schedule`] is called.
    pub offset: Micros,
    /// Raw message bytes handed to the connection verbatim.
    pub payload: Vec<u8>,
}

impl Command {
    /// Creates a command due `offset` after scheduling.
    pub fn new(offset: Micros, payload: Vec<u8>) -> Self {
        Self { offset, payload }
    }

    /// Spaces `payloads` evenly: the i-th command is due at `i * spacing`.
    ///
    /// This is the usual shape for sending a burst of messages to a
    /// device that cannot absorb them back to back.
    pub fn evenly_spaced(
        payloads: impl IntoIterator<Item = Vec<u8>>,
        spacing: Micros,
    ) -> Vec<Self> {
        payloads
            .into_iter()
            .enumerate()
            .map(|(i, payload)| Self::new(spacing * i as u64, payload))
            .collect()
    }
}

/// What one call to [`Scheduler::advance_to`] did.
///
/// Send failures do not stop the tick; every due command is still
/// attempted, and all failures are reported here.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[must_use]
pub struct FireReport {
    /// Commands transitioned to fired during this tick.
    pub fired: usize,
    /// Transport errors raised by the connection, in firing order.
    pub failures: Vec<SendError>,
}

impl FireReport {
    /// True if every fired command was accepted by the connection.
    pub fn all_sent(&self) -> bool {
        self.failures.is_empty()
    }

    fn merge(&mut self, other: FireReport) {
        self.fired += other.fired;
        self.failures.extend(other.failures);
    }
}

/// A pending command on the queue: absolute due time plus an enqueue
/// sequence number so equal due times fire in schedule order.
#[derive(Debug, Clone)]
struct Pending {
    due: Micros,
    seq: u64,
    payload: Vec<u8>,
}

// ordering ignores the payload; seq is unique, so no two entries compare equal
impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        (self.due, self.seq) == (other.due, other.seq)
    }
}

impl Eq for Pending {}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
struct CommandQueue {
    now: Micros,
    next_seq: u64,
    heap: BinaryHeap<Reverse<Pending>>,
}

impl CommandQueue {
    /// Pops the next command due at or before `now`, if any.
    fn pop_due(&mut self, now: Micros) -> Option<Pending> {
        let due = self.heap.peek()?.0.due;
        if due > now {
            return None;
        }
        Some(self.heap.pop()?.0)
    }
}

#[doc = r#"
The delivery queue. See the [module docs](self) for an overview.

All methods take `&self`; the queue lives behind an internal mutex, and
the lock is released around every `send_raw` call, so a connection
callback may itself call [`clear_all`](Self::clear_all) (or even
[`schedule`](Self::schedule)) on the same scheduler.
"#]
#[derive(Debug, Default)]
pub struct Scheduler {
    queue: Mutex<CommandQueue>,
}

impl Scheduler {
    /// Creates an empty scheduler at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends commands to the queue, each timestamped relative to the
    /// scheduler's current time.
    ///
    /// Previously pending commands are untouched; callers wanting
    /// replace-semantics should use [`replace`](Self::replace).
    pub fn schedule(&self, commands: impl IntoIterator<Item = Command>) {
        let mut queue = self.queue.lock().unwrap();
        let base = queue.now;
        for command in commands {
            let seq = queue.next_seq;
            queue.next_seq += 1;
            queue.heap.push(Reverse(Pending {
                due: base + command.offset,
                seq,
                payload: command.payload,
            }));
        }
    }

    /// Cancels every pending command.
    ///
    /// Commands already fired (including one currently in flight on
    /// another thread) are unaffected.
    pub fn clear_all(&self) {
        self.queue.lock().unwrap().heap.clear();
    }

    /// [`clear_all`](Self::clear_all) followed by [`schedule`](Self::schedule):
    /// the queue afterwards holds exactly `commands`.
    pub fn replace(&self, commands: impl IntoIterator<Item = Command>) {
        self.clear_all();
        self.schedule(commands);
    }

    /// Number of commands still pending.
    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap().heap.len()
    }

    /// The scheduler's current time.
    pub fn now(&self) -> Micros {
        self.queue.lock().unwrap().now
    }

    /// The due time of the earliest pending command.
    pub fn next_due(&self) -> Option<Micros> {
        self.queue.lock().unwrap().heap.peek().map(|p| p.0.due)
    }

    /// Advances the timeline to `now` and fires every command due at or
    /// before it, in due-time order (enqueue order on ties).
    ///
    /// Time never moves backwards; an earlier `now` leaves the clock
    /// where it was and fires nothing new. A failing send is recorded in
    /// the report and does not stop later commands from firing.
    pub fn advance_to(&self, now: Micros, conn: &mut impl Connection) -> FireReport {
        let mut report = FireReport::default();
        loop {
            // take one command per lock hold; the send below runs unlocked
            let pending = {
                let mut queue = self.queue.lock().unwrap();
                if now > queue.now {
                    queue.now = now;
                }
                queue.pop_due(now)
            };
            let Some(pending) = pending else {
                return report;
            };

            report.fired += 1;
            if let Err(err) = conn.send_raw(&pending.payload) {
                report.failures.push(err);
            }
        }
    }

    /// Pumps the queue against a clock until nothing is pending.
    ///
    /// Sleeps (via [`Clock::sleep_until`]) between commands; returns the
    /// merged report once the queue is empty. Commands scheduled from
    /// within a connection callback extend the run.
    pub fn run_until_idle(&self, clock: &impl Clock, conn: &mut impl Connection) -> FireReport {
        let mut report = FireReport::default();
        while let Some(due) = self.next_due() {
            clock.sleep_until(due);
            report.merge(self.advance_to(clock.now(), conn));
        }
        report
    }
}

/// A source of scheduler time.
pub trait Clock {
    /// The current instant on this clock's timeline.
    fn now(&self) -> Micros;

    /// Blocks until `deadline`; returns immediately if already past.
    fn sleep_until(&self, deadline: Micros);
}

/// Monotonic wall-clock time, measured from the clock's creation.
#[derive(Debug)]
pub struct SystemClock {
    epoch: std::time::Instant,
}

impl SystemClock {
    /// Starts a clock at zero.
    pub fn new() -> Self {
        Self {
            epoch: std::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Micros {
        Micros::new(self.epoch.elapsed().as_micros() as u64)
    }

    fn sleep_until(&self, deadline: Micros) {
        let remaining = deadline.saturating_sub(self.now());
        if remaining > Micros::ZERO {
            std::thread::sleep(std::time::Duration::from_micros(remaining.us()));
        }
    }
}

/// A manually advanced clock for deterministic tests.
///
/// `sleep_until` jumps the clock straight to the deadline instead of
/// blocking, so scheduled sequences can be replayed instantly.
#[derive(Debug, Default)]
pub struct VirtualClock {
    now: Mutex<Micros>,
}

impl VirtualClock {
    /// Starts a virtual clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by `amount`.
    pub fn advance(&self, amount: Micros) {
        *self.now.lock().unwrap() += amount;
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Micros {
        *self.now.lock().unwrap()
    }

    fn sleep_until(&self, deadline: Micros) {
        let mut now = self.now.lock().unwrap();
        if deadline > *now {
            *now = deadline;
        }
    }
}

#[cfg(test)]
struct Recorder(Vec<Vec<u8>>);

#[cfg(test)]
impl Connection for Recorder {
    fn send_raw(&mut self, bytes: &[u8]) -> Result<(), SendError> {
        self.0.push(bytes.to_vec());
        Ok(())
    }
}

#[test]
fn equal_due_times_fire_in_enqueue_order() {
    let scheduler = Scheduler::new();
    scheduler.schedule([
        Command::new(Micros::ZERO, vec![1]),
        Command::new(Micros::ZERO, vec![2]),
        Command::new(Micros::ZERO, vec![3]),
    ]);

    let mut rec = Recorder(Vec::new());
    let report = scheduler.advance_to(Micros::ZERO, &mut rec);
    assert_eq!(report.fired, 3);
    assert_eq!(rec.0, vec![vec![1], vec![2], vec![3]]);
}

#[test]
fn offsets_are_relative_to_schedule_time() {
    let scheduler = Scheduler::new();
    let mut rec = Recorder(Vec::new());

    let _ = scheduler.advance_to(Micros::from_ms(50), &mut rec);
    scheduler.schedule([Command::new(Micros::from_ms(10), vec![1])]);

    // not due at the old base
    assert!(scheduler.advance_to(Micros::from_ms(55), &mut rec).fired == 0);
    assert_eq!(scheduler.advance_to(Micros::from_ms(60), &mut rec).fired, 1);
}

#[test]
fn time_does_not_rewind() {
    let scheduler = Scheduler::new();
    let mut rec = Recorder(Vec::new());

    let _ = scheduler.advance_to(Micros::from_ms(100), &mut rec);
    let _ = scheduler.advance_to(Micros::from_ms(20), &mut rec);
    assert_eq!(scheduler.now(), Micros::from_ms(100));
}

#[test]
fn evenly_spaced_builds_an_arithmetic_ramp() {
    let commands =
        Command::evenly_spaced(vec![vec![1], vec![2], vec![3]], Micros::from_ms(100));
    let offsets: Vec<_> = commands.iter().map(|c| c.offset).collect();
    assert_eq!(
        offsets,
        vec![Micros::ZERO, Micros::from_ms(100), Micros::from_ms(200)]
    );
}

#[test]
fn failures_do_not_starve_later_commands() {
    let scheduler = Scheduler::new();
    scheduler.schedule(Command::evenly_spaced(
        vec![vec![1], vec![2], vec![3]],
        Micros::from_ms(1),
    ));

    let mut sent = Vec::new();
    let mut conn = |bytes: &[u8]| {
        if bytes == [2] {
            return Err(SendError("device unplugged".into()));
        }
        sent.push(bytes.to_vec());
        Ok(())
    };

    let report = scheduler.advance_to(Micros::from_ms(10), &mut conn);
    assert_eq!(report.fired, 3);
    assert_eq!(report.failures, vec![SendError("device unplugged".into())]);
    assert!(!report.all_sent());
    assert_eq!(sent, vec![vec![1], vec![3]]);
}

#[test]
fn run_until_idle_with_virtual_clock_fires_everything() {
    let scheduler = Scheduler::new();
    scheduler.schedule(Command::evenly_spaced(
        vec![vec![1], vec![2], vec![3], vec![4]],
        Micros::from_ms(250),
    ));

    let clock = VirtualClock::new();
    let mut rec = Recorder(Vec::new());
    let report = scheduler.run_until_idle(&clock, &mut rec);

    assert_eq!(report.fired, 4);
    assert_eq!(scheduler.pending(), 0);
    assert_eq!(clock.now(), Micros::from_ms(750));
    assert_eq!(rec.0, vec![vec![1], vec![2], vec![3], vec![4]]);
}
