//! Ordering and cancellation semantics of the command scheduler, driven
//! entirely by a virtual clock.

use midiwire::prelude::*;
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};

struct Recorder {
    sent: Vec<(Micros, Vec<u8>)>,
    clock: Arc<VirtualClock>,
}

impl Recorder {
    fn new(clock: Arc<VirtualClock>) -> Self {
        Self {
            sent: Vec::new(),
            clock,
        }
    }

    fn payloads(&self) -> Vec<Vec<u8>> {
        self.sent.iter().map(|(_, p)| p.clone()).collect()
    }
}

impl Connection for Recorder {
    fn send_raw(&mut self, bytes: &[u8]) -> Result<(), SendError> {
        self.sent.push((self.clock.now(), bytes.to_vec()));
        Ok(())
    }
}

/// A burst of three one-byte payloads at 0, 100ms, 200ms.
fn burst() -> Vec<Command> {
    Command::evenly_spaced(vec![vec![1], vec![2], vec![3]], Micros::from_ms(100))
}

#[test]
fn commands_fire_in_offset_order_at_their_due_times() {
    let clock = Arc::new(VirtualClock::new());
    let scheduler = Scheduler::new();
    let mut rec = Recorder::new(clock.clone());

    scheduler.schedule(burst());
    let report = scheduler.run_until_idle(clock.as_ref(), &mut rec);

    assert!(report.all_sent());
    assert_eq!(
        rec.sent,
        vec![
            (Micros::ZERO, vec![1]),
            (Micros::from_ms(100), vec![2]),
            (Micros::from_ms(200), vec![3]),
        ]
    );
}

#[test]
fn clear_all_before_any_fire_leaves_nothing_fired() {
    let clock = Arc::new(VirtualClock::new());
    let scheduler = Scheduler::new();
    let mut rec = Recorder::new(clock.clone());

    scheduler.schedule(burst());
    scheduler.clear_all();

    let report = scheduler.run_until_idle(clock.as_ref(), &mut rec);
    assert_eq!(report.fired, 0);
    assert_eq!(rec.sent, vec![]);
}

#[test]
fn clear_all_after_the_first_fire_cancels_the_rest() {
    let clock = Arc::new(VirtualClock::new());
    let scheduler = Scheduler::new();
    let mut rec = Recorder::new(clock.clone());

    scheduler.schedule(burst());

    // advance past the first due time only
    clock.advance(Micros::from_ms(50));
    let report = scheduler.advance_to(clock.now(), &mut rec);
    assert_eq!(report.fired, 1);

    scheduler.clear_all();
    clock.advance(Micros::from_ms(1_000));
    let report = scheduler.advance_to(clock.now(), &mut rec);
    assert_eq!(report.fired, 0);

    assert_eq!(rec.payloads(), vec![vec![1]]);
}

#[test]
fn rescheduling_does_not_cancel_pending_commands() {
    let clock = Arc::new(VirtualClock::new());
    let scheduler = Scheduler::new();
    let mut rec = Recorder::new(clock.clone());

    scheduler.schedule([Command::new(Micros::from_ms(10), vec![1])]);
    scheduler.schedule([Command::new(Micros::from_ms(5), vec![2])]);

    let report = scheduler.run_until_idle(clock.as_ref(), &mut rec);
    assert_eq!(report.fired, 2);
    // both sequences survive, interleaved by due time
    assert_eq!(rec.payloads(), vec![vec![2], vec![1]]);
}

#[test]
fn replace_drops_the_old_sequence_first() {
    let clock = Arc::new(VirtualClock::new());
    let scheduler = Scheduler::new();
    let mut rec = Recorder::new(clock.clone());

    scheduler.schedule(burst());
    scheduler.replace([Command::new(Micros::ZERO, vec![9])]);

    let report = scheduler.run_until_idle(clock.as_ref(), &mut rec);
    assert_eq!(report.fired, 1);
    assert_eq!(rec.payloads(), vec![vec![9]]);
}

#[test]
fn clear_all_is_callable_from_a_fired_callback() {
    let scheduler = Arc::new(Scheduler::new());
    let sent = Arc::new(Mutex::new(Vec::new()));

    scheduler.schedule(burst());

    let inner = scheduler.clone();
    let log = sent.clone();
    let mut conn = move |bytes: &[u8]| {
        log.lock().unwrap().push(bytes.to_vec());
        // the first delivery tears down everything still pending
        inner.clear_all();
        Ok(())
    };

    let report = scheduler.advance_to(Micros::from_ms(500), &mut conn);
    assert_eq!(report.fired, 1);
    assert_eq!(scheduler.pending(), 0);
    assert_eq!(*sent.lock().unwrap(), vec![vec![1]]);
}

#[test]
fn scheduling_from_a_callback_extends_the_run() {
    let scheduler = Arc::new(Scheduler::new());
    let sent = Arc::new(Mutex::new(Vec::new()));
    let clock = Arc::new(VirtualClock::new());

    scheduler.schedule([Command::new(Micros::ZERO, vec![1])]);

    let inner = scheduler.clone();
    let log = sent.clone();
    let mut conn = move |bytes: &[u8]| {
        if bytes == [1] {
            inner.schedule([Command::new(Micros::from_ms(10), vec![2])]);
        }
        log.lock().unwrap().push(bytes.to_vec());
        Ok(())
    };

    let report = scheduler.run_until_idle(clock.as_ref(), &mut conn);
    assert_eq!(report.fired, 2);
    assert_eq!(*sent.lock().unwrap(), vec![vec![1], vec![2]]);
}

#[test]
fn hex_text_flows_through_to_the_connection_verbatim() {
    // the end-to-end path: typed hex -> bytes -> evenly spaced burst -> device
    let text = ["90 3C 45", "90 3C 00", "F0 7E 7F 06 01 F7"];
    let payloads: Vec<Vec<u8>> = text.iter().map(|t| hex::parse(t).unwrap()).collect();

    let clock = Arc::new(VirtualClock::new());
    let scheduler = Scheduler::new();
    let mut rec = Recorder::new(clock.clone());

    scheduler.replace(Command::evenly_spaced(payloads, Micros::from_ms(100)));
    let report = scheduler.run_until_idle(clock.as_ref(), &mut rec);

    assert_eq!(report.fired, 3);
    let rendered: Vec<String> = rec.payloads().iter().map(|p| hex::render(p)).collect();
    assert_eq!(rendered, text);
}
