use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::process::ProcessId;
use crate::time::{Duration, Instant};

/// What happens when an event fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// The next arrival of the open stream is due.
    Arrival,
    /// The memory budget admitted a waiting process.
    Admit(ProcessId),
    /// The CPU was granted to a process, which now starts a burst.
    Dispatch(ProcessId),
    /// A process finished its current burst.
    BurstEnd(ProcessId),
    /// A process finished its current I/O block.
    IoEnd(ProcessId),
}

/// A scheduled event.
///
/// Events are ordered by:
/// 1. time (earlier first)
/// 2. sequence number, i.e., insertion order (FIFO among simultaneous events)
#[derive(Debug, Clone, Copy)]
pub struct Event {
    pub time: Instant,
    pub sequence: u64,
    pub kind: EventKind,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then(self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

/// Pending events plus the virtual clock they drive.
///
/// The clock only ever moves forward: it jumps to the time of each
/// event as it is popped, and events cannot be scheduled in the past.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<Event>>,
    next_sequence: u64,
    now: Instant,
}

impl EventQueue {
    pub fn new() -> Self {
        EventQueue::default()
    }

    /// The current virtual time.
    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Schedule `kind` to fire at `time`, which must not lie in the past.
    pub fn schedule(&mut self, time: Instant, kind: EventKind) {
        assert!(
            time.total_cmp(&self.now) != Ordering::Less,
            "cannot schedule {:?} at {} before the current time {}",
            kind,
            time,
            self.now
        );
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Reverse(Event {
            time,
            sequence,
            kind,
        }));
    }

    /// Schedule `kind` to fire `delay` time units from now.
    pub fn schedule_in(&mut self, delay: Duration, kind: EventKind) {
        self.schedule(self.now + delay, kind)
    }

    /// Schedule `kind` at the current instant, behind everything
    /// already scheduled for it.
    pub fn schedule_now(&mut self, kind: EventKind) {
        self.schedule(self.now, kind)
    }

    /// Remove the next event and advance the clock to its time.
    pub fn pop(&mut self) -> Option<Event> {
        let Reverse(event) = self.heap.pop()?;
        self.now = event.time;
        Some(event)
    }
}
