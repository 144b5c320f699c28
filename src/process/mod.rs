/*! Simulated processes and their state machine.

A [Process] alternates between queueing for the CPU, running a burst
and (sometimes) blocking on I/O until its instruction count is
exhausted:

```text
Arrived -> [AwaitingMemory ->] QueuedForCpu -> Running -> { QueuedForCpu | BlockedIo } -> ... -> Terminated
```

The transition methods enforce this order; the engine decides *when*
each transition happens. Terminated processes stay around, inert, so
that statistics can be computed over the whole population of a run. */

use crate::time::{Duration, Instant};

/// Identifies a process within a single run. Ids are handed out
/// sequentially from zero in creation order and double as indices into
/// the run's process collection.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    derive_more::From,
    derive_more::Into,
    derive_more::Display,
)]
#[display(fmt = "P{}", _0)]
pub struct ProcessId(usize);

impl ProcessId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Where a process is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Arrived,
    /// Waiting for the memory budget to admit it.
    AwaitingMemory,
    QueuedForCpu,
    Running,
    BlockedIo,
    Terminated,
}

/// The unit of simulated work.
#[derive(Debug, Clone)]
pub struct Process {
    id: ProcessId,
    memory_required: u64,
    initial_instructions: u32,
    instructions_remaining: u32,
    waiting_io: bool,
    ever_blocked: bool,
    arrival_time: Instant,
    last_io_block_start: Option<Instant>,
    total_io_wait: Duration,
    io_blocks: u32,
    ready_since: Option<Instant>,
    total_ready_wait: Duration,
    first_dispatch: Option<Instant>,
    completion_time: Option<Instant>,
    state: ProcessState,
}

impl Process {
    pub fn new(id: ProcessId, arrival_time: Instant, memory_required: u64, instructions: u32) -> Self {
        Process {
            id,
            memory_required,
            initial_instructions: instructions,
            instructions_remaining: instructions,
            waiting_io: false,
            ever_blocked: false,
            arrival_time,
            last_io_block_start: None,
            total_io_wait: Duration::zero(),
            io_blocks: 0,
            ready_since: None,
            total_ready_wait: Duration::zero(),
            first_dispatch: None,
            completion_time: None,
            state: ProcessState::Arrived,
        }
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn memory_required(&self) -> u64 {
        self.memory_required
    }

    pub fn initial_instructions(&self) -> u32 {
        self.initial_instructions
    }

    pub fn instructions_remaining(&self) -> u32 {
        self.instructions_remaining
    }

    /// True only while the process sits inside an I/O block.
    pub fn waiting_io(&self) -> bool {
        self.waiting_io
    }

    /// True once the process has entered at least one I/O block.
    pub fn ever_blocked(&self) -> bool {
        self.ever_blocked
    }

    pub fn arrival_time(&self) -> Instant {
        self.arrival_time
    }

    /// Start of the I/O block currently in progress, if any.
    pub fn last_io_block_start(&self) -> Option<Instant> {
        self.last_io_block_start
    }

    /// Accumulated length of all *completed* I/O blocks.
    pub fn total_io_wait(&self) -> Duration {
        self.total_io_wait
    }

    /// I/O wait as observed at `now`, including the elapsed part of a
    /// block still in progress.
    pub fn io_wait_at(&self, now: Instant) -> Duration {
        match self.last_io_block_start {
            Some(start) => self.total_io_wait + (now - start),
            None => self.total_io_wait,
        }
    }

    pub fn io_blocks(&self) -> u32 {
        self.io_blocks
    }

    /// Accumulated time spent queued for the CPU or for memory,
    /// as observed at `now`.
    pub fn ready_wait_at(&self, now: Instant) -> Duration {
        match self.ready_since {
            Some(since) => self.total_ready_wait + (now - since),
            None => self.total_ready_wait,
        }
    }

    pub fn first_dispatch(&self) -> Option<Instant> {
        self.first_dispatch
    }

    pub fn completion_time(&self) -> Option<Instant> {
        self.completion_time
    }

    /// Time from arrival to termination, once terminated.
    pub fn turnaround(&self) -> Option<Duration> {
        self.completion_time.map(|done| done - self.arrival_time)
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state == ProcessState::Terminated
    }

    /// The memory budget could not admit the process on arrival.
    pub fn await_memory(&mut self, now: Instant) {
        debug_assert_eq!(self.state, ProcessState::Arrived);
        self.state = ProcessState::AwaitingMemory;
        self.ready_since = Some(now);
    }

    /// Join the CPU queue. Time spent awaiting memory right before
    /// counts as part of the same ready wait.
    pub fn enqueue(&mut self, now: Instant) {
        debug_assert!(matches!(
            self.state,
            ProcessState::Arrived
                | ProcessState::AwaitingMemory
                | ProcessState::Running
                | ProcessState::BlockedIo
        ));
        debug_assert!(!self.waiting_io);
        debug_assert!(self.instructions_remaining > 0);
        self.state = ProcessState::QueuedForCpu;
        self.ready_since.get_or_insert(now);
    }

    /// The CPU has been granted; a burst begins.
    pub fn dispatch(&mut self, now: Instant) {
        debug_assert_eq!(self.state, ProcessState::QueuedForCpu);
        if let Some(since) = self.ready_since.take() {
            self.total_ready_wait += now - since;
        }
        self.first_dispatch.get_or_insert(now);
        self.state = ProcessState::Running;
    }

    /// Account for the instructions of a finished burst. At most
    /// `quantum` instructions are executed, and never more than remain.
    /// Returns the number of instructions executed.
    pub fn complete_burst(&mut self, quantum: u32) -> u32 {
        debug_assert_eq!(self.state, ProcessState::Running);
        let executed = quantum.min(self.instructions_remaining);
        self.instructions_remaining -= executed;
        executed
    }

    /// Enter an I/O block right after a burst.
    pub fn block(&mut self, now: Instant) {
        debug_assert_eq!(self.state, ProcessState::Running);
        self.state = ProcessState::BlockedIo;
        self.waiting_io = true;
        self.ever_blocked = true;
        self.io_blocks += 1;
        self.last_io_block_start = Some(now);
    }

    /// Leave the current I/O block. The process remains in
    /// [ProcessState::BlockedIo] until the caller either enqueues or
    /// terminates it.
    pub fn unblock(&mut self, now: Instant) {
        debug_assert_eq!(self.state, ProcessState::BlockedIo);
        self.waiting_io = false;
        if let Some(start) = self.last_io_block_start.take() {
            self.total_io_wait += now - start;
        }
    }

    /// Terminate a process whose instructions are exhausted.
    pub fn terminate(&mut self, now: Instant) {
        assert_eq!(
            self.instructions_remaining, 0,
            "{} cannot terminate with instructions left",
            self.id
        );
        debug_assert!(!self.waiting_io);
        self.state = ProcessState::Terminated;
        self.completion_time = Some(now);
    }
}
