/*! The discrete-event simulation engine.

A [Simulation] owns everything a run needs: its configuration, its own
random source, the event queue and virtual clock, the CPU and memory
resources, and the collection of processes it created. Processes are
explicit state machines; the engine moves them along whenever one of
their events fires:

- a process starts by reserving memory (if the budget is enforced) and
  then requesting the CPU;
- once granted the CPU, it runs a burst of `instruction_time`
  instructions, which takes `instruction_time / cpu_speed` time units;
- after every burst, a Bernoulli trial decides whether it blocks on I/O
  for a uniformly distributed number of time units;
- it then either requests the CPU again or, with no instructions
  left, terminates and returns its memory.

Resource grants are events too, so processes that become ready at the
same instant proceed in the order in which they were granted.

Under [ArrivalMode::FixedPopulation][crate::config::ArrivalMode] a run
ends once no events are left. Under
[ArrivalMode::OpenStream][crate::config::ArrivalMode] it ends right
after the last arrival allowed by the cutoff has started. */

use thiserror::Error;
use tracing::{debug, trace};

use crate::arrival::{self, ArrivalPolicy, ProcessFactory};
use crate::config::{ConfigError, CpuRelease, MemoryPolicy, SimConfig};
use crate::process::{Process, ProcessId};
use crate::resource::{Cpu, Grant, MemoryBudget, Occupancy};
use crate::source::{SeededSource, StochasticSource};
use crate::stats::{self, Summary};
use crate::time::{Duration, Instant};

mod event;

pub use event::{Event, EventKind, EventQueue};

/// Number of consecutive zero-length arrival gaps after which the
/// arrival stream is considered stuck.
pub const ZERO_GAP_LIMIT: usize = 10_000;

/// Reasons a run fails.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// The run processed more events than its budget allows.
    #[error("event budget of {limit} exhausted at time {now}")]
    EventLimitExceeded { limit: u64, now: Instant },
    /// No events are left, but some processes never terminated.
    #[error("{unfinished} processes can never finish (clock stopped at {now})")]
    Stalled { unfinished: usize, now: Instant },
    /// The random source produced a negative or non-finite delay.
    #[error("stochastic source produced an unusable {what}: {value}")]
    InvalidSample { what: &'static str, value: f64 },
    /// The arrival stream stopped advancing the clock.
    #[error("{streak} consecutive arrivals without the clock advancing")]
    ArrivalClockStalled { streak: usize },
}

/// One CPU burst as it actually happened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burst {
    pub process: ProcessId,
    pub start: Instant,
    pub end: Instant,
    /// Instructions executed during the burst.
    pub instructions: u32,
    /// Whether the burst was followed by an I/O block.
    pub blocked_after: bool,
}

/// Everything a finished run leaves behind.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Every process the run created, indexed by id.
    pub processes: Vec<Process>,
    /// Every completed burst, in completion order.
    pub bursts: Vec<Burst>,
    /// Every completed CPU holding period, in release order.
    pub occupancy: Vec<Occupancy>,
    pub summary: Summary,
    /// Virtual time at which the run ended.
    pub end_time: Instant,
    pub events_processed: u64,
    /// Largest amount of memory reserved at the same time.
    pub peak_memory: u64,
}

impl Outcome {
    /// The `(average_waiting_time, io_average_waiting_time)` pair; either
    /// may be `NaN`.
    pub fn waiting_times(&self) -> (f64, f64) {
        self.summary.waiting_times()
    }

    pub fn terminated(&self) -> usize {
        self.summary.terminated
    }

    /// Fraction of bursts that were followed by an I/O block.
    pub fn io_block_fraction(&self) -> f64 {
        stats::mean(
            self.bursts
                .iter()
                .map(|b| if b.blocked_after { 1.0 } else { 0.0 }),
        )
    }

    /// Fraction of the run during which the CPU was held.
    pub fn cpu_utilization(&self) -> f64 {
        let busy: Duration = self.occupancy.iter().map(Occupancy::length).sum();
        busy.as_f64() / self.end_time.as_f64()
    }
}

/// Run one simulation with a source seeded from `config.seed`.
pub fn simulate(config: &SimConfig) -> Result<Outcome, SimError> {
    Simulation::new(config.clone())?.run()
}

/// A single simulation run.
pub struct Simulation<S: StochasticSource> {
    config: SimConfig,
    source: S,
    events: EventQueue,
    cpu: Cpu,
    memory: MemoryBudget,
    arrivals: Box<dyn ArrivalPolicy>,
    factory: ProcessFactory,
    processes: Vec<Process>,
    bursts: Vec<Burst>,
    running: Option<(ProcessId, Instant)>,
    started: usize,
    events_processed: u64,
    zero_gap_streak: usize,
}

impl Simulation<SeededSource> {
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        let source = SeededSource::new(config.seed);
        Self::with_source(config, source)
    }
}

impl<S: StochasticSource> Simulation<S> {
    /// Set up a run that draws its random decisions from `source`.
    pub fn with_source(config: SimConfig, source: S) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Simulation {
            memory: MemoryBudget::new(config.memory_capacity),
            arrivals: arrival::policy_for(&config),
            factory: ProcessFactory::from_config(&config),
            config,
            source,
            events: EventQueue::new(),
            cpu: Cpu::new(),
            processes: Vec::new(),
            bursts: Vec::new(),
            running: None,
            started: 0,
            events_processed: 0,
            zero_gap_streak: 0,
        })
    }

    /// Run until the termination condition of the arrival mode holds.
    pub fn run(mut self) -> Result<Outcome, SimError> {
        debug!(
            seed = self.config.seed,
            mode = ?self.config.mode,
            population = self.config.population,
            memory = self.config.memory_capacity,
            "starting simulation run"
        );

        let initial = self
            .arrivals
            .initial_population(&mut self.factory, &mut self.source);
        for process in initial {
            let id = self.admit(process);
            self.start(id);
        }
        self.schedule_next_arrival()?;

        while let Some(event) = self.events.pop() {
            self.events_processed += 1;
            if self.events_processed > self.config.max_events {
                return Err(SimError::EventLimitExceeded {
                    limit: self.config.max_events,
                    now: event.time,
                });
            }
            trace!(time = %event.time, kind = ?event.kind, "event");
            match event.kind {
                EventKind::Arrival => self.on_arrival()?,
                EventKind::Admit(id) => self.request_cpu(id),
                EventKind::Dispatch(id) => self.on_dispatch(id),
                EventKind::BurstEnd(id) => self.on_burst_end(id)?,
                EventKind::IoEnd(id) => self.on_io_end(id),
            }
            if self.arrivals.cutoff_reached(self.started) {
                break;
            }
        }

        let now = self.events.now();
        if !self.arrivals.cutoff_reached(self.started) {
            let unfinished = self.processes.iter().filter(|p| !p.is_terminated()).count();
            if unfinished > 0 {
                return Err(SimError::Stalled { unfinished, now });
            }
        }
        Ok(self.finish(now))
    }

    fn finish(self, now: Instant) -> Outcome {
        let summary = stats::summarize(&self.processes, self.config.classification, now);
        debug!(
            end_time = %now,
            events = self.events_processed,
            processes = self.processes.len(),
            terminated = summary.terminated,
            average_waiting_time = summary.average_waiting_time,
            io_average_waiting_time = summary.io_average_waiting_time,
            "simulation run finished"
        );
        Outcome {
            processes: self.processes,
            bursts: self.bursts,
            occupancy: self.cpu.into_occupancy(),
            summary,
            end_time: now,
            events_processed: self.events_processed,
            peak_memory: self.memory.peak_usage(),
        }
    }

    fn process(&mut self, id: ProcessId) -> &mut Process {
        &mut self.processes[id.index()]
    }

    /// Take ownership of a newly created process.
    fn admit(&mut self, process: Process) -> ProcessId {
        let id = process.id();
        debug_assert_eq!(id.index(), self.processes.len());
        self.processes.push(process);
        id
    }

    /// Begin the routine of a process that just arrived.
    fn start(&mut self, id: ProcessId) {
        self.started += 1;
        let now = self.events.now();
        if self.process(id).instructions_remaining() == 0 {
            self.process(id).terminate(now);
            return;
        }
        match self.config.memory_policy {
            MemoryPolicy::Unreserved => self.request_cpu(id),
            MemoryPolicy::Reserved => {
                let amount = self.process(id).memory_required();
                match self.memory.reserve(id, amount) {
                    Grant::Granted => self.request_cpu(id),
                    Grant::Queued { position } => {
                        trace!(process = %id, amount, position, "awaiting memory");
                        self.process(id).await_memory(now);
                    }
                }
            }
        }
    }

    fn request_cpu(&mut self, id: ProcessId) {
        let now = self.events.now();
        self.process(id).enqueue(now);
        if let Grant::Granted = self.cpu.acquire(id, now) {
            self.events.schedule_now(EventKind::Dispatch(id));
        }
    }

    fn release_cpu(&mut self, id: ProcessId) {
        let now = self.events.now();
        if let Some(next) = self.cpu.release(id, now) {
            self.events.schedule_now(EventKind::Dispatch(next));
        }
    }

    fn on_arrival(&mut self) -> Result<(), SimError> {
        let now = self.events.now();
        let process = self.factory.create(now, &mut self.source);
        let id = self.admit(process);
        self.start(id);
        if !self.arrivals.cutoff_reached(self.started) {
            self.schedule_next_arrival()?;
        }
        Ok(())
    }

    fn schedule_next_arrival(&mut self) -> Result<(), SimError> {
        let gap = match self.arrivals.next_gap(&mut self.source) {
            Some(gap) => gap,
            None => return Ok(()),
        };
        if !gap.is_valid_delay() {
            return Err(SimError::InvalidSample {
                what: "inter-arrival gap",
                value: gap.as_f64(),
            });
        }
        if gap.is_zero() {
            self.zero_gap_streak += 1;
            if self.zero_gap_streak >= ZERO_GAP_LIMIT {
                return Err(SimError::ArrivalClockStalled {
                    streak: self.zero_gap_streak,
                });
            }
        } else {
            self.zero_gap_streak = 0;
        }
        self.events.schedule_in(gap, EventKind::Arrival);
        Ok(())
    }

    fn on_dispatch(&mut self, id: ProcessId) {
        let now = self.events.now();
        debug_assert_eq!(self.cpu.holder(), Some(id));
        debug_assert!(self.running.is_none());
        self.process(id).dispatch(now);
        self.running = Some((id, now));
        let burst = self.config.burst_duration();
        self.events.schedule_in(burst, EventKind::BurstEnd(id));
    }

    fn on_burst_end(&mut self, id: ProcessId) -> Result<(), SimError> {
        let now = self.events.now();
        let start = match self.running.take() {
            Some((running, start)) if running == id => start,
            other => panic!("burst of {} ended while {:?} was running", id, other),
        };
        let quantum = self.config.instruction_time;
        let instructions = self.process(id).complete_burst(quantum);
        let blocks = self.source.blocks_on_io(self.config.io_probability);
        self.bursts.push(Burst {
            process: id,
            start,
            end: now,
            instructions,
            blocked_after: blocks,
        });

        if blocks {
            if self.config.cpu_release == CpuRelease::AfterBurst {
                self.release_cpu(id);
            }
            let io = self.source.io_duration(self.config.max_io_duration);
            if !io.is_valid_delay() {
                return Err(SimError::InvalidSample {
                    what: "I/O duration",
                    value: io.as_f64(),
                });
            }
            trace!(process = %id, duration = %io, "blocking on I/O");
            self.process(id).block(now);
            self.events.schedule_in(io, EventKind::IoEnd(id));
        } else {
            self.release_cpu(id);
            self.continue_or_terminate(id);
        }
        Ok(())
    }

    fn on_io_end(&mut self, id: ProcessId) {
        let now = self.events.now();
        self.process(id).unblock(now);
        if self.config.cpu_release == CpuRelease::AfterIo {
            self.release_cpu(id);
        }
        self.continue_or_terminate(id);
    }

    /// Queue for the next burst, or terminate if nothing is left to run.
    fn continue_or_terminate(&mut self, id: ProcessId) {
        if self.process(id).instructions_remaining() > 0 {
            self.request_cpu(id);
            return;
        }
        let now = self.events.now();
        self.process(id).terminate(now);
        trace!(process = %id, "terminated");
        if self.config.memory_policy == MemoryPolicy::Reserved {
            let amount = self.process(id).memory_required();
            for admitted in self.memory.release(amount) {
                self.events.schedule_now(EventKind::Admit(admitted));
            }
        }
    }
}
