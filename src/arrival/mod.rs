/*! Arrival policies and process creation.

Two policies decide how processes enter the system:

- [FixedPopulation]: a closed system whose processes all exist at
  clock 0;
- [OpenStream]: an open system fed by exponentially distributed
  inter-arrival gaps, cut off after a given number of arrivals.

Both create processes through a [ProcessFactory], which hands out ids
and draws each process's memory requirement according to a
[MemorySizing] policy and its instruction count uniformly from
`[1, max_instructions]`. */

use auto_impl::auto_impl;

use crate::config::{ArrivalMode, SimConfig};
use crate::process::{Process, ProcessId};
use crate::source::StochasticSource;
use crate::time::{Duration, Instant};

/// How large the memory requirement of a new process can be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemorySizing {
    /// Uniform in `[1, memory_capacity]`.
    CapacityRelative,
    /// Uniform in `[1, max]`, independent of the capacity.
    Fixed { max: u64 },
}

impl MemorySizing {
    /// The largest requirement a process can draw under this policy.
    pub fn bound(&self, memory_capacity: u64) -> u64 {
        match self {
            MemorySizing::CapacityRelative => memory_capacity,
            MemorySizing::Fixed { max } => *max,
        }
    }
}

/// Creates processes with sequential ids and randomly drawn demands.
#[derive(Debug, Clone)]
pub struct ProcessFactory {
    memory_bound: u64,
    max_instructions: u32,
    next_id: usize,
}

impl ProcessFactory {
    pub fn new(sizing: MemorySizing, memory_capacity: u64, max_instructions: u32) -> Self {
        ProcessFactory {
            memory_bound: sizing.bound(memory_capacity),
            max_instructions,
            next_id: 0,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(
            config.memory_sizing,
            config.memory_capacity,
            config.max_instructions,
        )
    }

    /// Create the next process, arriving at `now`.
    pub fn create(&mut self, now: Instant, source: &mut dyn StochasticSource) -> Process {
        let id = ProcessId::from(self.next_id);
        self.next_id += 1;
        let memory = source.memory_required(self.memory_bound);
        let instructions = source.instruction_count(self.max_instructions);
        Process::new(id, now, memory, instructions)
    }

    /// Number of processes created so far.
    pub fn created(&self) -> usize {
        self.next_id
    }
}

/// The interface of arrival policies.
#[auto_impl(&mut, Box)]
pub trait ArrivalPolicy {
    /// Processes that exist when the clock starts.
    fn initial_population(
        &mut self,
        factory: &mut ProcessFactory,
        source: &mut dyn StochasticSource,
    ) -> Vec<Process>;

    /// Delay until the next arrival, or `None` if no further arrivals
    /// are due.
    fn next_gap(&mut self, source: &mut dyn StochasticSource) -> Option<Duration>;

    /// Whether the run is over once `started` processes have started.
    /// Policies that return `false` throughout let the run continue
    /// until no events are left.
    fn cutoff_reached(&self, started: usize) -> bool;
}

/// A closed system of `size` processes, all present at clock 0.
#[derive(Debug, Clone, Copy)]
pub struct FixedPopulation {
    pub size: usize,
}

impl ArrivalPolicy for FixedPopulation {
    fn initial_population(
        &mut self,
        factory: &mut ProcessFactory,
        source: &mut dyn StochasticSource,
    ) -> Vec<Process> {
        (0..self.size)
            .map(|_| factory.create(Instant::zero(), source))
            .collect()
    }

    fn next_gap(&mut self, _source: &mut dyn StochasticSource) -> Option<Duration> {
        None
    }

    fn cutoff_reached(&self, _started: usize) -> bool {
        false
    }
}

/// An unbounded stream of arrivals with exponentially distributed gaps,
/// stopped once `cutoff` processes have started.
///
/// Note that the cutoff counts *started* processes: the run ends at the
/// `cutoff`-th arrival, however many earlier arrivals are still in
/// flight.
#[derive(Debug, Clone, Copy)]
pub struct OpenStream {
    pub mean_interval: Duration,
    pub cutoff: usize,
    gaps_issued: usize,
}

impl OpenStream {
    pub fn new(mean_interval: Duration, cutoff: usize) -> Self {
        OpenStream {
            mean_interval,
            cutoff,
            gaps_issued: 0,
        }
    }
}

impl ArrivalPolicy for OpenStream {
    fn initial_population(
        &mut self,
        _factory: &mut ProcessFactory,
        _source: &mut dyn StochasticSource,
    ) -> Vec<Process> {
        Vec::new()
    }

    fn next_gap(&mut self, source: &mut dyn StochasticSource) -> Option<Duration> {
        if self.gaps_issued < self.cutoff {
            self.gaps_issued += 1;
            Some(source.inter_arrival(self.mean_interval))
        } else {
            None
        }
    }

    fn cutoff_reached(&self, started: usize) -> bool {
        started >= self.cutoff
    }
}

/// The arrival policy a configuration asks for.
pub fn policy_for(config: &SimConfig) -> Box<dyn ArrivalPolicy> {
    match config.mode {
        ArrivalMode::FixedPopulation => Box::new(FixedPopulation {
            size: config.population,
        }),
        ArrivalMode::OpenStream { mean_interval } => {
            Box::new(OpenStream::new(mean_interval, config.population))
        }
    }
}
