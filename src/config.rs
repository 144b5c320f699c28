/*! Study constants and per-run configuration.

The constants describe the study the crate was built for: a sweep over
arrival intervals, memory capacities and population sizes. A single
simulation run is described by a [SimConfig], which is validated before
the engine touches it. */

use thiserror::Error;

use crate::arrival::MemorySizing;
use crate::stats::Classification;
use crate::time::Duration;

/// Seed used by every run of the study unless overridden.
pub const RANDOM_SEED: u64 = 42;
/// Population sizes (or arrival cutoffs) swept by the study.
pub const NUM_PROCESSES: [usize; 5] = [25, 50, 100, 150, 200];
/// Mean inter-arrival gaps swept by the study.
pub const INTERVALS: [f64; 3] = [10.0, 5.0, 1.0];
/// Memory capacities swept by the study.
pub const MEMORIES: [u64; 2] = [100, 200];
/// Instructions executed per CPU burst.
pub const INSTRUCTION_TIME: u32 = 3;
/// Instructions per virtual-time unit.
pub const CPU_SPEED: f64 = 1.0;
/// Probability that a burst is followed by an I/O block.
pub const WAITING_IO_PROBABILITY: f64 = 1.0 / 21.0;
/// Upper bound of the uniform initial instruction count.
pub const MAX_INSTRUCTIONS: u32 = 10;
/// Upper bound of the uniform I/O block duration.
pub const MAX_IO_DURATION: u32 = 21;
/// Upper bound of the memory drawn by processes of the open stream.
pub const OPEN_STREAM_MAX_MEMORY: u64 = 10;
/// Default cap on the number of events a single run may process.
pub const DEFAULT_MAX_EVENTS: u64 = 10_000_000;

/// How processes enter the system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArrivalMode {
    /// All processes exist at clock 0. The run ends once every process
    /// has terminated.
    FixedPopulation,
    /// Processes arrive with exponentially distributed gaps of mean
    /// `mean_interval`. The run ends immediately after the
    /// `population`-th process has *started*, i.e., issued its first
    /// resource request. It does not wait for anything to complete.
    OpenStream { mean_interval: Duration },
}

/// Whether the memory budget is actually reserved by processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemoryPolicy {
    /// Processes reserve `memory_required` on arrival, wait in FIFO order
    /// while the budget is short, and give it back on termination.
    #[default]
    Reserved,
    /// The budget is declared but never consulted.
    Unreserved,
}

/// When a process gives up the CPU after a burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CpuRelease {
    /// At the end of every burst, before any I/O block.
    #[default]
    AfterBurst,
    /// After the I/O block that follows a burst, if any; the CPU stays
    /// occupied while the holder waits for I/O.
    AfterIo,
}

/// Reasons a [SimConfig] is rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("mean arrival interval must be positive and finite, got {0}")]
    InvalidInterval(Duration),
    #[error("memory capacity must be positive")]
    ZeroMemoryCapacity,
    #[error("population size must be positive")]
    ZeroPopulation,
    #[error("CPU speed must be positive and finite, got {0}")]
    InvalidCpuSpeed(f64),
    #[error("instruction time must be positive")]
    ZeroInstructionTime,
    #[error("I/O probability must lie in [0, 1], got {0}")]
    InvalidIoProbability(f64),
    #[error("instruction, I/O duration and memory bounds must be positive")]
    ZeroSampleBound,
    #[error("processes may require up to {required} memory units, but capacity is {capacity}")]
    MemoryBoundExceedsCapacity { required: u64, capacity: u64 },
    #[error("event budget must be positive")]
    ZeroEventBudget,
}

/// Everything needed to run one simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Seed of the run's own random source.
    pub seed: u64,
    pub mode: ArrivalMode,
    /// Number of processes (fixed population) or arrival cutoff (open stream).
    pub population: usize,
    pub memory_capacity: u64,
    pub memory_sizing: MemorySizing,
    pub memory_policy: MemoryPolicy,
    pub cpu_speed: f64,
    pub instruction_time: u32,
    pub io_probability: f64,
    pub max_instructions: u32,
    pub max_io_duration: u32,
    pub cpu_release: CpuRelease,
    pub classification: Classification,
    /// The run fails once it has processed this many events.
    pub max_events: u64,
}

impl SimConfig {
    fn with_mode(
        mode: ArrivalMode,
        population: usize,
        memory_capacity: u64,
        memory_sizing: MemorySizing,
    ) -> Self {
        SimConfig {
            seed: RANDOM_SEED,
            mode,
            population,
            memory_capacity,
            memory_sizing,
            memory_policy: MemoryPolicy::default(),
            cpu_speed: CPU_SPEED,
            instruction_time: INSTRUCTION_TIME,
            io_probability: WAITING_IO_PROBABILITY,
            max_instructions: MAX_INSTRUCTIONS,
            max_io_duration: MAX_IO_DURATION,
            cpu_release: CpuRelease::default(),
            classification: Classification::default(),
            max_events: DEFAULT_MAX_EVENTS,
        }
    }

    /// A closed system of `population` processes. Each process draws its
    /// memory requirement from `[1, memory_capacity]`.
    pub fn fixed_population(population: usize, memory_capacity: u64) -> Self {
        Self::with_mode(
            ArrivalMode::FixedPopulation,
            population,
            memory_capacity,
            MemorySizing::CapacityRelative,
        )
    }

    /// An open system that stops after `cutoff` arrivals have started.
    /// Each process draws its memory requirement from
    /// `[1, OPEN_STREAM_MAX_MEMORY]`, regardless of `memory_capacity`.
    pub fn open_stream(cutoff: usize, mean_interval: Duration, memory_capacity: u64) -> Self {
        Self::with_mode(
            ArrivalMode::OpenStream { mean_interval },
            cutoff,
            memory_capacity,
            MemorySizing::Fixed {
                max: OPEN_STREAM_MAX_MEMORY,
            },
        )
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_cpu_speed(mut self, cpu_speed: f64) -> Self {
        self.cpu_speed = cpu_speed;
        self
    }

    pub fn with_instruction_time(mut self, instruction_time: u32) -> Self {
        self.instruction_time = instruction_time;
        self
    }

    pub fn with_io_probability(mut self, io_probability: f64) -> Self {
        self.io_probability = io_probability;
        self
    }

    pub fn with_memory_sizing(mut self, memory_sizing: MemorySizing) -> Self {
        self.memory_sizing = memory_sizing;
        self
    }

    pub fn with_memory_policy(mut self, memory_policy: MemoryPolicy) -> Self {
        self.memory_policy = memory_policy;
        self
    }

    pub fn with_cpu_release(mut self, cpu_release: CpuRelease) -> Self {
        self.cpu_release = cpu_release;
        self
    }

    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classification = classification;
        self
    }

    pub fn with_max_events(mut self, max_events: u64) -> Self {
        self.max_events = max_events;
        self
    }

    /// Virtual time a process occupies the CPU per burst.
    pub fn burst_duration(&self) -> Duration {
        Duration::from(self.instruction_time as f64 / self.cpu_speed)
    }

    /// Reject configurations that would make the engine divide by zero,
    /// never terminate, or strand processes forever.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let ArrivalMode::OpenStream { mean_interval } = self.mode {
            if !(mean_interval.as_f64().is_finite() && mean_interval.as_f64() > 0.0) {
                return Err(ConfigError::InvalidInterval(mean_interval));
            }
        }
        if self.memory_capacity == 0 {
            return Err(ConfigError::ZeroMemoryCapacity);
        }
        if self.population == 0 {
            return Err(ConfigError::ZeroPopulation);
        }
        if !(self.cpu_speed.is_finite() && self.cpu_speed > 0.0) {
            return Err(ConfigError::InvalidCpuSpeed(self.cpu_speed));
        }
        if self.instruction_time == 0 {
            return Err(ConfigError::ZeroInstructionTime);
        }
        if !(0.0..=1.0).contains(&self.io_probability) {
            return Err(ConfigError::InvalidIoProbability(self.io_probability));
        }
        let memory_bound = self.memory_sizing.bound(self.memory_capacity);
        if self.max_instructions == 0 || self.max_io_duration == 0 || memory_bound == 0 {
            return Err(ConfigError::ZeroSampleBound);
        }
        if self.memory_policy == MemoryPolicy::Reserved && memory_bound > self.memory_capacity {
            return Err(ConfigError::MemoryBoundExceedsCapacity {
                required: memory_bound,
                capacity: self.memory_capacity,
            });
        }
        if self.max_events == 0 {
            return Err(ConfigError::ZeroEventBudget);
        }
        Ok(())
    }
}
