use std::collections::VecDeque;

use super::StochasticSource;
use crate::time::Duration;

/// A source that replays fixed values instead of sampling.
///
/// Arrival gaps and I/O decisions are consumed from scripts in order;
/// once a script runs dry, the corresponding default applies. Counts
/// are clamped to the bound the engine asks for.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    instructions: u32,
    memory: u64,
    io_duration: Duration,
    gaps: VecDeque<Duration>,
    default_gap: Duration,
    io_decisions: VecDeque<bool>,
    default_decision: bool,
    trials: usize,
}

impl ScriptedSource {
    /// Every process gets `instructions` instructions and one unit of
    /// memory; arrivals are one time unit apart and nothing ever
    /// blocks on I/O.
    pub fn new(instructions: u32) -> Self {
        ScriptedSource {
            instructions,
            memory: 1,
            io_duration: Duration::from(1.0),
            gaps: VecDeque::new(),
            default_gap: Duration::from(1.0),
            io_decisions: VecDeque::new(),
            default_decision: false,
            trials: 0,
        }
    }

    pub fn with_memory(mut self, memory: u64) -> Self {
        self.memory = memory;
        self
    }

    pub fn with_io_duration(mut self, io_duration: Duration) -> Self {
        self.io_duration = io_duration;
        self
    }

    /// Use `gap` for every arrival not covered by an explicit script.
    pub fn with_gap(mut self, gap: Duration) -> Self {
        self.default_gap = gap;
        self
    }

    pub fn with_gaps(mut self, gaps: impl IntoIterator<Item = Duration>) -> Self {
        self.gaps.extend(gaps);
        self
    }

    pub fn with_io_decisions(mut self, decisions: impl IntoIterator<Item = bool>) -> Self {
        self.io_decisions.extend(decisions);
        self
    }

    /// Block after every burst not covered by an explicit script.
    pub fn always_block(mut self) -> Self {
        self.default_decision = true;
        self
    }

    /// Number of I/O trials performed so far.
    pub fn trials(&self) -> usize {
        self.trials
    }
}

impl StochasticSource for ScriptedSource {
    fn inter_arrival(&mut self, _mean: Duration) -> Duration {
        self.gaps.pop_front().unwrap_or(self.default_gap)
    }

    fn instruction_count(&mut self, max: u32) -> u32 {
        self.instructions.min(max)
    }

    fn memory_required(&mut self, max: u64) -> u64 {
        self.memory.min(max)
    }

    fn io_duration(&mut self, _max: u32) -> Duration {
        self.io_duration
    }

    fn blocks_on_io(&mut self, _probability: f64) -> bool {
        self.trials += 1;
        self.io_decisions
            .pop_front()
            .unwrap_or(self.default_decision)
    }
}
