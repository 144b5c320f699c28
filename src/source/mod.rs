/*! Sources of randomness for a simulation run.

The trait [StochasticSource] covers every random decision the engine
makes: arrival gaps, instruction counts, memory requirements, I/O block
durations and the I/O-blocking trial itself. Each run owns its source,
so runs are independently seeded and never share state.

Two implementations are provided: [SeededSource], the real thing, and
[ScriptedSource], which replays fixed values for deterministic
scenarios. */

use auto_impl::auto_impl;

use crate::time::Duration;

/// The random decisions a simulation run depends on.
#[auto_impl(&mut, Box)]
pub trait StochasticSource {
    /// Sample an exponentially distributed inter-arrival gap with the
    /// given mean.
    fn inter_arrival(&mut self, mean: Duration) -> Duration;

    /// Sample an initial instruction count uniformly from `[1, max]`.
    fn instruction_count(&mut self, max: u32) -> u32;

    /// Sample a memory requirement uniformly from `[1, max]`.
    fn memory_required(&mut self, max: u64) -> u64;

    /// Sample the length of an I/O block uniformly from the integers
    /// in `[1, max]`.
    fn io_duration(&mut self, max: u32) -> Duration;

    /// Bernoulli trial: does the burst that just ended lead to an I/O block?
    fn blocks_on_io(&mut self, probability: f64) -> bool;
}

mod scripted;
mod seeded;

pub use scripted::ScriptedSource;
pub use seeded::SeededSource;

#[cfg(test)]
mod tests;
