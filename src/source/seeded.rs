use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::Exp1;

use super::StochasticSource;
use crate::time::Duration;

/// A deterministic pseudo-random source: the same seed always yields
/// the same sequence of decisions.
#[derive(Clone)]
pub struct SeededSource {
    seed: u64,
    rng: ChaCha8Rng,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        SeededSource {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// The seed this source was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl fmt::Debug for SeededSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededSource")
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl StochasticSource for SeededSource {
    fn inter_arrival(&mut self, mean: Duration) -> Duration {
        // Exp(1) scaled by the mean is Exp(1 / mean)
        let unit: f64 = self.rng.sample(Exp1);
        Duration::from(unit * mean.as_f64())
    }

    fn instruction_count(&mut self, max: u32) -> u32 {
        self.rng.gen_range(1..=max.max(1))
    }

    fn memory_required(&mut self, max: u64) -> u64 {
        self.rng.gen_range(1..=max.max(1))
    }

    fn io_duration(&mut self, max: u32) -> Duration {
        Duration::from(self.rng.gen_range(1..=max.max(1)) as f64)
    }

    fn blocks_on_io(&mut self, probability: f64) -> bool {
        self.rng.gen::<f64>() < probability
    }
}
