/*! Parameter sweeps over arrival interval, memory capacity and
population size.

A [Sweep] runs one independently seeded simulation per point of the
cross product of its three axes and collects the resulting summaries.
Every point is validated before the first simulation starts, so a bad
axis value never leaves a sweep half done. */

use itertools::{iproduct, Itertools};
use thiserror::Error;
use tracing::info;

use crate::config::{
    ArrivalMode, ConfigError, SimConfig, INTERVALS, MEMORIES, NUM_PROCESSES,
};
use crate::engine::{simulate, SimError};
use crate::stats::Summary;
use crate::time::Duration;

/// One configuration tuple of a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPoint {
    pub interval: Duration,
    pub memory: u64,
    pub population: usize,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SweepError {
    #[error("the {0} axis of the sweep is empty")]
    EmptyAxis(&'static str),
    #[error("the {axis} axis of the sweep lists {value} more than once")]
    DuplicateAxisValue { axis: &'static str, value: String },
    #[error("invalid sweep point {point:?}: {source}")]
    InvalidPoint {
        point: SweepPoint,
        source: ConfigError,
    },
    #[error("simulation at {point:?} failed: {source}")]
    Simulation { point: SweepPoint, source: SimError },
}

/// The cross product of three configuration axes on top of a base
/// configuration, which supplies the arrival mode, the seed and all
/// policies.
#[derive(Debug, Clone)]
pub struct Sweep {
    base: SimConfig,
    intervals: Vec<Duration>,
    memories: Vec<u64>,
    populations: Vec<usize>,
}

impl Sweep {
    /// A sweep over the study's default axes.
    pub fn new(base: SimConfig) -> Self {
        Sweep {
            base,
            intervals: INTERVALS.iter().copied().map(Duration::from).collect(),
            memories: MEMORIES.to_vec(),
            populations: NUM_PROCESSES.to_vec(),
        }
    }

    /// The study's closed-system sweep.
    pub fn fixed_population() -> Self {
        Self::new(SimConfig::fixed_population(NUM_PROCESSES[0], MEMORIES[0]))
    }

    /// The study's open-system sweep.
    pub fn open_stream() -> Self {
        Self::new(SimConfig::open_stream(
            NUM_PROCESSES[0],
            Duration::from(INTERVALS[0]),
            MEMORIES[0],
        ))
    }

    pub fn with_intervals(mut self, intervals: impl IntoIterator<Item = f64>) -> Self {
        self.intervals = intervals.into_iter().map(Duration::from).collect();
        self
    }

    pub fn with_memories(mut self, memories: impl IntoIterator<Item = u64>) -> Self {
        self.memories = memories.into_iter().collect();
        self
    }

    pub fn with_populations(mut self, populations: impl IntoIterator<Item = usize>) -> Self {
        self.populations = populations.into_iter().collect();
        self
    }

    pub fn base(&self) -> &SimConfig {
        &self.base
    }

    /// All points, in interval, then memory, then population order.
    pub fn points(&self) -> impl Iterator<Item = SweepPoint> + '_ {
        iproduct!(
            self.intervals.iter().copied(),
            self.memories.iter().copied(),
            self.populations.iter().copied()
        )
        .map(|(interval, memory, population)| SweepPoint {
            interval,
            memory,
            population,
        })
    }

    /// The configuration of a single point. The interval only matters to
    /// the open stream; a closed system has no arrivals to space out.
    pub fn config_for(&self, point: SweepPoint) -> SimConfig {
        let mut config = self.base.clone();
        config.population = point.population;
        config.memory_capacity = point.memory;
        if let ArrivalMode::OpenStream { .. } = config.mode {
            config.mode = ArrivalMode::OpenStream {
                mean_interval: point.interval,
            };
        }
        config
    }

    /// Check every point without running anything.
    pub fn validate(&self) -> Result<(), SweepError> {
        for (axis, empty) in [
            ("interval", self.intervals.is_empty()),
            ("memory", self.memories.is_empty()),
            ("population", self.populations.is_empty()),
        ] {
            if empty {
                return Err(SweepError::EmptyAxis(axis));
            }
        }
        let duplicate = |axis, value: Option<String>| match value {
            Some(value) => Err(SweepError::DuplicateAxisValue { axis, value }),
            None => Ok(()),
        };
        duplicate(
            "interval",
            self.intervals
                .iter()
                .duplicates_by(|d| d.as_f64().to_bits())
                .next()
                .map(Duration::to_string),
        )?;
        duplicate(
            "memory",
            self.memories.iter().duplicates().next().map(u64::to_string),
        )?;
        duplicate(
            "population",
            self.populations
                .iter()
                .duplicates()
                .next()
                .map(usize::to_string),
        )?;
        for point in self.points() {
            let interval = point.interval.as_f64();
            // rejected in either mode, even where the interval goes unused
            if !(interval.is_finite() && interval > 0.0) {
                return Err(SweepError::InvalidPoint {
                    point,
                    source: ConfigError::InvalidInterval(point.interval),
                });
            }
            self.config_for(point)
                .validate()
                .map_err(|source| SweepError::InvalidPoint { point, source })?;
        }
        Ok(())
    }

    /// Run one simulation per point. Each run seeds its own source from
    /// the base configuration's seed.
    pub fn run(&self) -> Result<SweepResults, SweepError> {
        self.validate()?;
        let mut results = SweepResults::default();
        for point in self.points() {
            let outcome = simulate(&self.config_for(point))
                .map_err(|source| SweepError::Simulation { point, source })?;
            let summary = outcome.summary;
            info!(
                interval = %point.interval,
                memory = point.memory,
                population = point.population,
                average_waiting_time = summary.average_waiting_time,
                io_average_waiting_time = summary.io_average_waiting_time,
                "sweep point done"
            );
            results.entries.push((point, summary));
        }
        Ok(results)
    }
}

/// Summaries of a sweep, keyed by configuration tuple.
#[derive(Debug, Clone, Default)]
pub struct SweepResults {
    entries: Vec<(SweepPoint, Summary)>,
}

impl SweepResults {
    pub fn get(&self, interval: Duration, memory: u64, population: usize) -> Option<&Summary> {
        let key = SweepPoint {
            interval,
            memory,
            population,
        };
        self.entries
            .iter()
            .find(|(point, _)| *point == key)
            .map(|(_, summary)| summary)
    }

    /// The `(average_waiting_time, io_average_waiting_time)` pair of a point.
    pub fn waiting_times(
        &self,
        interval: Duration,
        memory: u64,
        population: usize,
    ) -> Option<(f64, f64)> {
        self.get(interval, memory, population)
            .map(Summary::waiting_times)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(SweepPoint, Summary)> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct intervals, in sweep order.
    pub fn intervals(&self) -> Vec<Duration> {
        self.entries
            .iter()
            .map(|(p, _)| p.interval)
            .unique_by(|d| d.as_f64().to_bits())
            .collect()
    }

    /// Distinct memory capacities, in sweep order.
    pub fn memories(&self) -> Vec<u64> {
        self.entries.iter().map(|(p, _)| p.memory).unique().collect()
    }

    /// Distinct population sizes, in sweep order.
    pub fn populations(&self) -> Vec<usize> {
        self.entries.iter().map(|(p, _)| p.population).unique().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::d;

    fn small(base: SimConfig) -> Sweep {
        Sweep::new(base)
            .with_intervals([10.0, 1.0])
            .with_memories([100, 200])
            .with_populations([5, 20])
    }

    #[test]
    fn covers_the_cross_product() {
        let sweep = small(SimConfig::open_stream(1, d(1.0), 1));
        let results = sweep.run().unwrap();
        assert_eq!(results.len(), 8);
        assert_eq!(results.intervals(), vec![d(10.0), d(1.0)]);
        assert_eq!(results.memories(), vec![100, 200]);
        assert_eq!(results.populations(), vec![5, 20]);
        for point in sweep.points() {
            assert!(results
                .get(point.interval, point.memory, point.population)
                .is_some());
        }
        assert!(results.get(d(5.0), 100, 5).is_none());
    }

    #[test]
    fn points_match_direct_runs() {
        let sweep = small(SimConfig::open_stream(1, d(1.0), 1));
        let results = sweep.run().unwrap();
        let point = SweepPoint {
            interval: d(1.0),
            memory: 200,
            population: 20,
        };
        let config = sweep.config_for(point);
        assert_eq!(
            config.mode,
            ArrivalMode::OpenStream {
                mean_interval: d(1.0)
            }
        );
        let (a, b) = simulate(&config).unwrap().waiting_times();
        let (x, y) = results.waiting_times(d(1.0), 200, 20).unwrap();
        assert_eq!(a.to_bits(), x.to_bits());
        assert_eq!(b.to_bits(), y.to_bits());
    }

    #[test]
    fn closed_sweeps_ignore_the_interval() {
        let results = small(SimConfig::fixed_population(1, 1)).run().unwrap();
        let (a, _) = results.waiting_times(d(10.0), 100, 20).unwrap();
        let (b, _) = results.waiting_times(d(1.0), 100, 20).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
        assert!(results.iter().all(|(p, s)| s.terminated == p.population));
    }

    #[test]
    fn rejects_bad_axes_up_front() {
        let base = SimConfig::fixed_population(1, 100);
        assert_eq!(
            Sweep::new(base.clone()).with_memories([]).run().unwrap_err(),
            SweepError::EmptyAxis("memory")
        );
        assert!(matches!(
            Sweep::new(base.clone()).with_populations([10, 0]).run(),
            Err(SweepError::InvalidPoint {
                source: ConfigError::ZeroPopulation,
                ..
            })
        ));
        assert!(matches!(
            Sweep::new(base.clone()).with_intervals([5.0, -1.0]).run(),
            Err(SweepError::InvalidPoint {
                source: ConfigError::InvalidInterval(_),
                ..
            })
        ));
        assert!(matches!(
            Sweep::new(base).with_memories([0]).validate(),
            Err(SweepError::InvalidPoint {
                source: ConfigError::ZeroMemoryCapacity,
                ..
            })
        ));
    }

    #[test]
    fn rejects_repeated_axis_values() {
        let base = SimConfig::open_stream(1, d(1.0), 1);
        assert_eq!(
            Sweep::new(base.clone())
                .with_intervals([10.0, 1.0, 10.0])
                .with_populations([5])
                .run()
                .unwrap_err(),
            SweepError::DuplicateAxisValue {
                axis: "interval",
                value: "10".to_string()
            }
        );
        assert_eq!(
            Sweep::new(base.clone())
                .with_memories([100, 100])
                .validate()
                .unwrap_err(),
            SweepError::DuplicateAxisValue {
                axis: "memory",
                value: "100".to_string()
            }
        );
        assert!(matches!(
            Sweep::new(base).with_populations([5, 20, 5]).validate(),
            Err(SweepError::DuplicateAxisValue {
                axis: "population",
                ..
            })
        ));
    }

    #[test]
    fn distinct_values_are_listed_once() {
        let summary = crate::stats::summarize(&[], Default::default(), crate::tests::t(0.0));
        let point = |interval, memory| SweepPoint {
            interval: d(interval),
            memory,
            population: 5,
        };
        let results = SweepResults {
            entries: vec![
                (point(10.0, 100), summary),
                (point(1.0, 200), summary),
                (point(10.0, 200), summary),
                (point(1.0, 100), summary),
            ],
        };
        assert_eq!(results.intervals(), vec![d(10.0), d(1.0)]);
        assert_eq!(results.memories(), vec![100, 200]);
        assert_eq!(results.populations(), vec![5]);
        assert_eq!(crate::report::curves(&results).len(), 4);
    }

    #[test]
    fn study_axes() {
        let sweep = Sweep::fixed_population();
        assert_eq!(sweep.points().count(), 3 * 2 * 5);
        assert_eq!(sweep.base().mode, ArrivalMode::FixedPopulation);
        assert!(matches!(
            Sweep::open_stream().base().mode,
            ArrivalMode::OpenStream { .. }
        ));
    }
}
