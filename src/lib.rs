/*! A discrete-event simulation of a multiprogrammed computer.

Processes arrive, reserve memory, compete for a single CPU in bursts of
a fixed number of instructions, occasionally block for I/O, and
terminate once their instructions are exhausted. A run reports how long
processes waited on average, split by whether they ended up blocked for
I/O.

The crate is organized bottom-up:

- [time]: virtual instants and durations,
- [source]: seeded and scripted sources of randomness,
- [process]: the per-process state machine and its bookkeeping,
- [resource]: the FIFO CPU and the FIFO memory budget,
- [arrival]: process creation and arrival policies,
- [engine]: the event loop that ties everything together,
- [stats]: waiting-time aggregation,
- [sweep] and [report]: the parameter study built on top.

A single run is one call:

```
use multiprog_sim::{simulate, SimConfig};

let outcome = simulate(&SimConfig::fixed_population(25, 100)).unwrap();
assert_eq!(outcome.terminated(), 25);
```
*/

pub mod arrival;
pub mod config;
pub mod engine;
pub mod process;
pub mod report;
pub mod resource;
pub mod source;
pub mod stats;
pub mod sweep;
pub mod time;

pub use config::{ArrivalMode, ConfigError, CpuRelease, MemoryPolicy, SimConfig};
pub use engine::{simulate, Outcome, SimError, Simulation};
pub use stats::{Classification, Summary};
pub use sweep::{Sweep, SweepError, SweepResults};

#[cfg(test)]
mod tests {
    use crate::time::{Duration, Instant};
    use crate::{simulate, ArrivalMode, SimConfig};
    use assert_approx_eq::assert_approx_eq;

    pub fn d(x: f64) -> Duration {
        Duration::from(x)
    }

    pub fn t(x: f64) -> Instant {
        Instant::from(x)
    }

    #[test]
    fn closed_study_point() {
        let outcome = simulate(&SimConfig::fixed_population(100, 200)).unwrap();
        let summary = outcome.summary;
        assert_eq!(summary.terminated, 100);
        assert_eq!(summary.processes(), 100);
        assert!(summary.average_waiting_time > 0.0);
        assert!(outcome.peak_memory <= 200);
        assert_approx_eq!(
            outcome.cpu_utilization(),
            outcome.occupancy.iter().map(|o| o.length().as_f64()).sum::<f64>()
                / outcome.end_time.as_f64(),
            1e-9
        );
    }

    #[test]
    fn open_study_point() {
        let config = SimConfig::open_stream(50, d(5.0), 100);
        assert!(matches!(config.mode, ArrivalMode::OpenStream { .. }));
        let outcome = simulate(&config).unwrap();
        assert_eq!(outcome.processes.len(), 50);
        assert!(outcome.end_time > t(0.0));
    }

    #[test]
    fn same_seed_same_summary() {
        let config = SimConfig::open_stream(100, d(1.0), 100).with_seed(7);
        let a = simulate(&config).unwrap().summary;
        let b = simulate(&config).unwrap().summary;
        assert_eq!(
            a.average_waiting_time.to_bits(),
            b.average_waiting_time.to_bits()
        );
        assert_eq!(
            a.io_average_waiting_time.to_bits(),
            b.io_average_waiting_time.to_bits()
        );
        assert_eq!(a.blocked, b.blocked);
    }
}
