use assert_approx_eq::assert_approx_eq;

use crate::config::{MAX_INSTRUCTIONS, MAX_IO_DURATION, WAITING_IO_PROBABILITY};
use crate::source::{ScriptedSource, SeededSource, StochasticSource};
use crate::tests::d;

#[test]
fn exponential_gaps_converge_to_mean() {
    for mean in [1.0, 5.0, 10.0] {
        let mut src = SeededSource::new(42);
        let n = 10_000;
        let total: f64 = (0..n)
            .map(|_| src.inter_arrival(d(mean)).as_f64())
            .sum();
        // within 5% of the configured mean
        assert_approx_eq!(total / n as f64, mean, mean * 0.05);
    }
}

#[test]
fn exponential_gaps_are_valid_delays() {
    let mut src = SeededSource::new(7);
    for _ in 0..10_000 {
        assert!(src.inter_arrival(d(10.0)).is_valid_delay());
    }
}

#[test]
fn io_trials_converge_to_probability() {
    let mut src = SeededSource::new(42);
    let n = 100_000;
    let hits = (0..n)
        .filter(|_| src.blocks_on_io(WAITING_IO_PROBABILITY))
        .count();
    let fraction = hits as f64 / n as f64;
    assert_approx_eq!(fraction, WAITING_IO_PROBABILITY, WAITING_IO_PROBABILITY * 0.1);
}

#[test]
fn io_trials_at_the_extremes() {
    let mut src = SeededSource::new(3);
    assert!((0..1000).all(|_| !src.blocks_on_io(0.0)));
    assert!((0..1000).all(|_| src.blocks_on_io(1.0)));
}

#[test]
fn uniform_counts_cover_their_range() {
    let mut src = SeededSource::new(42);
    let mut seen = [false; MAX_INSTRUCTIONS as usize + 1];
    for _ in 0..10_000 {
        let n = src.instruction_count(MAX_INSTRUCTIONS);
        assert!((1..=MAX_INSTRUCTIONS).contains(&n));
        seen[n as usize] = true;
    }
    assert!(seen[1..].iter().all(|s| *s));

    for _ in 0..10_000 {
        let io = src.io_duration(MAX_IO_DURATION).as_f64();
        assert!((1.0..=MAX_IO_DURATION as f64).contains(&io));
        assert_eq!(io.fract(), 0.0);

        let mem = src.memory_required(100);
        assert!((1..=100).contains(&mem));
    }
}

#[test]
fn same_seed_same_sequence() {
    let mut a = SeededSource::new(1234);
    let mut b = SeededSource::new(1234);
    for _ in 0..1000 {
        assert_eq!(
            a.inter_arrival(d(5.0)).as_f64().to_bits(),
            b.inter_arrival(d(5.0)).as_f64().to_bits()
        );
        assert_eq!(a.instruction_count(10), b.instruction_count(10));
        assert_eq!(a.blocks_on_io(0.5), b.blocks_on_io(0.5));
    }
    assert_eq!(a.seed(), 1234);
}

#[test]
fn different_seeds_diverge() {
    let mut a = SeededSource::new(1);
    let mut b = SeededSource::new(2);
    let xs: Vec<u32> = (0..32).map(|_| a.instruction_count(1000)).collect();
    let ys: Vec<u32> = (0..32).map(|_| b.instruction_count(1000)).collect();
    assert_ne!(xs, ys);
}

#[test]
fn scripted_replay() {
    let mut src = ScriptedSource::new(7)
        .with_memory(50)
        .with_gaps([d(2.0), d(0.5)])
        .with_gap(d(4.0))
        .with_io_decisions([true, false]);

    assert_eq!(src.instruction_count(10), 7);
    assert_eq!(src.instruction_count(5), 5);
    assert_eq!(src.memory_required(20), 20);
    assert_eq!(src.inter_arrival(d(10.0)), d(2.0));
    assert_eq!(src.inter_arrival(d(10.0)), d(0.5));
    assert_eq!(src.inter_arrival(d(10.0)), d(4.0));
    assert!(src.blocks_on_io(0.0));
    assert!(!src.blocks_on_io(1.0));
    assert!(!src.blocks_on_io(1.0));
    assert_eq!(src.trials(), 3);
}

#[test]
fn sources_forward_through_references() {
    fn draw(mut src: impl StochasticSource) -> u32 {
        src.instruction_count(10)
    }
    let mut src = ScriptedSource::new(4);
    assert_eq!(draw(&mut src), 4);
    let boxed: Box<dyn StochasticSource> = Box::new(ScriptedSource::new(9));
    assert_eq!(draw(boxed), 9);
}
