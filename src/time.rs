/*! Virtual time.

The simulation advances a continuous virtual clock that is unrelated to
wall-clock time. Exponentially distributed arrival gaps make the clock
non-integral, so both types wrap an `f64`. */

use std::cmp::Ordering;
use std::ops::{Add, Sub};

/// A point on the virtual clock.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    PartialOrd,
    Default,
    derive_more::From,
    derive_more::Into,
    derive_more::Display,
)]
pub struct Instant(f64);

/// Length of an interval on the virtual clock.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    PartialOrd,
    Default,
    derive_more::Add,
    derive_more::Sub,
    derive_more::AddAssign,
    derive_more::Sum,
    derive_more::From,
    derive_more::Into,
    derive_more::Display,
)]
pub struct Duration(f64);

impl Instant {
    /// The instant at which every run starts.
    pub const fn zero() -> Instant {
        Instant(0.0)
    }

    /// Offset of this instant from time zero.
    pub fn since_time_zero(self) -> Duration {
        Duration(self.0)
    }

    pub fn as_f64(self) -> f64 {
        self.0
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Total order over instants, used to key the event queue.
    pub fn total_cmp(&self, other: &Instant) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Duration {
    pub const fn zero() -> Duration {
        Duration(0.0)
    }

    pub fn as_f64(self) -> f64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }

    pub fn is_non_zero(self) -> bool {
        !self.is_zero()
    }

    /// A sample is usable as a timer length only if it is finite and
    /// not negative.
    pub fn is_valid_delay(self) -> bool {
        self.0.is_finite() && self.0 >= 0.0
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, delta: Duration) -> Instant {
        Instant(self.0 + delta.0)
    }
}

impl Sub for Instant {
    type Output = Duration;

    fn sub(self, earlier: Instant) -> Duration {
        Duration(self.0 - earlier.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instant_arithmetic() {
        let t = Instant::from(3.0) + Duration::from(4.5);
        assert_eq!(t, Instant::from(7.5));
        assert_eq!(t - Instant::from(2.5), Duration::from(5.0));
        assert_eq!(t.since_time_zero(), Duration::from(7.5));
    }

    #[test]
    fn durations_sum() {
        let total: Duration = [1.0, 2.0, 3.5].iter().copied().map(Duration::from).sum();
        assert_eq!(total, Duration::from(6.5));
        assert!(Duration::zero().is_zero());
        assert!(total.is_non_zero());
    }

    #[test]
    fn delay_validity() {
        assert!(Duration::zero().is_valid_delay());
        assert!(Duration::from(2.0).is_valid_delay());
        assert!(!Duration::from(-1.0).is_valid_delay());
        assert!(!Duration::from(f64::NAN).is_valid_delay());
        assert!(!Duration::from(f64::INFINITY).is_valid_delay());
    }
}
