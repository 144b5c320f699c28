/*! Plain-text presentation of sweep results.

Each (memory, interval) pair of a sweep yields one [Curve] of average
waiting time over population size. */

use std::fmt;

use itertools::{iproduct, Itertools};

use crate::sweep::SweepResults;
use crate::time::Duration;

/// Average waiting time as a function of population size, for one memory
/// capacity and one arrival interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub memory: u64,
    pub interval: Duration,
    pub points: Vec<(usize, f64)>,
}

impl Curve {
    pub fn label(&self) -> String {
        format!("Memory: {}, Interval: {}", self.memory, self.interval)
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.label(),
            self.points
                .iter()
                .map(|(n, w)| format!("({}, {:.3})", n, w))
                .join(", ")
        )
    }
}

/// One curve per (interval, memory) pair, in sweep order.
pub fn curves(results: &SweepResults) -> Vec<Curve> {
    let populations = results.populations();
    iproduct!(results.intervals(), results.memories())
        .map(|(interval, memory)| Curve {
            memory,
            interval,
            points: populations
                .iter()
                .filter_map(|&n| {
                    results
                        .get(interval, memory, n)
                        .map(|s| (n, s.average_waiting_time))
                })
                .collect(),
        })
        .collect()
}

/// A table with one row per curve and one column per population size.
/// Empty partitions show up as `NaN`.
pub fn render(results: &SweepResults) -> String {
    const LABEL_WIDTH: usize = 28;
    let populations = results.populations();
    let header = format!(
        "{:<width$}{}",
        "Average waiting time",
        populations.iter().map(|n| format!("{:>10}", n)).join(""),
        width = LABEL_WIDTH
    );
    let rows = curves(results).into_iter().map(|curve| {
        let cells = populations
            .iter()
            .map(|n| {
                curve
                    .points
                    .iter()
                    .find(|(m, _)| m == n)
                    .map(|(_, w)| format!("{:>10.3}", w))
                    .unwrap_or_else(|| format!("{:>10}", "-"))
            })
            .join("");
        format!("{:<width$}{}", curve.label(), cells, width = LABEL_WIDTH)
    });
    let mut out = std::iter::once(header).chain(rows).join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::sweep::Sweep;
    use crate::tests::d;

    fn results() -> SweepResults {
        Sweep::new(SimConfig::open_stream(1, d(1.0), 1))
            .with_intervals([10.0, 1.0])
            .with_memories([100, 200])
            .with_populations([5, 10, 20])
            .run()
            .unwrap()
    }

    #[test]
    fn one_curve_per_memory_and_interval() {
        let results = results();
        let curves = curves(&results);
        assert_eq!(curves.len(), 4);
        assert_eq!(curves[0].label(), "Memory: 100, Interval: 10");
        assert_eq!(curves[1].label(), "Memory: 200, Interval: 10");
        assert_eq!(curves[3].label(), "Memory: 200, Interval: 1");
        for curve in &curves {
            let ns: Vec<usize> = curve.points.iter().map(|(n, _)| *n).collect();
            assert_eq!(ns, vec![5, 10, 20]);
            for (n, w) in &curve.points {
                let expected = results
                    .get(curve.interval, curve.memory, *n)
                    .unwrap()
                    .average_waiting_time;
                assert_eq!(w.to_bits(), expected.to_bits());
            }
        }
    }

    #[test]
    fn table_has_a_row_per_curve() {
        let table = render(&results());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("Average waiting time"));
        assert!(lines[0].ends_with("20"));
        assert!(lines[1].starts_with("Memory: 100, Interval: 10"));
    }

    #[test]
    fn table_columns_line_up() {
        let table = render(&results());
        assert!(table.ends_with('\n'));
        // label column plus one ten-wide cell per population
        assert!(table.lines().all(|line| line.len() == 28 + 3 * 10));
    }

    #[test]
    fn empty_results_render_a_header_only() {
        let table = render(&SweepResults::default());
        assert_eq!(table.lines().count(), 1);
        assert!(curves(&SweepResults::default()).is_empty());
    }

    #[test]
    fn display_lists_points() {
        let curve = Curve {
            memory: 100,
            interval: d(5.0),
            points: vec![(25, 1.5), (50, f64::NAN)],
        };
        assert_eq!(
            curve.to_string(),
            "Memory: 100, Interval: 5: (25, 1.500), (50, NaN)"
        );
    }
}
