/*! Aggregation of waiting-time statistics over a finished run.

Processes are split into "blocked" and "never blocked" according to a
[Classification] rule, and the mean I/O wait is computed for each
group. A group without members has no mean: it is reported as `NaN`,
which callers are expected to tolerate. */

use crate::process::Process;
use crate::time::Instant;

/// Which processes count as blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Classification {
    /// Blocked iff the process is inside an I/O block when the run
    /// ends. A process that blocked earlier and has since left the
    /// block counts as never blocked.
    #[default]
    FinalFlag,
    /// Blocked iff the process entered at least one I/O block.
    EverBlocked,
}

impl Classification {
    pub fn is_blocked(&self, process: &Process) -> bool {
        match self {
            Classification::FinalFlag => process.waiting_io(),
            Classification::EverBlocked => process.ever_blocked(),
        }
    }
}

/// Aggregate results of one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Mean I/O wait of the processes classified as never blocked.
    pub average_waiting_time: f64,
    /// Mean I/O wait of the processes classified as blocked.
    pub io_average_waiting_time: f64,
    /// Mean time spent queued for the CPU or for memory, over all
    /// processes.
    pub average_ready_wait: f64,
    pub unblocked: usize,
    pub blocked: usize,
    pub terminated: usize,
}

impl Summary {
    /// The `(average_waiting_time, io_average_waiting_time)` pair.
    pub fn waiting_times(&self) -> (f64, f64) {
        (self.average_waiting_time, self.io_average_waiting_time)
    }

    pub fn processes(&self) -> usize {
        self.blocked + self.unblocked
    }
}

/// Arithmetic mean; `NaN` if there are no values.
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), x| (sum + x, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Summarize the processes of a run as observed at `observed_at`.
///
/// I/O waits include the elapsed part of blocks still in progress, which
/// only occur when the run was cut off before everything terminated.
pub fn summarize(processes: &[Process], rule: Classification, observed_at: Instant) -> Summary {
    let (blocked, unblocked): (Vec<&Process>, Vec<&Process>) =
        processes.iter().partition(|p| rule.is_blocked(p));
    let io_wait = |p: &&Process| p.io_wait_at(observed_at).as_f64();
    Summary {
        average_waiting_time: mean(unblocked.iter().map(io_wait)),
        io_average_waiting_time: mean(blocked.iter().map(io_wait)),
        average_ready_wait: mean(
            processes
                .iter()
                .map(|p| p.ready_wait_at(observed_at).as_f64()),
        ),
        unblocked: unblocked.len(),
        blocked: blocked.len(),
        terminated: processes.iter().filter(|p| p.is_terminated()).count(),
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;
    use crate::process::ProcessId;
    use crate::tests::t;

    fn finished(id: usize, io_blocks: &[(f64, f64)]) -> Process {
        let bursts = io_blocks.len().max(1);
        let mut p = Process::new(ProcessId::from(id), t(0.0), 1, 3 * bursts as u32);
        for i in 0..bursts {
            p.enqueue(t(0.0));
            p.dispatch(t(0.0));
            p.complete_burst(3);
            if let Some((from, until)) = io_blocks.get(i) {
                p.block(t(*from));
                p.unblock(t(*until));
            }
        }
        p.terminate(t(50.0));
        p
    }

    fn stuck_in_io(id: usize, since: f64) -> Process {
        let mut p = Process::new(ProcessId::from(id), t(0.0), 1, 6);
        p.enqueue(t(0.0));
        p.dispatch(t(0.0));
        p.complete_burst(3);
        p.block(t(since));
        p
    }

    #[test]
    fn mean_of_nothing_is_nan() {
        assert!(mean(std::iter::empty()).is_nan());
        assert_approx_eq!(mean([1.0, 2.0, 6.0]), 3.0);
    }

    #[test]
    fn empty_run_has_undefined_means() {
        let s = summarize(&[], Classification::FinalFlag, t(0.0));
        assert!(s.average_waiting_time.is_nan());
        assert!(s.io_average_waiting_time.is_nan());
        assert!(s.average_ready_wait.is_nan());
        assert_eq!(s.processes(), 0);
    }

    #[test]
    fn final_flag_ignores_finished_blocks() {
        let procs = vec![
            finished(0, &[]),
            finished(1, &[(3.0, 10.0)]),
            stuck_in_io(2, 20.0),
        ];
        let s = summarize(&procs, Classification::FinalFlag, t(25.0));
        assert_eq!(s.blocked, 1);
        assert_eq!(s.unblocked, 2);
        assert_eq!(s.terminated, 2);
        // (0 + 7) / 2
        assert_approx_eq!(s.average_waiting_time, 3.5);
        // in-flight block observed at 25
        assert_approx_eq!(s.io_average_waiting_time, 5.0);
    }

    #[test]
    fn ever_blocked_counts_history() {
        let procs = vec![
            finished(0, &[]),
            finished(1, &[(3.0, 10.0), (12.0, 13.0)]),
            stuck_in_io(2, 20.0),
        ];
        let s = summarize(&procs, Classification::EverBlocked, t(25.0));
        assert_eq!(s.blocked, 2);
        assert_eq!(s.unblocked, 1);
        assert_approx_eq!(s.average_waiting_time, 0.0);
        // (8 + 5) / 2
        assert_approx_eq!(s.io_average_waiting_time, 6.5);
    }

    #[test]
    fn nobody_blocked_leaves_blocked_mean_undefined() {
        let procs = vec![finished(0, &[]), finished(1, &[])];
        let s = summarize(&procs, Classification::EverBlocked, t(50.0));
        assert_eq!(s.waiting_times().0, 0.0);
        assert!(s.waiting_times().1.is_nan());
    }
}
