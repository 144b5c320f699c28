use std::collections::VecDeque;

use super::Grant;
use crate::process::ProcessId;
use crate::time::{Duration, Instant};

/// One contiguous stretch of time during which a process held the CPU.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Occupancy {
    pub process: ProcessId,
    pub from: Instant,
    pub until: Instant,
}

impl Occupancy {
    pub fn length(&self) -> Duration {
        self.until - self.from
    }
}

/// A single processor without preemption.
///
/// At most one process holds the CPU at any time. Everybody else waits
/// in arrival order of their requests. Every completed holding period
/// is kept in an occupancy log.
#[derive(Debug, Clone, Default)]
pub struct Cpu {
    holder: Option<(ProcessId, Instant)>,
    queue: VecDeque<ProcessId>,
    log: Vec<Occupancy>,
}

impl Cpu {
    pub fn new() -> Self {
        Cpu::default()
    }

    /// Request the CPU on behalf of `process`.
    pub fn acquire(&mut self, process: ProcessId, now: Instant) -> Grant {
        debug_assert!(self.holder.map(|(p, _)| p) != Some(process));
        debug_assert!(!self.queue.contains(&process));
        if self.holder.is_none() {
            self.holder = Some((process, now));
            Grant::Granted
        } else {
            self.queue.push_back(process);
            Grant::Queued {
                position: self.queue.len() - 1,
            }
        }
    }

    /// Give up the CPU. The head of the wait queue, if any, becomes the
    /// new holder as of `now` and is returned.
    ///
    /// Panics if `process` does not hold the CPU.
    pub fn release(&mut self, process: ProcessId, now: Instant) -> Option<ProcessId> {
        let (holder, since) = self
            .holder
            .take()
            .unwrap_or_else(|| panic!("{} released an idle CPU", process));
        assert_eq!(holder, process, "{} released a CPU held by {}", process, holder);
        self.log.push(Occupancy {
            process,
            from: since,
            until: now,
        });
        let next = self.queue.pop_front();
        self.holder = next.map(|p| (p, now));
        next
    }

    pub fn holder(&self) -> Option<ProcessId> {
        self.holder.map(|(p, _)| p)
    }

    pub fn is_idle(&self) -> bool {
        self.holder.is_none()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Completed holding periods, in release order.
    pub fn occupancy(&self) -> &[Occupancy] {
        &self.log
    }

    /// Total time the CPU was held, over completed holding periods.
    pub fn busy_time(&self) -> Duration {
        self.log.iter().map(Occupancy::length).sum()
    }

    pub fn into_occupancy(self) -> Vec<Occupancy> {
        self.log
    }
}
