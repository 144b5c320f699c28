use std::collections::VecDeque;

use super::Grant;
use crate::process::ProcessId;

/// A scalar memory budget.
///
/// Reservations are admitted in strict FIFO order: a request that does
/// not fit blocks everybody queued behind it, even smaller requests
/// that would fit. The invariant `0 <= available <= capacity` always
/// holds.
#[derive(Debug, Clone)]
pub struct MemoryBudget {
    capacity: u64,
    available: u64,
    lowest_available: u64,
    waiters: VecDeque<(ProcessId, u64)>,
}

impl MemoryBudget {
    pub fn new(capacity: u64) -> Self {
        MemoryBudget {
            capacity,
            available: capacity,
            lowest_available: capacity,
            waiters: VecDeque::new(),
        }
    }

    /// Reserve `amount` units for `process`, or queue the request.
    ///
    /// Panics if `amount` exceeds the total capacity, since such a
    /// request could never be admitted.
    pub fn reserve(&mut self, process: ProcessId, amount: u64) -> Grant {
        assert!(
            amount <= self.capacity,
            "{} requests {} units of a budget of {}",
            process,
            amount,
            self.capacity
        );
        if self.waiters.is_empty() && amount <= self.available {
            self.take(amount);
            Grant::Granted
        } else {
            self.waiters.push_back((process, amount));
            Grant::Queued {
                position: self.waiters.len() - 1,
            }
        }
    }

    /// Return `amount` units to the budget and admit as many queued
    /// requests as now fit, in queue order. Returns the admitted
    /// processes.
    pub fn release(&mut self, amount: u64) -> Vec<ProcessId> {
        assert!(
            self.available + amount <= self.capacity,
            "releasing {} units overflows a budget of {} ({} available)",
            amount,
            self.capacity,
            self.available
        );
        self.available += amount;
        let mut admitted = Vec::new();
        while let Some(&(process, need)) = self.waiters.front() {
            if need > self.available {
                break;
            }
            self.waiters.pop_front();
            self.take(need);
            admitted.push(process);
        }
        admitted
    }

    fn take(&mut self, amount: u64) {
        self.available -= amount;
        self.lowest_available = self.lowest_available.min(self.available);
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn available(&self) -> u64 {
        self.available
    }

    pub fn in_use(&self) -> u64 {
        self.capacity - self.available
    }

    /// Largest amount ever reserved at the same time.
    pub fn peak_usage(&self) -> u64 {
        self.capacity - self.lowest_available
    }

    pub fn waiting(&self) -> usize {
        self.waiters.len()
    }
}
