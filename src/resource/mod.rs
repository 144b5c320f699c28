/*! Shared resources processes contend for.

The [Cpu] is a mutual-exclusion server of capacity one, the
[MemoryBudget] a counting resource. Both serve waiters in strict FIFO
order. Neither knows about the event queue: a grant is reported back to
the caller, which then schedules the grantee's resumption. */

mod cpu;
mod memory;

pub use cpu::{Cpu, Occupancy};
pub use memory::MemoryBudget;

/// Result of a request for a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// The requester holds the resource as of now.
    Granted,
    /// The requester has to wait; `position` is its zero-based place in
    /// the wait queue.
    Queued { position: usize },
}
