// src/ring/completion.rs
//! Completion delivery
//!
//! The executor hands every completion record to a [`CompletionSink`]. The
//! provided [`CompletionQueue`] stores them in a bounded lock-free queue
//! the submitter drains at its own pace.

use core::sync::atomic::{AtomicU64, Ordering};

use crossbeam_queue::ArrayQueue;
use log::warn;

use crate::abi::Completion;
use crate::errors::{Result, RtioError};

/// Receiver of completion records
///
/// Called with the executor lock held, possibly from interrupt context:
/// implementations must not block and must not call back into the executor.
pub trait CompletionSink: Send + Sync {
    /// Deliver one completion record
    fn emit(&self, cqe: Completion);
}

/// Bounded completion queue
///
/// When full, new records are dropped and counted rather than blocking
/// the executor.
#[derive(Debug)]
pub struct CompletionQueue {
    /// Pending records (lock-free)
    queue: ArrayQueue<Completion>,
    /// Records dropped because the queue was full
    dropped: AtomicU64,
}

impl CompletionQueue {
    /// Create a completion queue holding up to `capacity` records
    ///
    /// # Errors
    ///
    /// - `RtioError::InvalidQueueSize` - `capacity` is zero
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(RtioError::InvalidQueueSize);
        }
        Ok(Self {
            queue: ArrayQueue::new(capacity),
            dropped: AtomicU64::new(0),
        })
    }

    /// Take the oldest completion record
    pub fn consume(&self) -> Option<Completion> {
        self.queue.pop()
    }

    /// Take every pending completion record, oldest first
    pub fn drain(&self) -> impl Iterator<Item = Completion> + '_ {
        core::iter::from_fn(move || self.queue.pop())
    }

    /// Number of pending records
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if no record is pending
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Maximum number of pending records
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Records dropped on overflow since creation
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl CompletionSink for CompletionQueue {
    fn emit(&self, cqe: Completion) {
        if let Err(cqe) = self.queue.push(cqe) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            warn!(
                "[rtio] completion queue full, dropped cqe user_data={} result={}",
                cqe.user_data, cqe.result
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn test_fifo_delivery() {
        let cq = CompletionQueue::new(4).unwrap();
        cq.emit(Completion::new(0, 1, 0));
        cq.emit(Completion::new(-5, 2, 0));

        let tags: Vec<u64> = cq.drain().map(|cqe| cqe.user_data).collect();
        assert_eq!(tags, [1, 2]);
        assert!(cq.is_empty());
    }

    #[test]
    fn test_overflow_is_counted() {
        let cq = CompletionQueue::new(1).unwrap();
        cq.emit(Completion::new(0, 1, 0));
        cq.emit(Completion::new(0, 2, 0));

        assert_eq!(cq.len(), 1);
        assert_eq!(cq.dropped(), 1);
        assert_eq!(cq.consume().map(|cqe| cqe.user_data), Some(1));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(CompletionQueue::new(0).err(), Some(RtioError::InvalidQueueSize));
    }
}
