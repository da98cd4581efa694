// src/ring/submission.rs
//! Submission queue
//!
//! Fixed capacity ring of [`Sqe`]s addressed by monotonically increasing
//! positions ([`SqeId`]). Three cursors move forward only:
//!
//! - `tail`: next position the producer writes
//! - `head`: oldest position not yet consumed by the executor
//! - `released`: oldest position whose storage is still held
//!
//! `released <= head <= tail` and `tail - released <= capacity` always hold
//! (wrapping arithmetic).

use alloc::vec::Vec;

use log::debug;

use crate::errors::{Result, RtioError};
use crate::sqe::{Sqe, SqeFlags};
use crate::sync::{InterruptController, IrqMutex};

/// Position of a request in the submission queue
///
/// Positions wrap at `u32::MAX`; only differences between positions are
/// meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SqeId(u32);

impl SqeId {
    pub(crate) const ZERO: Self = Self(0);

    #[cfg(test)]
    pub(crate) const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw position value
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Position immediately after this one
    #[inline]
    const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Ring state, guarded by the queue lock
#[derive(Debug)]
struct SqRing {
    entries: Vec<Option<Sqe>>,
    mask: u32,
    tail: u32,
    head: u32,
    released: u32,
}

impl SqRing {
    /// `id` lies in `[from, tail)`
    fn holds(&self, from: u32, id: SqeId) -> bool {
        id.0.wrapping_sub(from) < self.tail.wrapping_sub(from)
    }

    fn slot(&self, id: SqeId) -> usize {
        (id.0 & self.mask) as usize
    }
}

/// Submission queue shared by the producer and the executor
#[derive(Debug)]
pub struct SubmissionQueue {
    ring: IrqMutex<SqRing>,
    capacity: u32,
}

impl SubmissionQueue {
    /// Create a queue with `entries` slots (power of two)
    ///
    /// The ring lock is taken with interrupts masked through `irq`.
    ///
    /// # Errors
    ///
    /// - `RtioError::InvalidQueueSize` - `entries` is zero, not a power of
    ///   two, or does not fit the position space
    pub fn new(entries: usize, irq: &'static dyn InterruptController) -> Result<Self> {
        let capacity = u32::try_from(entries).map_err(|_| RtioError::InvalidQueueSize)?;
        if !capacity.is_power_of_two() {
            return Err(RtioError::InvalidQueueSize);
        }

        let mut slots = Vec::with_capacity(entries);
        slots.resize_with(entries, || None);

        Ok(Self {
            ring: IrqMutex::new(
                SqRing {
                    entries: slots,
                    mask: capacity - 1,
                    tail: 0,
                    head: 0,
                    released: 0,
                },
                irq,
            ),
            capacity,
        })
    }

    // ------------------------------------------------------------------------
    // Producer side
    // ------------------------------------------------------------------------

    /// Enqueue a request
    ///
    /// Nothing runs until the executor is told to submit.
    ///
    /// # Errors
    ///
    /// - `RtioError::QueueFull` - all storage is held by queued or in-flight
    ///   requests
    pub fn push(&self, sqe: Sqe) -> Result<SqeId> {
        self.ring.with(|ring| {
            if ring.tail.wrapping_sub(ring.released) >= self.capacity {
                return Err(RtioError::QueueFull);
            }

            let id = SqeId(ring.tail);
            let slot = ring.slot(id);
            ring.entries[slot] = Some(sqe);
            ring.tail = ring.tail.wrapping_add(1);
            Ok(id)
        })
    }

    /// Mark a queued request canceled
    ///
    /// A request canceled before the executor dispatches it is never handed
    /// to its device endpoint and completes with `-ECANCELED`. Canceling
    /// after dispatch has no effect on the running operation.
    ///
    /// # Errors
    ///
    /// - `RtioError::QueueEmpty` - `id` was already consumed or never produced
    pub fn cancel(&self, id: SqeId) -> Result<()> {
        self.ring.with(|ring| {
            if !ring.holds(ring.head, id) {
                return Err(RtioError::QueueEmpty);
            }

            let slot = ring.slot(id);
            let sqe = ring.entries[slot].as_mut().ok_or(RtioError::QueueEmpty)?;
            sqe.flags |= SqeFlags::CANCELED;
            debug!("[rtio] canceled sqe {}", id.0);
            Ok(())
        })
    }

    /// Number of requests not yet consumed
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.with(|ring| ring.tail.wrapping_sub(ring.head) as usize)
    }

    /// Check if every request has been consumed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity as usize
    }

    // ------------------------------------------------------------------------
    // Consumer side (executor)
    // ------------------------------------------------------------------------

    /// Oldest request not yet consumed
    #[must_use]
    pub fn peek_head(&self) -> Option<SqeId> {
        self.ring.with(|ring| (ring.head != ring.tail).then_some(SqeId(ring.head)))
    }

    /// Request queued immediately after `id`, without consuming anything
    #[must_use]
    pub fn next_after(&self, id: SqeId) -> Option<SqeId> {
        let next = id.next();
        self.ring.with(|ring| ring.holds(ring.head, next).then_some(next))
    }

    /// Advance the consumption cursor past the oldest request
    ///
    /// The request's storage stays valid until [`release`](Self::release).
    pub fn consume_front(&self) -> Option<SqeId> {
        self.ring.with(|ring| {
            if ring.head == ring.tail {
                return None;
            }

            let id = SqeId(ring.head);
            ring.head = ring.head.wrapping_add(1);
            Some(id)
        })
    }

    /// Return a consumed request's storage to the producer
    ///
    /// Releases happen in consumption order.
    pub fn release(&self, id: SqeId) {
        self.ring.with(|ring| {
            debug_assert_eq!(id.0, ring.released, "submission queue released out of order");
            debug_assert_ne!(ring.released, ring.head, "release of an unconsumed request");
            if id.0 != ring.released || ring.released == ring.head {
                return;
            }

            let slot = ring.slot(id);
            ring.entries[slot] = None;
            ring.released = ring.released.wrapping_add(1);
        });
    }

    /// Snapshot of a request that still holds storage
    #[must_use]
    pub fn get(&self, id: SqeId) -> Option<Sqe> {
        self.ring.with(|ring| {
            if !ring.holds(ring.released, id) {
                return None;
            }
            ring.entries[ring.slot(id)].clone()
        })
    }

    /// Flags of a request that still holds storage
    #[must_use]
    pub fn flags(&self, id: SqeId) -> Option<SqeFlags> {
        self.ring.with(|ring| {
            if !ring.holds(ring.released, id) {
                return None;
            }
            ring.entries[ring.slot(id)].as_ref().map(|sqe| sqe.flags)
        })
    }
}
