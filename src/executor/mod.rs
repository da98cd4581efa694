// src/executor/mod.rs
//! Concurrent executor
//!
//! Admits up to `task_count` request groups into flight, dispatches them to
//! their device endpoints and turns device callbacks into completion
//! records.
//!
//! # Control flow
//!
//! ```text
//! submit_all ──► resume loop: prepare ─► dispatch oldest suspended ──► Iodev::submit
//!                      ▲                                                   │
//!                      │                              IoSqe::ok/err (same stack)
//!                      │                      PendingSqe::ok/err (later, any core)
//!                      │                                                   ▼
//!                      └──────── sweep ◄──── complete_ok / complete_err ──► CompletionSink
//! ```
//!
//! Only one resume loop runs at a time. A completion arriving while it runs
//! (synchronously from inside `submit`) records its outcome, sweeps, and
//! leaves any follow-up step suspended for the loop to pick up, so stack
//! depth stays constant however many requests finish in one call.
//!
//! # Locking
//!
//! One spin lock guards the task table and the admission cursor. It is only
//! ever held with interrupts masked through the [`InterruptController`]
//! given at construction, so a completion from an interrupt handler cannot
//! deadlock against its own core. Every
//! engine runs on a [`Locked`] borrow of that state, which only exists
//! while the lock is held. Device dispatch happens with the lock held: the
//! [`IoSqe`](crate::iodev::IoSqe) handed to the device carries the borrow,
//! so a synchronous completion reuses it instead of locking again. Only a
//! [`PendingSqe`](crate::iodev::PendingSqe), completed outside `submit`,
//! acquires the lock itself.

mod complete;
mod prepare;
mod resume;
mod sweep;
pub mod task;

use alloc::sync::Arc;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

use log::debug;

use crate::abi::errno::ECANCELED;
use crate::abi::Completion;
use crate::config::RtioConfig;
use crate::errors::Result;
use crate::ring::{CompletionSink, SqeId, SubmissionQueue};
use crate::sqe::{Sqe, SqeFlags};
use crate::sync::{InterruptController, IrqMutex};

pub use task::{TaskId, TaskState};
use task::TaskTable;

// ============================================================================
// Statistics
// ============================================================================

/// Executor statistics snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RtioStats {
    /// Request groups admitted into the task table
    pub tasks_admitted: u64,
    /// Task slots reclaimed
    pub tasks_reclaimed: u64,
    /// Steps handed to a device endpoint or run by the executor
    pub steps_dispatched: u64,
    /// Completion records emitted
    pub completions: u64,
    /// Completion records carrying `-ECANCELED`
    pub canceled: u64,
    /// Completion records carrying any other failure
    pub errors: u64,
    /// Tasks currently live in the table
    pub in_flight: u32,
}

/// Monotonic counters behind [`RtioStats`]
#[derive(Debug, Default)]
struct Counters {
    tasks_admitted: AtomicU64,
    tasks_reclaimed: AtomicU64,
    steps_dispatched: AtomicU64,
    completions: AtomicU64,
    canceled: AtomicU64,
    errors: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

// ============================================================================
// Executor
// ============================================================================

/// How a device finished a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Step succeeded with this result
    Ok(i32),
    /// Step failed with this result code
    Err(i32),
}

/// State guarded by the executor lock
#[derive(Debug)]
pub(crate) struct Core {
    tasks: TaskTable,
    /// Terminator of the most recently admitted group; scanning resumes
    /// after it. `None` means scan from the queue head.
    cursor: Option<SqeId>,
    /// A resume loop is running further up the stack
    resuming: bool,
}

/// Asynchronous I/O executor
///
/// Owns the submission queue, the task table and the critical section.
/// Completion records go to the sink given at construction.
pub struct Rtio {
    sq: SubmissionQueue,
    cq: Arc<dyn CompletionSink>,
    core: IrqMutex<Core>,
    stats: Counters,
}

impl Rtio {
    /// Create an executor
    ///
    /// `irq` masks interrupts around every critical section; pass
    /// [`NoInterrupts`](crate::sync::NoInterrupts) when completions never
    /// come from interrupt context.
    ///
    /// # Errors
    ///
    /// - `RtioError::InvalidTaskCount` / `RtioError::InvalidQueueSize` -
    ///   `config` failed validation
    pub fn new(
        config: RtioConfig,
        cq: Arc<dyn CompletionSink>,
        irq: &'static dyn InterruptController,
    ) -> Result<Arc<Self>> {
        config.validate()?;

        debug!(
            "[rtio] executor created: {} tasks, {} sq entries",
            config.task_count, config.sq_entries
        );

        Ok(Arc::new(Self {
            sq: SubmissionQueue::new(config.sq_entries, irq)?,
            cq,
            core: IrqMutex::new(
                Core {
                    tasks: TaskTable::new(config.task_count),
                    cursor: None,
                    resuming: false,
                },
                irq,
            ),
            stats: Counters::default(),
        }))
    }

    /// Submission queue to enqueue requests on
    #[must_use]
    pub fn sq(&self) -> &SubmissionQueue {
        &self.sq
    }

    /// Admit and dispatch queued request groups
    ///
    /// Call after enqueuing one or more complete request groups. Never
    /// blocks; groups that find no free task slot stay queued and are
    /// admitted as earlier tasks are reclaimed.
    ///
    /// # Returns
    /// Number of request groups admitted during this call
    pub fn submit_all(self: &Arc<Self>) -> u32 {
        self.core.with(|core| {
            let before = core.tasks.admitted();

            Locked::new(self, core).resume();

            core.tasks.admitted().wrapping_sub(before)
        })
    }

    /// Number of tasks currently in flight
    #[must_use]
    pub fn in_flight(&self) -> u32 {
        self.core.with(|core| core.tasks.len())
    }

    /// Size of the task table
    #[must_use]
    pub fn task_count(&self) -> u32 {
        self.core.with(|core| core.tasks.capacity())
    }

    /// Statistics snapshot
    #[must_use]
    pub fn stats(&self) -> RtioStats {
        RtioStats {
            tasks_admitted: self.stats.tasks_admitted.load(Ordering::Relaxed),
            tasks_reclaimed: self.stats.tasks_reclaimed.load(Ordering::Relaxed),
            steps_dispatched: self.stats.steps_dispatched.load(Ordering::Relaxed),
            completions: self.stats.completions.load(Ordering::Relaxed),
            canceled: self.stats.canceled.load(Ordering::Relaxed),
            errors: self.stats.errors.load(Ordering::Relaxed),
            in_flight: self.in_flight(),
        }
    }

    /// Complete a step from outside the lock
    pub(crate) fn complete(self: &Arc<Self>, task: TaskId, sqe: SqeId, outcome: Outcome) {
        self.core.with(|core| {
            let mut exec = Locked::new(self, core);
            if !exec.is_current_step(task, sqe) {
                return;
            }
            match outcome {
                Outcome::Ok(result) => exec.complete_ok(task, result),
                Outcome::Err(result) => exec.complete_err(task, result),
            }
        });
    }
}

impl fmt::Debug for Rtio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rtio")
            .field("sq", &self.sq)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Locked state
// ============================================================================

/// Executor state borrowed under the held lock
///
/// Holding one of these is the proof that the critical section is entered.
pub(crate) struct Locked<'a> {
    rtio: &'a Arc<Rtio>,
    core: &'a mut Core,
}

impl<'a> Locked<'a> {
    pub(crate) fn new(rtio: &'a Arc<Rtio>, core: &'a mut Core) -> Self {
        Self { rtio, core }
    }

    /// Shorter borrow of the same locked state
    pub(crate) fn reborrow(&mut self) -> Locked<'_> {
        Locked {
            rtio: self.rtio,
            core: &mut *self.core,
        }
    }

    pub(crate) fn rtio(&self) -> &'a Arc<Rtio> {
        self.rtio
    }

    /// Whether `sqe` is the step `task` is currently waiting on
    pub(crate) fn is_current_step(&self, task: TaskId, sqe: SqeId) -> bool {
        let current = self.core.tasks.state(task) == TaskState::Dispatched
            && self.core.tasks.current(task) == Some(sqe);
        debug_assert!(current, "completion for task {} sqe {} that is not in flight", task.as_u32(), sqe.as_u32());
        current
    }

    /// Snapshot of a request owned by a live task
    fn request(&self, id: SqeId) -> Option<Sqe> {
        let sqe = self.rtio.sq.get(id);
        debug_assert!(sqe.is_some(), "sqe {} released while still in use", id.as_u32());
        sqe
    }

    fn flags(&self, id: SqeId) -> SqeFlags {
        let flags = self.rtio.sq.flags(id);
        debug_assert!(flags.is_some(), "sqe {} released while still in use", id.as_u32());
        flags.unwrap_or(SqeFlags::empty())
    }

    /// Next request of the same group
    ///
    /// A linked request without a successor is a malformed group.
    fn successor(&self, id: SqeId) -> Option<SqeId> {
        let next = self.rtio.sq.next_after(id);
        debug_assert!(next.is_some(), "sqe {} is linked but has no successor", id.as_u32());
        next
    }

    /// Emit the completion record for one request
    fn emit(&self, id: SqeId, result: i32) {
        let Some(sqe) = self.request(id) else {
            return;
        };

        let cqe = Completion::new(result, sqe.user_data, sqe.completion_flags().bits());

        #[cfg(feature = "cqe_trace")]
        log::trace!("[rtio] cqe sqe={} user_data={} result={}", id.as_u32(), cqe.user_data, cqe.result);

        Counters::bump(&self.rtio.stats.completions);
        if result == -ECANCELED {
            Counters::bump(&self.rtio.stats.canceled);
        } else if result < 0 {
            Counters::bump(&self.rtio.stats.errors);
        }

        self.rtio.cq.emit(cqe);
    }
}

impl fmt::Debug for Locked<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locked").field("core", &self.core).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RtioError;
    use crate::ring::CompletionQueue;
    use crate::sync::NoInterrupts;

    fn sink() -> Arc<CompletionQueue> {
        Arc::new(CompletionQueue::new(8).unwrap())
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = RtioConfig::default().with_task_count(3);
        assert_eq!(Rtio::new(config, sink(), &NoInterrupts).err(), Some(RtioError::InvalidTaskCount));

        let config = RtioConfig::default().with_sq_entries(0);
        assert_eq!(Rtio::new(config, sink(), &NoInterrupts).err(), Some(RtioError::InvalidQueueSize));
    }

    #[test]
    fn test_sizes_follow_config() {
        let config = RtioConfig::default().with_task_count(8).with_sq_entries(16);
        let rtio = Rtio::new(config, sink(), &NoInterrupts).unwrap();
        assert_eq!(rtio.task_count(), 8);
        assert_eq!(rtio.sq().capacity(), 16);
        assert_eq!(rtio.in_flight(), 0);
    }
}
