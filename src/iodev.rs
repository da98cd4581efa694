// src/iodev.rs
//! Device endpoints
//!
//! An [`Iodev`] accepts one step at a time through [`Iodev::submit`] and
//! reports it back exactly once:
//!
//! - synchronously, by calling [`IoSqe::ok`] / [`IoSqe::err`] before
//!   `submit` returns
//! - asynchronously, by keeping the [`PendingSqe`] from [`IoSqe::defer`]
//!   and completing it later from any context
//!
//! Dropping an [`IoSqe`] without either leaves its task in flight forever.

use alloc::sync::Arc;
use core::fmt;

use crate::executor::{Locked, Outcome, Rtio, TaskId};
use crate::ring::{SqeId, SubmissionQueue};
use crate::sqe::{Sqe, SqeFlags};

/// Device endpoint
pub trait Iodev: Send + Sync {
    /// Start the step described by `sqe`
    ///
    /// Called with the executor lock held and interrupts masked. The
    /// endpoint must not block,
    /// must not call [`Rtio::submit_all`] and must not complete a
    /// [`PendingSqe`] from here.
    fn submit(&self, sqe: IoSqe<'_>);

    /// Short name for diagnostics
    fn name(&self) -> &'static str {
        "iodev"
    }
}

// ============================================================================
// In-context completion handle
// ============================================================================

/// Step handed to [`Iodev::submit`]
///
/// Borrows the executor's locked state for the duration of the call.
pub struct IoSqe<'a> {
    exec: Locked<'a>,
    task: TaskId,
    id: SqeId,
    sqe: Sqe,
}

impl<'a> IoSqe<'a> {
    pub(crate) fn new(exec: Locked<'a>, task: TaskId, id: SqeId, sqe: Sqe) -> Self {
        Self { exec, task, id, sqe }
    }

    /// Request being executed (first member for a transaction)
    #[must_use]
    pub fn sqe(&self) -> &Sqe {
        &self.sqe
    }

    /// Queue position of the request
    #[must_use]
    pub fn id(&self) -> SqeId {
        self.id
    }

    /// Task the request belongs to
    #[must_use]
    pub fn task(&self) -> TaskId {
        self.task
    }

    /// Every request of this step, first member included
    ///
    /// A device that supports transactions walks these to submit the whole
    /// step as one operation.
    #[must_use]
    pub fn transaction(&self) -> Transaction<'_> {
        Transaction {
            sq: self.exec.rtio().sq(),
            next: Some(self.id),
        }
    }

    /// Report success; the result is copied to every member's record
    pub fn ok(mut self, result: i32) {
        self.exec.complete_ok(self.task, result);
    }

    /// Report failure; the rest of the group is canceled
    pub fn err(mut self, result: i32) {
        self.exec.complete_err(self.task, result);
    }

    /// Detach from the executor lock to complete later
    pub fn defer(self) -> PendingSqe {
        PendingSqe {
            rtio: Arc::clone(self.exec.rtio()),
            task: self.task,
            id: self.id,
            sqe: self.sqe,
        }
    }
}

impl fmt::Debug for IoSqe<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IoSqe")
            .field("task", &self.task)
            .field("id", &self.id)
            .field("sqe", &self.sqe)
            .finish_non_exhaustive()
    }
}

/// Members of one transaction step
#[derive(Debug)]
pub struct Transaction<'a> {
    sq: &'a SubmissionQueue,
    next: Option<SqeId>,
}

impl Iterator for Transaction<'_> {
    type Item = (SqeId, Sqe);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        let sqe = self.sq.get(id)?;
        if sqe.flags.contains(SqeFlags::TRANSACTION) {
            self.next = self.sq.next_after(id);
        }
        Some((id, sqe))
    }
}

// ============================================================================
// Deferred completion handle
// ============================================================================

/// Step whose completion arrives after [`Iodev::submit`] returned
///
/// `Send`, so it can be handed to a worker thread or stored for an
/// interrupt handler. Completing it takes the executor lock.
#[must_use = "a pending step must be completed with ok() or err()"]
pub struct PendingSqe {
    rtio: Arc<Rtio>,
    task: TaskId,
    id: SqeId,
    sqe: Sqe,
}

impl PendingSqe {
    /// Request being executed
    pub fn sqe(&self) -> &Sqe {
        &self.sqe
    }

    /// Queue position of the request
    pub fn id(&self) -> SqeId {
        self.id
    }

    /// Task the request belongs to
    pub fn task(&self) -> TaskId {
        self.task
    }

    /// Report success
    pub fn ok(self, result: i32) {
        self.rtio.complete(self.task, self.id, Outcome::Ok(result));
    }

    /// Report failure
    pub fn err(self, result: i32) {
        self.rtio.complete(self.task, self.id, Outcome::Err(result));
    }
}

impl fmt::Debug for PendingSqe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingSqe")
            .field("task", &self.task)
            .field("id", &self.id)
            .field("sqe", &self.sqe)
            .finish_non_exhaustive()
    }
}
