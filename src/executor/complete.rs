// src/executor/complete.rs
//! Completion engine
//!
//! Device endpoints report each dispatched step exactly once, either
//! synchronously from inside `submit` or later from any context. A step is
//! the current request plus every request linked to it by `TRANSACTION`;
//! the step's last member decides, through `CHAINED`, whether the task
//! continues.
//!
//! ```text
//! ok:   emit one record per step member ─► sweep ─► suspend on next link | mark complete
//! err:  emit failing record, -ECANCELED for the rest of the group ─► mark complete ─► sweep
//! ```
//!
//! Both paths end in the resume loop, which admits and dispatches whatever
//! became runnable. Nested inside a running loop that call is a no-op.

use log::debug;

use super::{Locked, TaskId, TaskState};
use crate::abi::errno::ECANCELED;
use crate::ring::SqeId;
use crate::sqe::SqeFlags;

impl Locked<'_> {
    /// The current step of `task` succeeded with `result`
    pub(crate) fn complete_ok(&mut self, task: TaskId, result: i32) {
        let Some(first) = self.running_step(task) else {
            return;
        };

        let last = self.step_end(first);
        let next = if self.flags(last).contains(SqeFlags::CHAINED) {
            self.successor(last)
        } else {
            None
        };

        if next.is_none() {
            self.core.tasks.mark_complete(task);
        }

        // One record per transaction member, all reported together
        let mut id = first;
        loop {
            self.emit(id, result);
            if id == last {
                break;
            }
            match self.successor(id) {
                Some(member) => id = member,
                None => break,
            }
        }

        self.sweep();

        if let Some(next) = next {
            debug!("[rtio] task {} chained to sqe {}", task.as_u32(), next.as_u32());
            self.core.tasks.set_current(task, next);
            self.core.tasks.mark_suspended(task);
        }

        self.resume();
    }

    /// The current step of `task` failed with `result`
    ///
    /// The rest of the group is canceled without running.
    pub(crate) fn complete_err(&mut self, task: TaskId, result: i32) {
        let Some(mut id) = self.running_step(task) else {
            return;
        };

        debug!("[rtio] task {} failed at sqe {}: {}", task.as_u32(), id.as_u32(), result);
        self.emit(id, result);

        while self.flags(id).is_linked() {
            match self.successor(id) {
                Some(member) => {
                    id = member;
                    self.emit(id, -ECANCELED);
                }
                None => break,
            }
        }

        self.core.tasks.mark_complete(task);

        self.sweep();
        self.resume();
    }

    /// Current request of a task that is waiting on a completion
    fn running_step(&self, task: TaskId) -> Option<SqeId> {
        let state = self.core.tasks.state(task);
        debug_assert_eq!(state, TaskState::Dispatched, "task {} completed twice", task.as_u32());
        if state != TaskState::Dispatched {
            return None;
        }
        self.core.tasks.current(task)
    }

    /// Last member of the transaction starting at `first`
    fn step_end(&self, first: SqeId) -> SqeId {
        let mut last = first;
        while self.flags(last).contains(SqeFlags::TRANSACTION) {
            match self.successor(last) {
                Some(member) => last = member,
                None => break,
            }
        }
        last
    }
}
