// src/executor/resume.rs
//! Resumption engine and dispatch
//!
//! Suspended tasks are dispatched oldest first from a single loop. A step
//! flagged `CANCELED` is failed with `-ECANCELED` instead of being
//! submitted; a step without a device endpoint runs in the executor itself.

use log::debug;

use super::{Counters, Locked, TaskId};
use crate::abi::errno::{ECANCELED, EINVAL};
use crate::iodev::IoSqe;
use crate::sqe::{Op, Sqe, SqeFlags};

impl Locked<'_> {
    /// Dispatch suspended tasks oldest first until none is left
    ///
    /// Completions that arrive while the loop runs only leave work behind
    /// (freed slots, suspended chain steps); the loop picks it up on its
    /// next pass instead of recursing. A call made while a loop is already
    /// running further up the stack returns immediately.
    pub(crate) fn resume(&mut self) {
        if self.core.resuming {
            return;
        }
        self.core.resuming = true;

        loop {
            self.prepare();
            let Some(task) = self.core.tasks.oldest_suspended() else {
                break;
            };

            debug!("[rtio] resuming task {}", task.as_u32());
            self.core.tasks.mark_dispatched(task);
            self.dispatch(task);
        }

        self.core.resuming = false;
    }

    /// Run the current step of a dispatched task
    pub(crate) fn dispatch(&mut self, task: TaskId) {
        let Some(id) = self.core.tasks.current(task) else {
            return;
        };
        let Some(sqe) = self.request(id) else {
            return;
        };

        if sqe.flags.contains(SqeFlags::CANCELED) {
            debug!("[rtio] task {} sqe {} canceled before dispatch", task.as_u32(), id.as_u32());
            self.complete_err(task, -ECANCELED);
            return;
        }

        Counters::bump(&self.rtio.stats.steps_dispatched);

        match sqe.iodev.clone() {
            Some(iodev) => iodev.submit(IoSqe::new(self.reborrow(), task, id, sqe)),
            None => self.execute(task, &sqe),
        }
    }

    /// Operations handled by the executor when no device endpoint is named
    fn execute(&mut self, task: TaskId, sqe: &Sqe) {
        match sqe.op {
            Op::Nop => self.complete_ok(task, 0),
            Op::Callback { callback, arg } => {
                callback(sqe, arg);
                self.complete_ok(task, 0);
            }
            Op::Read { .. } | Op::Write { .. } => {
                debug!(
                    "[rtio] {} without device endpoint, user_data={}",
                    sqe.op.opcode().name(),
                    sqe.user_data
                );
                self.complete_err(task, -EINVAL);
            }
        }
    }
}
