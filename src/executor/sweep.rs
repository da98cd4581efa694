// src/executor/sweep.rs
//! Reclamation
//!
//! Frees task slots and their submission queue entries strictly in
//! admission order. A complete task behind a running one waits, so the
//! queue's consumption cursor is never advanced out of order.

use log::debug;

use super::{Counters, Locked, TaskId};

impl Locked<'_> {
    /// Reclaim every complete task at the front of the table
    pub(crate) fn sweep(&mut self) {
        while let Some(task) = self.core.tasks.oldest() {
            if !self.core.tasks.is_complete(task) {
                break;
            }

            self.release_group(task);
            self.core.tasks.reclaim();
            Counters::bump(&self.rtio.stats.tasks_reclaimed);
            debug!("[rtio] swept task {}", task.as_u32());
        }
    }

    /// Consume and release the queue entries of `task`'s request group
    fn release_group(&mut self, task: TaskId) {
        let rtio = self.rtio;
        let sq = &rtio.sq;
        let mut first = true;

        while let Some(id) = sq.consume_front() {
            if first {
                debug_assert_eq!(Some(id), self.core.tasks.head(task), "sweep out of order");
                first = false;
            }

            let flags = self.flags(id);
            sq.release(id);

            // Everything admitted has been reclaimed; rescan from the head
            if self.core.cursor == Some(id) {
                self.core.cursor = None;
            }

            if !flags.is_linked() {
                return;
            }
        }

        debug_assert!(false, "task {} request group has no terminator", task.as_u32());
    }
}
