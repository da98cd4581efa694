// src/executor/prepare.rs
//! Preparation engine
//!
//! Turns queued request groups into suspended tasks while task slots are
//! free. Scanning resumes after the terminator of the last admitted group,
//! so already-admitted requests are never looked at twice.

use log::debug;

use super::{Counters, Locked};

impl Locked<'_> {
    /// Admit queued request groups until the queue or the task table runs out
    pub(crate) fn prepare(&mut self) {
        let rtio = self.rtio;
        let sq = &rtio.sq;
        let mut next = match self.core.cursor {
            None => sq.peek_head(),
            Some(last) => sq.next_after(last),
        };

        while let Some(head) = next {
            if !self.core.tasks.has_free_slot() {
                break;
            }

            let task = self.core.tasks.allocate(head);
            Counters::bump(&rtio.stats.tasks_admitted);

            // Walk to the group terminator
            let mut end = head;
            while self.flags(end).is_linked() {
                match self.successor(end) {
                    Some(member) => end = member,
                    None => break,
                }
            }

            debug!(
                "[rtio] prepared task {} for sqe {}..={}",
                task.as_u32(),
                head.as_u32(),
                end.as_u32()
            );

            self.core.cursor = Some(end);
            next = sq.next_after(end);
        }
    }
}
