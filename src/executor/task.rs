// src/executor/task.rs
//! Task table
//!
//! A fixed ring of task slots bounding how many request groups are in
//! flight. Two wrapping counters index the ring:
//!
//! - `admitted`: sequence number the next allocated task receives
//! - `reclaimed`: sequence number of the oldest live task
//!
//! Slots with `reclaimed <= seq < admitted` are live and
//! `0 <= admitted - reclaimed <= capacity` holds at every observation point.
//! Tasks may complete in any order but are reclaimed strictly in sequence.

use alloc::vec::Vec;
use alloc::boxed::Box;

use crate::ring::SqeId;

/// Handle of an admitted task
///
/// Carries the admission sequence number; the slot is `seq & mask`, an O(1)
/// lookup with no address arithmetic. A handle whose slot has since been
/// reused no longer matches the slot's sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u32);

impl TaskId {
    /// Admission sequence number
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// Task lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Slot available for allocation
    Free,
    /// Allocated, waiting to be dispatched
    Suspended,
    /// Handed to a device endpoint or running in the executor
    Dispatched,
    /// Final step finished; waiting for FIFO reclamation
    Complete,
}

/// One admitted request group
#[derive(Debug, Clone, Copy)]
struct Task {
    /// Admission sequence number
    seq: u32,
    /// First request of the group
    head: SqeId,
    /// Request currently executing (advances along a chain)
    current: SqeId,
    state: TaskState,
}

impl Task {
    const FREE: Self = Self {
        seq: 0,
        head: SqeId::ZERO,
        current: SqeId::ZERO,
        state: TaskState::Free,
    };
}

/// Fixed capacity ring of task slots
#[derive(Debug)]
pub(crate) struct TaskTable {
    slots: Box<[Task]>,
    mask: u32,
    admitted: u32,
    reclaimed: u32,
}

impl TaskTable {
    /// Create a table with `count` slots (power of two, validated by config)
    pub(crate) fn new(count: usize) -> Self {
        debug_assert!(count.is_power_of_two(), "task count must be a power of two");

        let mut slots = Vec::with_capacity(count);
        slots.resize(count, Task::FREE);
        let mask = u32::try_from(count).map_or(0, |count| count - 1);

        Self {
            slots: slots.into_boxed_slice(),
            mask,
            admitted: 0,
            reclaimed: 0,
        }
    }

    /// Number of slots
    pub(crate) fn capacity(&self) -> u32 {
        self.mask + 1
    }

    /// Number of live tasks (`admitted - reclaimed`)
    pub(crate) fn len(&self) -> u32 {
        self.admitted.wrapping_sub(self.reclaimed)
    }

    /// Total tasks ever admitted (wrapping)
    pub(crate) fn admitted(&self) -> u32 {
        self.admitted
    }

    pub(crate) fn has_free_slot(&self) -> bool {
        self.len() < self.capacity()
    }

    /// Admit a new request group starting at `head`
    ///
    /// The caller must have checked [`has_free_slot`](Self::has_free_slot).
    pub(crate) fn allocate(&mut self, head: SqeId) -> TaskId {
        debug_assert!(self.has_free_slot(), "task table overcommitted");

        let id = TaskId(self.admitted);
        let slot = self.slot_index(id);
        self.slots[slot] = Task {
            seq: id.0,
            head,
            current: head,
            state: TaskState::Suspended,
        };
        self.admitted = self.admitted.wrapping_add(1);
        id
    }

    fn slot_index(&self, id: TaskId) -> usize {
        (id.0 & self.mask) as usize
    }

    /// Live task behind `id`, or `None` for a stale handle
    fn task(&self, id: TaskId) -> Option<&Task> {
        let task = &self.slots[self.slot_index(id)];
        (task.seq == id.0 && task.state != TaskState::Free).then_some(task)
    }

    fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        let slot = self.slot_index(id);
        let task = &mut self.slots[slot];
        (task.seq == id.0 && task.state != TaskState::Free).then_some(task)
    }

    /// Lifecycle state; stale handles read as `Free`
    pub(crate) fn state(&self, id: TaskId) -> TaskState {
        self.task(id).map_or(TaskState::Free, |task| task.state)
    }

    pub(crate) fn is_suspended(&self, id: TaskId) -> bool {
        self.state(id) == TaskState::Suspended
    }

    pub(crate) fn is_complete(&self, id: TaskId) -> bool {
        self.state(id) == TaskState::Complete
    }

    /// Clear the suspended state ahead of dispatch
    pub(crate) fn mark_dispatched(&mut self, id: TaskId) {
        if let Some(task) = self.task_mut(id) {
            debug_assert_eq!(task.state, TaskState::Suspended);
            task.state = TaskState::Dispatched;
        }
    }

    /// Park a dispatched task whose next chained step is ready to run
    pub(crate) fn mark_suspended(&mut self, id: TaskId) {
        if let Some(task) = self.task_mut(id) {
            debug_assert_eq!(task.state, TaskState::Dispatched);
            task.state = TaskState::Suspended;
        }
    }

    pub(crate) fn mark_complete(&mut self, id: TaskId) {
        if let Some(task) = self.task_mut(id) {
            task.state = TaskState::Complete;
        }
    }

    /// Request currently executing for `id`
    pub(crate) fn current(&self, id: TaskId) -> Option<SqeId> {
        self.task(id).map(|task| task.current)
    }

    /// Advance `id` to the next step of its chain
    pub(crate) fn set_current(&mut self, id: TaskId, sqe: SqeId) {
        if let Some(task) = self.task_mut(id) {
            task.current = sqe;
        }
    }

    /// First request of the group `id` was admitted with
    pub(crate) fn head(&self, id: TaskId) -> Option<SqeId> {
        self.task(id).map(|task| task.head)
    }

    /// Oldest live task
    pub(crate) fn oldest(&self) -> Option<TaskId> {
        (self.len() > 0).then_some(TaskId(self.reclaimed))
    }

    /// Oldest live task waiting to be dispatched
    pub(crate) fn oldest_suspended(&self) -> Option<TaskId> {
        (0..self.len())
            .map(|offset| TaskId(self.reclaimed.wrapping_add(offset)))
            .find(|&id| self.is_suspended(id))
    }

    /// Free the oldest task's slot
    ///
    /// The oldest task must be complete.
    pub(crate) fn reclaim(&mut self) -> Option<TaskId> {
        let id = self.oldest()?;
        debug_assert!(self.is_complete(id), "reclaiming a task that is still running");

        let slot = self.slot_index(id);
        self.slots[slot].state = TaskState::Free;
        self.reclaimed = self.reclaimed.wrapping_add(1);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqe(n: u32) -> SqeId {
        SqeId::from_raw(n)
    }

    #[test]
    fn test_allocate_until_full() {
        let mut table = TaskTable::new(2);
        assert!(table.has_free_slot());

        let a = table.allocate(sqe(0));
        let b = table.allocate(sqe(1));
        assert!(!table.has_free_slot());
        assert_eq!(table.len(), 2);
        assert!(table.is_suspended(a));
        assert_eq!(table.current(b), Some(sqe(1)));
    }

    #[test]
    fn test_reclaim_is_fifo() {
        let mut table = TaskTable::new(4);
        let a = table.allocate(sqe(0));
        let b = table.allocate(sqe(1));

        table.mark_dispatched(a);
        table.mark_dispatched(b);
        table.mark_complete(b);

        // b finished first but a is still the oldest
        assert_eq!(table.oldest(), Some(a));
        assert!(!table.is_complete(a));

        table.mark_complete(a);
        assert_eq!(table.reclaim(), Some(a));
        assert_eq!(table.oldest(), Some(b));
        assert_eq!(table.reclaim(), Some(b));
        assert_eq!(table.len(), 0);
        assert_eq!(table.reclaim(), None);
    }

    #[test]
    fn test_stale_handle_reads_free() {
        let mut table = TaskTable::new(1);
        let a = table.allocate(sqe(0));
        table.mark_dispatched(a);
        table.mark_complete(a);
        table.reclaim();

        let b = table.allocate(sqe(1));
        assert_eq!(table.state(a), TaskState::Free);
        assert_eq!(table.current(a), None);
        assert_eq!(table.state(b), TaskState::Suspended);

        // Updates through the stale handle must not touch the new task
        table.mark_complete(a);
        assert_eq!(table.state(b), TaskState::Suspended);
    }

    #[test]
    fn test_oldest_suspended_skips_running_tasks() {
        let mut table = TaskTable::new(4);
        let a = table.allocate(sqe(0));
        let b = table.allocate(sqe(1));
        let c = table.allocate(sqe(2));
        assert_eq!(table.oldest_suspended(), Some(a));

        table.mark_dispatched(a);
        table.mark_dispatched(b);
        assert_eq!(table.oldest_suspended(), Some(c));

        // a moves on to its next chained step and goes ahead of c again
        table.set_current(a, sqe(5));
        table.mark_suspended(a);
        assert_eq!(table.oldest_suspended(), Some(a));
        assert_eq!(table.current(a), Some(sqe(5)));

        table.mark_dispatched(a);
        table.mark_dispatched(c);
        assert_eq!(table.oldest_suspended(), None);
    }

    #[test]
    fn test_counters_wrap() {
        let mut table = TaskTable::new(2);
        table.admitted = u32::MAX;
        table.reclaimed = u32::MAX;

        let a = table.allocate(sqe(0));
        let b = table.allocate(sqe(1));
        assert_eq!(table.len(), 2);
        assert_eq!(table.admitted(), 1);

        for id in [a, b] {
            table.mark_dispatched(id);
            table.mark_complete(id);
        }
        assert_eq!(table.reclaim(), Some(a));
        assert_eq!(table.reclaim(), Some(b));
        assert_eq!(table.len(), 0);
    }
}
