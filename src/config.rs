// src/config.rs
//! Executor configuration
//!
//! Sizes are fixed at construction. Both the task table and the submission
//! ring index with a mask, so every size must be a power of two.

use crate::errors::{Result, RtioError};

/// Maximum number of concurrently admitted request groups
pub const MAX_TASKS: usize = 1024;

/// Maximum number of submission queue entries
pub const MAX_SQ_ENTRIES: usize = 4096;

/// Default task table size
const DEFAULT_TASK_COUNT: usize = 4;

/// Default submission queue size
const DEFAULT_SQ_ENTRIES: usize = 64;

/// Executor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtioConfig {
    /// Number of task slots (request groups in flight at once)
    pub task_count: usize,

    /// Number of submission queue entries
    pub sq_entries: usize,
}

impl Default for RtioConfig {
    fn default() -> Self {
        Self {
            task_count: DEFAULT_TASK_COUNT,
            sq_entries: DEFAULT_SQ_ENTRIES,
        }
    }
}

impl RtioConfig {
    /// Set the task table size
    #[must_use]
    pub const fn with_task_count(mut self, task_count: usize) -> Self {
        self.task_count = task_count;
        self
    }

    /// Set the submission queue size
    #[must_use]
    pub const fn with_sq_entries(mut self, sq_entries: usize) -> Self {
        self.sq_entries = sq_entries;
        self
    }

    /// Check that every size is a usable power of two
    ///
    /// # Errors
    ///
    /// - `RtioError::InvalidTaskCount` - bad `task_count`
    /// - `RtioError::InvalidQueueSize` - bad `sq_entries`
    pub const fn validate(&self) -> Result<()> {
        if !self.task_count.is_power_of_two() || self.task_count > MAX_TASKS {
            return Err(RtioError::InvalidTaskCount);
        }
        if !self.sq_entries.is_power_of_two() || self.sq_entries > MAX_SQ_ENTRIES {
            return Err(RtioError::InvalidQueueSize);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(RtioConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        let config = RtioConfig::default().with_task_count(3);
        assert_eq!(config.validate(), Err(RtioError::InvalidTaskCount));

        let config = RtioConfig::default().with_sq_entries(100);
        assert_eq!(config.validate(), Err(RtioError::InvalidQueueSize));
    }

    #[test]
    fn test_rejects_zero_and_oversized() {
        assert_eq!(
            RtioConfig::default().with_task_count(0).validate(),
            Err(RtioError::InvalidTaskCount)
        );
        assert_eq!(
            RtioConfig::default().with_sq_entries(MAX_SQ_ENTRIES * 2).validate(),
            Err(RtioError::InvalidQueueSize)
        );
    }
}
