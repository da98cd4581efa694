// src/errors/unified.rs

//! Unified error types for the executor

use core::fmt;

use rtio_abi::errno::{EAGAIN, EINVAL};

/// Executor error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtioError {
    /// Task count is zero, not a power of two, or above the maximum
    InvalidTaskCount,
    /// Submission queue size is zero, not a power of two, or above the maximum
    InvalidQueueSize,
    /// Submission queue has no released storage left
    QueueFull,
    /// Submission queue holds no entry at the requested position
    QueueEmpty,
}

impl RtioError {
    /// Returns a string representation of the error.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidTaskCount => "invalid task count",
            Self::InvalidQueueSize => "invalid queue size",
            Self::QueueFull => "submission queue full",
            Self::QueueEmpty => "submission queue empty",
        }
    }

    /// Convert to errno value
    #[must_use]
    pub const fn to_errno(self) -> i32 {
        match self {
            Self::InvalidTaskCount | Self::InvalidQueueSize => EINVAL,
            Self::QueueFull | Self::QueueEmpty => EAGAIN,
        }
    }

    /// Whether retrying after the executor makes progress can succeed
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::QueueFull | Self::QueueEmpty)
    }
}

impl fmt::Display for RtioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type alias for executor operations
pub type Result<T> = core::result::Result<T, RtioError>;

/// Helper trait for error context
pub trait ErrorContext {
    /// Get a detailed description of the error
    fn context(&self) -> &'static str;
}

impl ErrorContext for RtioError {
    fn context(&self) -> &'static str {
        match self {
            Self::InvalidTaskCount => "Task table size must be a non-zero power of two within MAX_TASKS",
            Self::InvalidQueueSize => "Submission queue size must be a non-zero power of two within MAX_SQ_ENTRIES",
            Self::QueueFull => "Reclaim completed request groups before enqueuing more work",
            Self::QueueEmpty => "Requested submission queue position holds no entry",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_errno_mapping() {
        assert_eq!(RtioError::InvalidTaskCount.to_errno(), EINVAL);
        assert_eq!(RtioError::QueueFull.to_errno(), EAGAIN);
        assert_eq!(RtioError::QueueEmpty.to_errno(), EAGAIN);
    }

    #[test]
    fn test_display_and_context() {
        assert_eq!(RtioError::QueueFull.to_string(), "submission queue full");
        assert!(RtioError::InvalidQueueSize.context().contains("power of two"));
    }

    #[test]
    fn test_retriable() {
        assert!(RtioError::QueueFull.is_retriable());
        assert!(!RtioError::InvalidTaskCount.is_retriable());
    }
}
