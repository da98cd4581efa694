// rtio_abi/src/completion.rs
//! Completion record
//!
//! One record is produced per finished request step. A transaction group
//! yields one record per member, a chain one record per link.
//!
//! # Memory Layout
//!
//! ```text
//! Completion (16 bytes, repr(C)):
//! +0   user_data (8)
//! +8   result (4)
//! +12  flags (4)
//! ```

use crate::errno::ECANCELED;

/// Completion record
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Completion {
    /// Opaque tag copied from the submission request
    pub user_data: u64,

    /// Result code (negative errno on failure)
    pub result: i32,

    /// Flags derived from the request at completion time
    pub flags: u32,
}

// Compile-time size check
const _: () = assert!(
    core::mem::size_of::<Completion>() == 16,
    "Completion must be 16 bytes"
);

impl Completion {
    /// Create a completion record
    #[must_use]
    pub const fn new(result: i32, user_data: u64, flags: u32) -> Self {
        Self { user_data, result, flags }
    }

    /// Returns `true` if the step succeeded
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result >= 0
    }

    /// Returns `true` if the step was canceled without running
    #[must_use]
    pub const fn is_canceled(&self) -> bool {
        self.result == -ECANCELED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_status() {
        assert!(Completion::new(0, 1, 0).is_success());
        assert!(Completion::new(12, 1, 0).is_success());

        let canceled = Completion::new(-ECANCELED, 7, 0);
        assert!(!canceled.is_success());
        assert!(canceled.is_canceled());
        assert_eq!(canceled.user_data, 7);
    }
}
