// rtio_abi/src/errno.rs
//! Result codes for completion records
//!
//! Completion records carry an `i32` result: zero or positive on success,
//! a negated errno value on failure. Device endpoints report their own
//! codes verbatim; the executor itself only ever produces the codes below.

/// I/O error
pub const EIO: i32 = 5;

/// Resource temporarily unavailable (retry later)
pub const EAGAIN: i32 = 11;

/// Invalid argument (operation the executor cannot run itself)
pub const EINVAL: i32 = 22;

/// Operation canceled
pub const ECANCELED: i32 = 125;

/// Returns `true` if `result` is a failure code
#[inline]
#[must_use]
pub const fn is_error(result: i32) -> bool {
    result < 0
}

/// Short description of a result code, for diagnostics
#[must_use]
pub const fn describe(result: i32) -> &'static str {
    match result {
        r if r >= 0 => "success",
        r if r == -EIO => "I/O error",
        r if r == -EAGAIN => "try again",
        r if r == -EINVAL => "invalid argument",
        r if r == -ECANCELED => "canceled",
        _ => "device error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_detection() {
        assert!(!is_error(0));
        assert!(!is_error(16));
        assert!(is_error(-ECANCELED));
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(4), "success");
        assert_eq!(describe(-ECANCELED), "canceled");
        assert_eq!(describe(-EINVAL), "invalid argument");
        assert_eq!(describe(-EAGAIN), "try again");
        assert_eq!(describe(-71), "device error");
    }
}
