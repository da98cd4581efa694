//! rtio Shared ABI Definitions
//!
//! Types that cross the boundary between application code and the rtio
//! executor: operation codes, errno-style result codes and the completion
//! record delivered back to the submitter.
//!
//! # Modules
//!
//! - [`errno`]: Result codes carried by completion records
//! - [`opcode`]: Operation codes for submission requests
//! - [`completion`]: Completion record layout

#![no_std]
#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod completion;
pub mod errno;
pub mod opcode;

// Re-export commonly used types
pub use completion::Completion;
pub use errno::{EAGAIN, ECANCELED, EINVAL, EIO};
pub use opcode::OpCode;
