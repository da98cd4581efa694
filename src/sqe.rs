// src/sqe.rs
//! Submission requests
//!
//! A request names an operation, an optional device endpoint and the flags
//! that link it to its neighbours in the queue. A *request group* is a
//! maximal run of requests connected by `CHAINED`/`TRANSACTION`, terminated
//! by a request carrying neither flag.
//!
//! ```text
//! [A: CHAINED] [B: TRANSACTION] [C] [D]
//! └──────── one group ────────────┘ └ next group
//! ```

use alloc::sync::Arc;
use core::fmt;

use bitflags::bitflags;

use crate::abi::OpCode;
use crate::iodev::Iodev;

bitflags! {
    /// Submission request flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SqeFlags: u8 {
        /// The next request runs only after this one succeeds
        const CHAINED = 1 << 0;

        /// This request is submitted together with the next one as a
        /// single device operation; each member still yields its own
        /// completion record
        const TRANSACTION = 1 << 1;

        /// Reject instead of running (checked before dispatch)
        const CANCELED = 1 << 2;

        /// Buffer is pre-registered with the device (zero-copy)
        const FIXED_BUFFER = 1 << 3;
    }
}

impl SqeFlags {
    /// Flags that link a request to its successor
    pub const LINKED: Self = Self::CHAINED.union(Self::TRANSACTION);

    /// Returns `true` if another request of the same group follows
    #[inline]
    #[must_use]
    pub const fn is_linked(self) -> bool {
        self.intersects(Self::LINKED)
    }
}

bitflags! {
    /// Completion record flags, derived from the request at emission time
    ///
    /// When `FIXED_BUFFER` is set, bits 16..32 carry the registered buffer
    /// index the step used.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CqeFlags: u32 {
        /// The step used a registered buffer
        const FIXED_BUFFER = 1 << 0;
    }
}

/// Bit offset of the buffer index inside `CqeFlags`
const CQE_BUF_INDEX_SHIFT: u32 = 16;

impl CqeFlags {
    /// Flags for a step that used registered buffer `buf_index`
    #[must_use]
    pub const fn fixed_buffer(buf_index: u16) -> Self {
        // buf_index is u16, so the shifted value always fits the upper half
        Self::from_bits_retain(
            Self::FIXED_BUFFER.bits() | ((buf_index as u32) << CQE_BUF_INDEX_SHIFT),
        )
    }

    /// Registered buffer index, if the step used one
    #[must_use]
    pub const fn buf_index(self) -> Option<u16> {
        if self.contains(Self::FIXED_BUFFER) {
            Some((self.bits() >> CQE_BUF_INDEX_SHIFT) as u16)
        } else {
            None
        }
    }
}

/// Callback executed in the executor's context
///
/// Runs with the executor lock held. It must not call back into the
/// executor that is running it.
pub type SqeCallback = fn(&Sqe, usize);

/// Operation descriptor
#[derive(Clone, Copy)]
pub enum Op {
    /// No operation
    Nop,
    /// Read `len` bytes into registered buffer `buf_index`
    Read {
        /// Registered buffer index
        buf_index: u16,
        /// Length in bytes
        len: u32,
    },
    /// Write `len` bytes from registered buffer `buf_index`
    Write {
        /// Registered buffer index
        buf_index: u16,
        /// Length in bytes
        len: u32,
    },
    /// Invoke `callback(sqe, arg)`
    Callback {
        /// Function to run
        callback: SqeCallback,
        /// Opaque argument passed through
        arg: usize,
    },
}

impl Op {
    /// ABI operation code
    #[must_use]
    pub const fn opcode(&self) -> OpCode {
        match self {
            Self::Nop => OpCode::Nop,
            Self::Read { .. } => OpCode::Read,
            Self::Write { .. } => OpCode::Write,
            Self::Callback { .. } => OpCode::Callback,
        }
    }

    /// Registered buffer index, for operations that move data
    #[must_use]
    pub const fn buf_index(&self) -> Option<u16> {
        match self {
            Self::Read { buf_index, .. } | Self::Write { buf_index, .. } => Some(*buf_index),
            Self::Nop | Self::Callback { .. } => None,
        }
    }
}

impl fmt::Debug for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nop => f.write_str("Nop"),
            Self::Read { buf_index, len } => f
                .debug_struct("Read")
                .field("buf_index", buf_index)
                .field("len", len)
                .finish(),
            Self::Write { buf_index, len } => f
                .debug_struct("Write")
                .field("buf_index", buf_index)
                .field("len", len)
                .finish(),
            Self::Callback { arg, .. } => f.debug_struct("Callback").field("arg", arg).finish(),
        }
    }
}

/// Submission request
#[derive(Clone)]
pub struct Sqe {
    /// Operation to perform
    pub op: Op,

    /// Group linkage and cancellation flags
    pub flags: SqeFlags,

    /// Target device endpoint; `None` runs the operation in the executor
    pub iodev: Option<Arc<dyn Iodev>>,

    /// User data - passed back in every completion record for this request
    pub user_data: u64,
}

impl Sqe {
    /// Create a NOP request
    #[must_use]
    pub fn nop(iodev: Option<Arc<dyn Iodev>>, user_data: u64) -> Self {
        Self {
            op: Op::Nop,
            flags: SqeFlags::empty(),
            iodev,
            user_data,
        }
    }

    /// Create a read request into a registered buffer
    #[must_use]
    pub fn read(iodev: Arc<dyn Iodev>, buf_index: u16, len: u32, user_data: u64) -> Self {
        Self {
            op: Op::Read { buf_index, len },
            flags: SqeFlags::FIXED_BUFFER,
            iodev: Some(iodev),
            user_data,
        }
    }

    /// Create a write request from a registered buffer
    #[must_use]
    pub fn write(iodev: Arc<dyn Iodev>, buf_index: u16, len: u32, user_data: u64) -> Self {
        Self {
            op: Op::Write { buf_index, len },
            flags: SqeFlags::FIXED_BUFFER,
            iodev: Some(iodev),
            user_data,
        }
    }

    /// Create a callback request, run by the executor itself
    #[must_use]
    pub fn callback(callback: SqeCallback, arg: usize, user_data: u64) -> Self {
        Self {
            op: Op::Callback { callback, arg },
            flags: SqeFlags::empty(),
            iodev: None,
            user_data,
        }
    }

    /// Link the next request as a chain successor
    #[must_use]
    pub fn chained(mut self) -> Self {
        self.flags |= SqeFlags::CHAINED;
        self
    }

    /// Group the next request into the same device transaction
    #[must_use]
    pub fn transaction(mut self) -> Self {
        self.flags |= SqeFlags::TRANSACTION;
        self
    }

    /// Flags for the completion record of this request
    #[must_use]
    pub fn completion_flags(&self) -> CqeFlags {
        match self.op.buf_index() {
            Some(index) if self.flags.contains(SqeFlags::FIXED_BUFFER) => {
                CqeFlags::fixed_buffer(index)
            }
            _ => CqeFlags::empty(),
        }
    }
}

impl fmt::Debug for Sqe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sqe")
            .field("op", &self.op)
            .field("flags", &self.flags)
            .field("iodev", &self.iodev.as_ref().map(|dev| dev.name()))
            .field("user_data", &self.user_data)
            .finish()
    }
}
