// src/lib.rs
//! rtio - concurrent task executor for real-time asynchronous I/O
//!
//! Application code enqueues submission requests into a shared queue; the
//! executor admits a bounded number of request groups into flight, dispatches
//! each one to its device endpoint, follows chains and transactions, and
//! emits one completion record per finished step.
//!
//! # Architecture
//!
//! ```text
//! Application                         Executor
//! ┌─────────────────┐                ┌──────────────────────┐
//! │ SQ push         │───────────────►│ prepare: admit group │
//! │ submit_all()    │                │ resume:  dispatch    │──► Iodev::submit
//! │                 │                │                      │
//! │ CQ consume      │◄───────────────│ complete: ok / err   │◄── IoSqe / PendingSqe
//! └─────────────────┘                │ sweep:   FIFO free   │
//!                                    └──────────────────────┘
//! ```
//!
//! All executor state sits behind a single spin lock, taken with interrupts
//! masked through the embedder's [`InterruptController`]. A device that
//! completes synchronously from inside `submit` does so through the
//! [`IoSqe`] it was handed, which borrows the already-held lock; a device
//! that completes later converts it into a [`PendingSqe`] first.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(missing_debug_implementations)]
#![warn(missing_docs)]

extern crate alloc;

pub mod abi;
pub mod config;
pub mod errors;
pub mod executor;
pub mod iodev;
pub mod ring;
pub mod sqe;
pub mod sync;

pub use config::RtioConfig;
pub use errors::{ErrorContext, Result, RtioError};
pub use executor::{Rtio, RtioStats, TaskId};
pub use iodev::{IoSqe, Iodev, PendingSqe};
pub use ring::{CompletionQueue, CompletionSink, SqeId, SubmissionQueue};
pub use sqe::{CqeFlags, Op, Sqe, SqeFlags};
pub use sync::{InterruptController, NoInterrupts};

pub use rtio_abi::Completion;
