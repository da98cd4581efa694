// src/ring/mod.rs
//! Submission and completion queues
//!
//! ```text
//!            produce            peek / next_after         consume + release
//! Application ─────► [ released | consumed | queued ... ] ─────────────────► Executor sweep
//!                      ^released  ^head                ^tail
//!
//! Executor ── emit ──► CompletionSink (CompletionQueue) ──► Application
//! ```
//!
//! The executor looks ahead at queued requests without consuming them and
//! only consumes and releases a request group once its task is reclaimed,
//! so the consumption cursor always moves in arrival order.

pub mod completion;
pub mod submission;

pub use completion::{CompletionQueue, CompletionSink};
pub use submission::{SqeId, SubmissionQueue};
