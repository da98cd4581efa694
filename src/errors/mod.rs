// src/errors/mod.rs

//! Unified error handling module
//!
//! Executor operations themselves never fail: capacity exhaustion defers,
//! device failures travel as completion records. The errors here cover the
//! surfaces around the core, namely configuration and the producer side of
//! the submission queue.

pub mod unified;

pub use unified::{ErrorContext, Result, RtioError};
