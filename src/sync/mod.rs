// src/sync/mod.rs
//! Synchronization primitives
//!
//! Executor state is touched from thread context and from device completion
//! handlers that may run in interrupt context. Every lock here is taken with
//! interrupts masked on the holding core, so a handler can never spin on a
//! lock its own core already holds.

pub mod interrupt;

pub use interrupt::{without_interrupts, InterruptController, IrqMutex, NoInterrupts};
