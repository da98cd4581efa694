// src/abi.rs
//! Application Binary Interface (ABI) definitions
//!
//! This module re-exports the shared ABI types from the `rtio_abi` crate.

// Re-export all types from the shared ABI crate
pub use rtio_abi::*;
