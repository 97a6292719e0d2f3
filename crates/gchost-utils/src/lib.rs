//! # gchost-utils
//!
//! Shared utilities for the gchost workspace: synchronization primitives
//! and small atomic building blocks. Leaf crates can depend on this without
//! pulling in the host subsystem.

pub mod atomic;
pub mod sync;

pub use atomic::AtomicPair;
