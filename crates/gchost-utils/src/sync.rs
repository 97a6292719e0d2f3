//! Basic synchronization primitives.
//!
//! This module provides a unified import surface for the locks and atomics
//! used across the workspace. Every crate in the host is written against
//! preemptive OS threads, so the parking_lot types are re-exported directly.

pub use std::sync::{
    Arc, OnceLock,
    atomic::{
        AtomicBool, AtomicI8, AtomicI16, AtomicI32, AtomicI64, AtomicIsize, AtomicU8, AtomicU16,
        AtomicU32, AtomicU64, AtomicUsize, Ordering,
    },
};

pub use parking_lot::{
    Condvar, MappedRwLockReadGuard, MappedRwLockWriteGuard, Mutex, MutexGuard, RwLock,
    RwLockReadGuard, RwLockWriteGuard,
};
