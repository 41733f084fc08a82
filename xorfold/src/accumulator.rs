//! Shared XOR accumulators.
//!
//! Both accumulators implement one contract: [`Accumulator::merge`] XORs a
//! value into the shared state, and [`Accumulator::load`] reads the fold back
//! once every writer has been joined. XOR is associative and commutative, so
//! the order in which merges land never affects the final value; what matters
//! is only that no merge is lost.
//!
//! - [`LockedAccumulator`] serializes merges behind a mutex. Callers batch a
//!   whole partition into one merge, so the lock is taken once per worker.
//! - [`AtomicAccumulator`] merges with a compare-and-swap retry loop. Callers
//!   merge every qualifying element individually, so every element contends
//!   on the same atomic.

use crate::lock_util::recover;
use std::fmt;

// Under `--cfg loom` the accumulators are built on loom's model-checked primitives.
#[cfg(loom)]
use loom::sync::{
    atomic::{AtomicI32, AtomicU64, Ordering},
    Mutex,
};
#[cfg(not(loom))]
use std::sync::{
    atomic::{AtomicI32, AtomicU64, Ordering},
    Mutex,
};

/// How often a reducer should call [`Accumulator::merge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeGranularity {
    /// Fold the partition privately, then merge once.
    PerPartition,
    /// Merge every qualifying element as it is found.
    PerElement,
}

/// A running XOR fold shared by many writers.
pub trait Accumulator: Sync {
    /// Merge granularity the reducers use with this accumulator.
    const GRANULARITY: MergeGranularity;

    /// XORs `value` into the accumulator.
    fn merge(&self, value: i32);

    /// Reads the current fold.
    fn load(&self) -> i32;
}

/// XOR accumulator guarded by a mutual-exclusion lock.
pub struct LockedAccumulator {
    value: Mutex<i32>,
}

impl LockedAccumulator {
    /// Creates an accumulator holding 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            value: Mutex::new(0),
        }
    }

    /// Consumes the accumulator and returns the fold.
    #[must_use]
    pub fn into_inner(self) -> i32 {
        recover(self.value.into_inner())
    }
}

impl Default for LockedAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LockedAccumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockedAccumulator")
            .field("value", &self.load())
            .finish()
    }
}

impl Accumulator for LockedAccumulator {
    const GRANULARITY: MergeGranularity = MergeGranularity::PerPartition;

    fn merge(&self, value: i32) {
        // The guard releases the lock on drop, including during unwinding.
        let mut guard = recover(self.value.lock());
        *guard ^= value;
    }

    fn load(&self) -> i32 {
        *recover(self.value.lock())
    }
}

/// Lock-free XOR accumulator built on a compare-and-swap retry loop.
///
/// # Liveness
///
/// The retry loop in [`merge`](Accumulator::merge) has no upper bound. It is
/// lock-free: apart from transient spurious failures of
/// `compare_exchange_weak`, a CAS only fails because another writer's CAS
/// succeeded, which means some writer made progress. No individual writer is
/// guaranteed to finish in a bounded number of attempts.
pub struct AtomicAccumulator {
    value: AtomicI32,
    /// Failed CAS attempts, spurious `compare_exchange_weak` failures included.
    retries: AtomicU64,
}

impl AtomicAccumulator {
    /// Creates an accumulator holding 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            value: AtomicI32::new(0),
            retries: AtomicU64::new(0),
        }
    }

    /// Returns how many CAS attempts have failed and been retried.
    #[must_use]
    pub fn retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }

    /// Consumes the accumulator and returns the fold.
    #[must_use]
    pub fn into_inner(self) -> i32 {
        self.value.load(Ordering::Acquire)
    }
}

impl Default for AtomicAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AtomicAccumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicAccumulator")
            .field("value", &self.load())
            .field("retries", &self.retries())
            .finish()
    }
}

impl Accumulator for AtomicAccumulator {
    const GRANULARITY: MergeGranularity = MergeGranularity::PerElement;

    fn merge(&self, value: i32) {
        let mut expected = self.value.load(Ordering::Acquire);
        loop {
            let desired = expected ^ value;
            match self.value.compare_exchange_weak(
                expected,
                desired,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return,
                Err(current) => {
                    // Lost the race or failed spuriously; retry against the current value.
                    self.retries.fetch_add(1, Ordering::Relaxed);
                    expected = current;
                }
            }
        }
    }

    fn load(&self) -> i32 {
        self.value.load(Ordering::Acquire)
    }
}
