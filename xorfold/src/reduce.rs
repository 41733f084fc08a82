//! Sequential and parallel XOR reductions.
//!
//! The parallel reducers share one fan-out/fan-in algorithm,
//! [`parallel_with`]: partition the array statically, spawn one scoped worker
//! per partition, let every worker feed an injected [`Accumulator`], and join
//! all workers before reading the result. The accumulator decides how often it
//! is merged into (see [`MergeGranularity`]); nothing else differs between the
//! Mutex and CAS strategies.

use crate::accumulator::{Accumulator, AtomicAccumulator, LockedAccumulator, MergeGranularity};
use crate::error::ConfigError;
use crate::partition::partition;
use crate::predicate::{fold_range, Predicate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::thread;

/// A reduction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Single-threaded scan.
    Sequential,
    /// Per-partition private folds merged under a mutex.
    Mutex,
    /// Every qualifying element merged through a CAS retry loop.
    Cas,
}

impl Strategy {
    /// All strategies, in the order the benchmark runs them.
    pub const ALL: [Self; 3] = [Self::Sequential, Self::Mutex, Self::Cas];

    /// Display name used in reports.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sequential => "Sequential",
            Self::Mutex => "Mutex",
            Self::Cas => "CAS",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "seq" => Ok(Self::Sequential),
            "mutex" | "lock" => Ok(Self::Mutex),
            "cas" | "atomic" => Ok(Self::Cas),
            _ => Err(ConfigError::UnknownStrategy {
                name: s.to_string(),
            }),
        }
    }
}

/// Outcome of one reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reduction {
    /// The XOR fold of every qualifying element.
    pub value: i32,
    /// Failed CAS attempts. Always 0 for the Sequential and Mutex strategies.
    pub cas_retries: u64,
}

/// Folds every qualifying element of `numbers` on the calling thread.
#[must_use]
pub fn sequential(numbers: &[i32], predicate: Predicate) -> i32 {
    fold_range(numbers, 0..numbers.len(), predicate)
}

/// Runs the partitioned parallel reduction into `acc`.
///
/// Spawns `threads` scoped workers, one per partition, and returns once all of
/// them have been joined. Workers borrow `numbers` directly; the scope makes it
/// impossible for a worker to outlive the borrow. A worker panic propagates out
/// of this function after the remaining workers finish.
///
/// # Errors
///
/// Returns [`ConfigError::ZeroThreads`] if `threads` is zero; nothing is
/// spawned in that case. Returns [`ConfigError::ThreadSpawn`] if the OS
/// refuses a worker thread. Workers spawned before the failure are still
/// joined, and the partial fold they leave in `acc` must be discarded.
pub fn parallel_with<A: Accumulator>(
    numbers: &[i32],
    predicate: Predicate,
    threads: usize,
    acc: &A,
) -> Result<(), ConfigError> {
    let partitions = partition(numbers.len(), threads)?;

    thread::scope(|s| -> Result<(), ConfigError> {
        for (index, range) in partitions.enumerate() {
            let worker = move || match A::GRANULARITY {
                MergeGranularity::PerPartition => {
                    let local = fold_range(numbers, range, predicate);
                    acc.merge(local);
                }
                MergeGranularity::PerElement => {
                    for &value in &numbers[range] {
                        if predicate.matches(value) {
                            acc.merge(value);
                        }
                    }
                }
            };
            thread::Builder::new()
                .spawn_scoped(s, worker)
                .map_err(|err| ConfigError::ThreadSpawn {
                    index,
                    reason: err.to_string(),
                })?;
        }
        Ok(())
    })
}

/// Parallel reduction merging per-partition folds under a mutex.
///
/// # Errors
///
/// Returns [`ConfigError::ZeroThreads`] if `threads` is zero, or
/// [`ConfigError::ThreadSpawn`] if a worker cannot be started.
pub fn parallel_locked(
    numbers: &[i32],
    predicate: Predicate,
    threads: usize,
) -> Result<i32, ConfigError> {
    let acc = LockedAccumulator::new();
    parallel_with(numbers, predicate, threads, &acc)?;
    Ok(acc.into_inner())
}

/// Parallel reduction merging every qualifying element through a CAS loop.
///
/// # Errors
///
/// Returns [`ConfigError::ZeroThreads`] if `threads` is zero, or
/// [`ConfigError::ThreadSpawn`] if a worker cannot be started.
pub fn parallel_atomic(
    numbers: &[i32],
    predicate: Predicate,
    threads: usize,
) -> Result<Reduction, ConfigError> {
    let acc = AtomicAccumulator::new();
    parallel_with(numbers, predicate, threads, &acc)?;
    Ok(Reduction {
        cas_retries: acc.retries(),
        value: acc.into_inner(),
    })
}

/// Reduces `numbers` with the given strategy.
///
/// `threads` is validated for every strategy, including Sequential, so a bad
/// configuration is rejected the same way whichever strategy runs first.
///
/// # Errors
///
/// Returns [`ConfigError::ZeroModulus`] or [`ConfigError::ZeroThreads`] before
/// any work starts, and [`ConfigError::ThreadSpawn`] if the OS refuses a
/// worker thread.
pub fn reduce(
    numbers: &[i32],
    modulus: i32,
    threads: usize,
    strategy: Strategy,
) -> Result<Reduction, ConfigError> {
    let predicate = Predicate::new(modulus)?;
    if threads == 0 {
        return Err(ConfigError::ZeroThreads);
    }

    match strategy {
        Strategy::Sequential => Ok(Reduction {
            value: sequential(numbers, predicate),
            cas_retries: 0,
        }),
        Strategy::Mutex => Ok(Reduction {
            value: parallel_locked(numbers, predicate, threads)?,
            cas_retries: 0,
        }),
        Strategy::Cas => parallel_atomic(numbers, predicate, threads),
    }
}
