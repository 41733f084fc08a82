//! Xorfold: parallel XOR reduction strategies and a benchmark around them.
//!
//! The crate computes the XOR of every element of an `i32` array that is a
//! multiple of a modulus (15 by default) in three ways:
//!
//! - **Sequential**: one scan on the calling thread.
//! - **Mutex**: the array is split into one static partition per worker; each
//!   worker folds its partition privately and merges the result once under a
//!   lock.
//! - **CAS**: same partitioning, but every qualifying element is merged into
//!   one shared atomic through a compare-and-swap retry loop.
//!
//! XOR is associative and commutative, so all three produce the same value
//! regardless of how the work is split or in which order merges land.
//!
//! # Usage
//!
//! ```
//! use xorfold::{reduce, Strategy};
//!
//! let numbers = [15, 16, 30, 7, 45];
//! let seq = reduce(&numbers, 15, 8, Strategy::Sequential).unwrap();
//! let cas = reduce(&numbers, 15, 8, Strategy::Cas).unwrap();
//! assert_eq!(seq.value, 15 ^ 30 ^ 45);
//! assert_eq!(seq.value, cas.value);
//! ```
//!
//! The [`bench`] module times every strategy over a list of problem sizes;
//! the `xorfold-bench` binary drives it from the command line.

pub mod accumulator;
pub mod bench;
pub mod error;
pub mod generate;
pub mod json_output;
mod lock_util;
pub mod partition;
pub mod predicate;
pub mod reduce;

pub use accumulator::{Accumulator, AtomicAccumulator, LockedAccumulator, MergeGranularity};
pub use bench::{BenchConfig, BenchResults, Measurement, SizeReport, Suite};
pub use error::ConfigError;
pub use partition::{partition, Partitions};
pub use predicate::{fold_range, Predicate, DEFAULT_MODULUS};
pub use reduce::{
    parallel_atomic, parallel_locked, parallel_with, reduce, sequential, Reduction, Strategy,
};
