//! Configuration errors.
//!
//! Every error in this crate is a configuration error. All of them are
//! detected before any worker thread is started, except a thread count the OS
//! cannot satisfy, which surfaces when spawning. Synchronization faults are
//! not represented here:
//! lock release is tied to guard drop and the atomic accumulator is only ever
//! touched through atomic operations, so neither can fail at runtime.

use std::fmt;

/// Errors raised when a reduction or benchmark is configured incorrectly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A parallel reduction was requested with zero worker threads.
    ZeroThreads,

    /// The predicate modulus was zero, so divisibility is undefined.
    ZeroModulus,

    /// A benchmark was configured without any problem sizes.
    EmptySizes,

    /// A benchmark was configured without any strategies to run.
    EmptyStrategies,

    /// The OS refused to start a worker thread.
    ThreadSpawn {
        /// Zero-based index of the worker that could not be started
        index: usize,
        /// The OS error message
        reason: String,
    },

    /// An environment variable held a value that could not be parsed.
    InvalidEnv {
        /// Name of the offending variable
        var: &'static str,
        /// The raw value that was read
        value: String,
        /// Why the value was rejected
        reason: String,
    },

    /// A strategy name did not match any known strategy.
    UnknownStrategy {
        /// The name that was given
        name: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroThreads => {
                write!(f, "[xorfold] thread count must be at least 1")
            }
            Self::ZeroModulus => {
                write!(f, "[xorfold] predicate modulus must be non-zero")
            }
            Self::EmptySizes => {
                write!(f, "[xorfold] at least one problem size is required")
            }
            Self::EmptyStrategies => {
                write!(f, "[xorfold] at least one strategy is required")
            }
            Self::ThreadSpawn { index, reason } => {
                write!(f, "[xorfold] failed to spawn worker {index}: {reason}")
            }
            Self::InvalidEnv { var, value, reason } => {
                write!(f, "[xorfold] invalid value {value:?} for {var}: {reason}")
            }
            Self::UnknownStrategy { name } => {
                write!(
                    f,
                    "[xorfold] unknown strategy {name:?} (expected one of: sequential, mutex, cas)"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}
