//! Lock poisoning recovery for the locked accumulator.
//!
//! A worker that panics while holding the accumulator lock poisons it. The
//! guarded value is a plain `i32` and the critical section is a single XOR
//! assignment, so the value can never be observed half-updated: recovering the
//! guard is always sound. The panic itself still surfaces when the scope joins
//! the worker, so no partial result escapes the reduction.

use std::sync::LockResult;

/// Recovers from a poisoned mutex, either when locking it or when consuming
/// it with `into_inner`.
///
/// # Example
///
/// ```ignore
/// use std::sync::Mutex;
///
/// let lock = Mutex::new(0_i32);
/// let mut guard = recover(lock.lock());
/// *guard ^= 15;
/// ```
pub(crate) fn recover<G>(result: LockResult<G>) -> G {
    result.unwrap_or_else(|poison| {
        libc_print::libc_eprintln!("[xorfold] warning: recovering from poisoned accumulator lock");
        poison.into_inner()
    })
}
