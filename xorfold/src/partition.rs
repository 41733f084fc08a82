//! Static partitioning of an index space across worker threads.
//!
//! The array of length `len` is split into exactly `threads` contiguous
//! half-open ranges. Every range but the last has `len / threads` elements;
//! the last one runs to `len` and absorbs the remainder of the division.
//!
//! When `len < threads` the chunk size is zero: the leading `threads - 1`
//! ranges are empty (`0..0`) and the last range is `0..len`. The ranges are
//! still in bounds, disjoint and exhaustive, so the reducers need no special
//! case for tiny inputs.

use crate::error::ConfigError;
use std::iter::FusedIterator;
use std::ops::Range;

/// Iterator over the partitions of `[0, len)`.
#[derive(Debug, Clone)]
pub struct Partitions {
    len: usize,
    chunk: usize,
    threads: usize,
    next: usize,
}

impl Partitions {
    /// Number of elements in every partition except the last.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk
    }
}

impl Iterator for Partitions {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.threads {
            return None;
        }
        let i = self.next;
        self.next += 1;

        let start = i * self.chunk;
        let end = if i == self.threads - 1 {
            self.len
        } else {
            start + self.chunk
        };
        Some(start..end)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.threads - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Partitions {}

impl FusedIterator for Partitions {}

/// Splits `[0, len)` into `threads` contiguous ranges.
///
/// # Errors
///
/// Returns [`ConfigError::ZeroThreads`] if `threads` is zero.
pub fn partition(len: usize, threads: usize) -> Result<Partitions, ConfigError> {
    if threads == 0 {
        return Err(ConfigError::ZeroThreads);
    }
    Ok(Partitions {
        len,
        chunk: len / threads,
        threads,
        next: 0,
    })
}
