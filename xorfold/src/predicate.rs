//! The inclusion predicate and the range fold built on it.

use crate::error::ConfigError;
use std::ops::Range;

/// Modulus used by the benchmark when none is configured.
pub const DEFAULT_MODULUS: i32 = 15;

/// Divisibility predicate: an element qualifies when `value % modulus == 0`.
///
/// The remainder truncates toward zero, so negative multiples qualify too
/// (`-30 % 15 == 0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predicate {
    modulus: i32,
}

impl Predicate {
    /// Creates a predicate for the given modulus.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroModulus`] if `modulus` is zero.
    pub fn new(modulus: i32) -> Result<Self, ConfigError> {
        if modulus == 0 {
            return Err(ConfigError::ZeroModulus);
        }
        Ok(Self { modulus })
    }

    /// Returns the configured modulus.
    #[must_use]
    pub fn modulus(&self) -> i32 {
        self.modulus
    }

    /// Returns true if `value` is a multiple of the modulus.
    #[inline]
    #[must_use]
    pub fn matches(&self, value: i32) -> bool {
        // wrapping_rem: i32::MIN % -1 would otherwise overflow
        value.wrapping_rem(self.modulus) == 0
    }
}

impl Default for Predicate {
    fn default() -> Self {
        Self {
            modulus: DEFAULT_MODULUS,
        }
    }
}

/// XOR-folds every element of `numbers[range]` that satisfies `predicate`.
///
/// An empty range yields 0, the XOR identity. The range must lie within
/// `numbers`; callers obtain ranges from [`crate::partition::partition`],
/// which never produces out-of-bounds ranges.
#[inline(never)]
#[must_use]
pub fn fold_range(numbers: &[i32], range: Range<usize>, predicate: Predicate) -> i32 {
    numbers[range]
        .iter()
        .filter(|&&value| predicate.matches(value))
        .fold(0, |acc, &value| acc ^ value)
}
