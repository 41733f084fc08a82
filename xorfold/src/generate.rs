//! Random input generation.
//!
//! The generator never owns global state: callers build an RNG (usually via
//! [`seeded_rng`]) and pass it in, so a run is reproducible from its seed.

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

/// Builds the benchmark RNG from a seed.
#[must_use]
pub fn seeded_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

/// Draws a fresh seed from OS entropy.
///
/// The driver records the seed it used so the run can be repeated with
/// `--seed`.
#[must_use]
pub fn entropy_seed() -> u64 {
    SmallRng::from_entropy().next_u64()
}

/// Overwrites `numbers` with values uniform over the full `i32` range.
pub fn fill_random<R: Rng + ?Sized>(numbers: &mut [i32], rng: &mut R) {
    for n in numbers.iter_mut() {
        *n = rng.gen();
    }
}

/// Allocates `len` values uniform over the full `i32` range.
#[must_use]
pub fn random_numbers<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<i32> {
    let mut numbers = vec![0; len];
    fill_random(&mut numbers, rng);
    numbers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_numbers() {
        let a = random_numbers(1_000, &mut seeded_rng(42));
        let b = random_numbers(1_000, &mut seeded_rng(42));
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let a = random_numbers(1_000, &mut seeded_rng(1));
        let b = random_numbers(1_000, &mut seeded_rng(2));
        assert_ne!(a, b);
    }

    #[test]
    fn covers_both_signs() {
        let numbers = random_numbers(10_000, &mut seeded_rng(7));
        assert!(numbers.iter().any(|&n| n < 0));
        assert!(numbers.iter().any(|&n| n > 0));
        // Roughly 1 in 15 values qualifies under the default predicate.
        let multiples = numbers.iter().filter(|&&n| n % 15 == 0).count();
        assert!((400..1_000).contains(&multiples), "{multiples}");
    }

    #[test]
    fn empty_is_fine() {
        assert!(random_numbers(0, &mut seeded_rng(0)).is_empty());
    }
}
