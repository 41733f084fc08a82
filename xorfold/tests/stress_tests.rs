//! Stress tests for the parallel reducers.
//!
//! These tests stress the accumulators and reducers with high concurrency to
//! expose lost updates and partitioning mistakes that might not appear under
//! normal operation.
//!
//! Run with: cargo test --test stress_tests --release
//! (Release mode recommended for realistic timing behavior)

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use xorfold::generate::{random_numbers, seeded_rng};
use xorfold::{
    parallel_atomic, parallel_locked, reduce, sequential, Accumulator, AtomicAccumulator,
    LockedAccumulator, Predicate, Strategy,
};

/// Naive reference fold, independent of the crate's scanning code.
fn oracle(numbers: &[i32]) -> i32 {
    let mut acc = 0;
    for &n in numbers {
        if n % 15 == 0 {
            acc ^= n;
        }
    }
    acc
}

/// Stress test: High contention on the CAS accumulator.
///
/// Every element qualifies, so every element is a CAS on the shared atomic.
/// Each thread merges a distinct bit an odd number of times; a lost update
/// flips that bit back off.
#[test]
fn high_contention_cas() {
    let acc = Arc::new(AtomicAccumulator::new());
    let num_threads = 8;
    let iterations = 100_001;

    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let a = Arc::clone(&acc);
            let b = Arc::clone(&barrier);
            thread::spawn(move || {
                b.wait(); // Synchronize start for maximum contention
                for _ in 0..iterations {
                    a.merge(1 << thread_id);
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    let actual = acc.load();
    assert_eq!(actual, 0xFF, "Lost merges under high contention: got={actual:#x}");
}

/// Stress test: High contention on the locked accumulator.
#[test]
fn high_contention_locked() {
    let acc = Arc::new(LockedAccumulator::new());
    let num_threads = 8;
    let iterations = 20_001;

    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let a = Arc::clone(&acc);
            let b = Arc::clone(&barrier);
            thread::spawn(move || {
                b.wait();
                for _ in 0..iterations {
                    a.merge(1 << (thread_id + 8));
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    let actual = acc.load();
    assert_eq!(actual, 0xFF00, "Lost merges under lock: got={actual:#x}");
}

/// Stress test: Dense input through the CAS reducer.
///
/// An array made only of multiples of 15 maximizes per-element contention.
#[test]
fn dense_multiples_cas_reduction() {
    let mut rng = seeded_rng(0xC0FFEE);
    let numbers: Vec<i32> = random_numbers(1_000_000, &mut rng)
        .into_iter()
        .map(|n| (n / 15) * 15)
        .collect();

    let expected = oracle(&numbers);
    for threads in [2, 8, 16] {
        let reduction = parallel_atomic(&numbers, Predicate::default(), threads).unwrap();
        assert_eq!(reduction.value, expected, "threads={threads}");
    }
}

/// Stress test: Repeated reductions on the same data.
///
/// Timing differences between runs change the merge interleaving; the result
/// must not change.
#[test]
fn repeated_runs_are_stable() {
    let mut rng = seeded_rng(31337);
    let numbers = random_numbers(200_000, &mut rng);
    let expected = sequential(&numbers, Predicate::default());

    for _ in 0..50 {
        assert_eq!(
            parallel_locked(&numbers, Predicate::default(), 8).unwrap(),
            expected
        );
        assert_eq!(
            parallel_atomic(&numbers, Predicate::default(), 8)
                .unwrap()
                .value,
            expected
        );
    }
}

/// Stress test: Many more threads than cores.
///
/// Oversubscription forces preemption inside the CAS loop and while the lock
/// is held.
#[test]
fn oversubscribed_threads() {
    let mut rng = seeded_rng(4242);
    let numbers = random_numbers(100_003, &mut rng);
    let expected = oracle(&numbers);

    for s in Strategy::ALL {
        let reduction = reduce(&numbers, 15, 256, s).unwrap();
        assert_eq!(reduction.value, expected, "strategy={s}");
    }
}

/// Stress test: Concurrent readers and writers.
///
/// Loading the accumulator while writers are active must always see a value
/// built only from merged patterns.
#[test]
fn concurrent_readers_writers() {
    let acc = Arc::new(AtomicAccumulator::new());
    let running = Arc::new(AtomicBool::new(true));
    let write_count = Arc::new(AtomicU64::new(0));
    let num_writers = 4;

    // Writer threads
    let writer_handles: Vec<_> = (0..num_writers)
        .map(|thread_id| {
            let a = Arc::clone(&acc);
            let r = Arc::clone(&running);
            let wc = Arc::clone(&write_count);
            thread::spawn(move || {
                let pattern = 0x11 << (thread_id * 8);
                while r.load(Ordering::Relaxed) {
                    a.merge(pattern);
                    wc.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    // Reader thread
    let acc_for_reader = Arc::clone(&acc);
    let running_for_reader = Arc::clone(&running);
    let reader_handle = thread::spawn(move || {
        let mut reads = 0_u64;
        while running_for_reader.load(Ordering::Relaxed) {
            let value = acc_for_reader.load();
            // Only bits from the writers' patterns can ever be set
            assert_eq!(value & !0x1111_1111, 0, "Torn value: {value:#x}");
            reads += 1;
            thread::sleep(Duration::from_micros(100));
        }
        reads
    });

    // Let it run for a bit
    thread::sleep(Duration::from_millis(100));
    running.store(false, Ordering::Release);

    for h in writer_handles {
        h.join().unwrap();
    }
    let reads = reader_handle.join().unwrap();

    assert!(write_count.load(Ordering::Acquire) > 0);
    assert!(
        reads > 10,
        "Reader should have done multiple reads, got {reads}"
    );
}
