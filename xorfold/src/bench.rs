//! Benchmark suite driving every strategy over a list of problem sizes.
//!
//! For each problem size the suite:
//! 1. Generates one random array
//! 2. Times each configured strategy on that array, strictly one after another
//! 3. Checks that every strategy produced the same value
//!
//! Strategies never overlap, so one strategy's workers cannot skew another's
//! timing.

use crate::error::ConfigError;
use crate::generate::{entropy_seed, random_numbers, seeded_rng};
use crate::predicate::DEFAULT_MODULUS;
use crate::reduce::{reduce, Strategy};
use std::hint::black_box;
use std::time::{Duration, Instant};

/// Problem sizes benchmarked when none are configured.
pub const DEFAULT_SIZES: [usize; 4] = [10_000, 1_000_000, 100_000_000, 500_000_000];

/// Worker threads used by the parallel strategies when none are configured.
pub const DEFAULT_THREADS: usize = 8;

/// Configuration for a benchmark run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    /// Array lengths to benchmark, in order.
    pub sizes: Vec<usize>,
    /// Worker threads for the parallel strategies.
    pub threads: usize,
    /// Predicate modulus.
    pub modulus: i32,
    /// RNG seed. `None` draws one from OS entropy.
    pub seed: Option<u64>,
    /// Strategies to run for every size, in order.
    pub strategies: Vec<Strategy>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            sizes: DEFAULT_SIZES.to_vec(),
            threads: DEFAULT_THREADS,
            modulus: DEFAULT_MODULUS,
            seed: None,
            strategies: Strategy::ALL.to_vec(),
        }
    }
}

impl BenchConfig {
    /// Builds a configuration from the defaults overlaid with `XORFOLD_*`
    /// environment variables.
    ///
    /// Recognized variables: `XORFOLD_SIZES` and `XORFOLD_STRATEGIES` (comma
    /// separated), `XORFOLD_THREADS`, `XORFOLD_MODULUS`, `XORFOLD_SEED`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if a variable cannot be parsed, or
    /// any error from [`BenchConfig::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`BenchConfig::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`BenchConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("XORFOLD_SIZES") {
            config.sizes = parse_list("XORFOLD_SIZES", &raw, parse_number::<usize>)?;
        }
        if let Some(raw) = lookup("XORFOLD_THREADS") {
            config.threads = parse_number::<usize>("XORFOLD_THREADS", &raw)?;
        }
        if let Some(raw) = lookup("XORFOLD_MODULUS") {
            config.modulus = parse_number::<i32>("XORFOLD_MODULUS", &raw)?;
        }
        if let Some(raw) = lookup("XORFOLD_SEED") {
            config.seed = Some(parse_number::<u64>("XORFOLD_SEED", &raw)?);
        }
        if let Some(raw) = lookup("XORFOLD_STRATEGIES") {
            config.strategies = parse_list("XORFOLD_STRATEGIES", &raw, |var, item| {
                item.parse::<Strategy>().map_err(|e| ConfigError::InvalidEnv {
                    var,
                    value: item.to_string(),
                    reason: e.to_string(),
                })
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration before any data is generated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptySizes`], [`ConfigError::EmptyStrategies`],
    /// [`ConfigError::ZeroThreads`] or [`ConfigError::ZeroModulus`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sizes.is_empty() {
            return Err(ConfigError::EmptySizes);
        }
        if self.strategies.is_empty() {
            return Err(ConfigError::EmptyStrategies);
        }
        if self.threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        if self.modulus == 0 {
            return Err(ConfigError::ZeroModulus);
        }
        Ok(())
    }
}

fn parse_number<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .replace('_', "")
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnv {
            var,
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

fn parse_list<T, P>(var: &'static str, raw: &str, parse: P) -> Result<Vec<T>, ConfigError>
where
    P: Fn(&'static str, &str) -> Result<T, ConfigError>,
{
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| parse(var, item))
        .collect()
}

/// One timed reduction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Array length.
    pub size: usize,
    /// Strategy that ran.
    pub strategy: Strategy,
    /// Wall-clock time of the reduction alone (generation excluded).
    pub elapsed: Duration,
    /// XOR fold produced.
    pub value: i32,
    /// Failed CAS attempts (0 unless the strategy is CAS).
    pub cas_retries: u64,
}

impl Measurement {
    /// Elapsed time in fractional seconds.
    #[must_use]
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// All measurements for one problem size.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeReport {
    /// Array length.
    pub size: usize,
    /// One measurement per strategy, in run order.
    pub measurements: Vec<Measurement>,
    /// True if every strategy produced the same value.
    pub consistent: bool,
}

/// Results of a full suite run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchResults {
    /// Seed the input arrays were generated from.
    pub seed: u64,
    /// Per-size reports, in configured order.
    pub reports: Vec<SizeReport>,
}

impl BenchResults {
    /// Returns true if every size produced consistent values.
    #[must_use]
    pub fn all_consistent(&self) -> bool {
        self.reports.iter().all(|r| r.consistent)
    }

    /// Iterates over every measurement in run order.
    pub fn measurements(&self) -> impl Iterator<Item = &Measurement> {
        self.reports.iter().flat_map(|r| r.measurements.iter())
    }
}

/// The benchmark suite.
#[derive(Debug, Clone)]
pub struct Suite {
    config: BenchConfig,
}

impl Suite {
    /// Creates a suite after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns any error from [`BenchConfig::validate`].
    pub fn new(config: BenchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the suite configuration.
    #[must_use]
    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Runs every configured size and strategy.
    ///
    /// `on_measurement` is called as soon as each measurement is taken, so
    /// callers can stream rows while large sizes are still running.
    ///
    /// # Errors
    ///
    /// Propagates configuration errors from the reducers. A suite built with
    /// [`Suite::new`] has already been validated.
    pub fn run<F>(&self, mut on_measurement: F) -> Result<BenchResults, ConfigError>
    where
        F: FnMut(&Measurement),
    {
        let seed = self.config.seed.unwrap_or_else(entropy_seed);
        let mut rng = seeded_rng(seed);
        let mut reports = Vec::with_capacity(self.config.sizes.len());

        for &size in &self.config.sizes {
            let numbers = random_numbers(size, &mut rng);
            let mut measurements = Vec::with_capacity(self.config.strategies.len());

            for &strategy in &self.config.strategies {
                let start = Instant::now();
                let reduction = reduce(
                    black_box(&numbers),
                    self.config.modulus,
                    self.config.threads,
                    strategy,
                )?;
                let elapsed = start.elapsed();

                let measurement = Measurement {
                    size,
                    strategy,
                    elapsed,
                    value: black_box(reduction.value),
                    cas_retries: reduction.cas_retries,
                };
                on_measurement(&measurement);
                measurements.push(measurement);
            }

            let consistent = measurements
                .windows(2)
                .all(|pair| pair[0].value == pair[1].value);
            reports.push(SizeReport {
                size,
                measurements,
                consistent,
            });
        }

        Ok(BenchResults { seed, reports })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    fn small_config() -> BenchConfig {
        BenchConfig {
            sizes: vec![0, 7, 1_000, 10_001],
            threads: 4,
            seed: Some(99),
            ..BenchConfig::default()
        }
    }

    #[test]
    fn defaults_match_reference_driver() {
        let config = BenchConfig::default();
        assert_eq!(config.sizes, vec![10_000, 1_000_000, 100_000_000, 500_000_000]);
        assert_eq!(config.threads, 8);
        assert_eq!(config.modulus, 15);
        assert_eq!(config.strategies, Strategy::ALL.to_vec());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_overlay() {
        let config = BenchConfig::from_lookup(env(&[
            ("XORFOLD_SIZES", "1_000, 20 ,"),
            ("XORFOLD_THREADS", "3"),
            ("XORFOLD_SEED", "12"),
            ("XORFOLD_STRATEGIES", "cas,mutex"),
        ]))
        .unwrap();
        assert_eq!(config.sizes, vec![1_000, 20]);
        assert_eq!(config.threads, 3);
        assert_eq!(config.modulus, 15);
        assert_eq!(config.seed, Some(12));
        assert_eq!(config.strategies, vec![Strategy::Cas, Strategy::Mutex]);
    }

    #[test]
    fn env_parse_errors_name_the_variable() {
        let err = BenchConfig::from_lookup(env(&[("XORFOLD_THREADS", "lots")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv {
                var: "XORFOLD_THREADS",
                ..
            }
        ));

        let err = BenchConfig::from_lookup(env(&[("XORFOLD_STRATEGIES", "cas,rcu")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv {
                var: "XORFOLD_STRATEGIES",
                ..
            }
        ));
    }

    #[test]
    fn env_values_are_validated() {
        assert_eq!(
            BenchConfig::from_lookup(env(&[("XORFOLD_THREADS", "0")])).unwrap_err(),
            ConfigError::ZeroThreads
        );
        assert_eq!(
            BenchConfig::from_lookup(env(&[("XORFOLD_SIZES", " , ")])).unwrap_err(),
            ConfigError::EmptySizes
        );
        assert_eq!(
            BenchConfig::from_lookup(env(&[("XORFOLD_STRATEGIES", " , ")])).unwrap_err(),
            ConfigError::EmptyStrategies
        );
        assert_eq!(
            BenchConfig::from_lookup(env(&[("XORFOLD_MODULUS", "0")])).unwrap_err(),
            ConfigError::ZeroModulus
        );
    }

    #[test]
    fn suite_rejects_empty_strategy_list() {
        let config = BenchConfig {
            strategies: Vec::new(),
            ..small_config()
        };
        assert_eq!(Suite::new(config).unwrap_err(), ConfigError::EmptyStrategies);
    }

    #[test]
    fn suite_rejects_bad_config() {
        let config = BenchConfig {
            threads: 0,
            ..small_config()
        };
        assert_eq!(Suite::new(config).unwrap_err(), ConfigError::ZeroThreads);
    }

    #[test]
    fn suite_runs_every_size_and_strategy() {
        let suite = Suite::new(small_config()).unwrap();
        let mut streamed = Vec::new();
        let results = suite.run(|m| streamed.push((m.size, m.strategy))).unwrap();

        assert_eq!(results.seed, 99);
        assert_eq!(results.reports.len(), 4);
        assert!(results.all_consistent());
        assert_eq!(streamed.len(), 12);
        assert_eq!(results.measurements().count(), 12);
        for (report, size) in results.reports.iter().zip([0, 7, 1_000, 10_001]) {
            assert_eq!(report.size, size);
            let order: Vec<_> = report.measurements.iter().map(|m| m.strategy).collect();
            assert_eq!(order, Strategy::ALL.to_vec());
        }
        let first_retries: Vec<_> = results.reports[0]
            .measurements
            .iter()
            .map(|m| m.cas_retries)
            .collect();
        assert_eq!(first_retries, vec![0, 0, 0]);
    }

    #[test]
    fn same_seed_same_values() {
        let suite = Suite::new(small_config()).unwrap();
        let a = suite.run(|_| {}).unwrap();
        let b = suite.run(|_| {}).unwrap();
        let values = |r: &BenchResults| r.measurements().map(|m| m.value).collect::<Vec<_>>();
        assert_eq!(values(&a), values(&b));
    }
}
