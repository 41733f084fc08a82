//! JSON output format with schema versioning.
//!
//! This module provides structured JSON output for benchmark results,
//! enabling machine-readable analysis and re-rendering with
//! `xorfold-bench report`.
//!
//! # Schema Versioning
//!
//! The output includes a schema version to allow consumers to handle
//! format changes gracefully. The current schema version is 1.
//!
//! # Example Output
//!
//! ```json
//! {
//!   "schema_version": 1,
//!   "tool": "xorfold",
//!   "tool_version": "0.1.0",
//!   "config": {...},
//!   "measurements": [...],
//!   "summary": [...]
//! }
//! ```

use crate::bench::{BenchConfig, BenchResults, Measurement, SizeReport};
use crate::reduce::Strategy;
use serde::{Deserialize, Serialize};

/// Current schema version for the JSON output format.
///
/// Increment this when making breaking changes to the output structure.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete benchmark output in JSON format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonOutput {
    /// Schema version for format compatibility checking.
    pub schema_version: u32,
    /// Name of the tool.
    pub tool: String,
    /// Version of the tool.
    pub tool_version: String,
    /// Configuration the run used, with the seed filled in.
    pub config: ConfigEntry,
    /// Every measurement, in run order.
    pub measurements: Vec<MeasurementEntry>,
    /// One entry per problem size.
    pub summary: Vec<SummaryEntry>,
}

/// The configuration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Problem sizes, in order.
    pub sizes: Vec<usize>,
    /// Worker threads for the parallel strategies.
    pub threads: usize,
    /// Predicate modulus.
    pub modulus: i32,
    /// Seed the input arrays were generated from.
    pub seed: u64,
    /// Strategies, in run order.
    pub strategies: Vec<Strategy>,
}

/// A single measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementEntry {
    /// Array length.
    pub size: usize,
    /// Strategy that ran.
    pub strategy: Strategy,
    /// Wall-clock time in seconds.
    pub elapsed_secs: f64,
    /// XOR fold produced.
    pub result: i32,
    /// Failed CAS attempts.
    pub cas_retries: u64,
    /// Sequential time divided by this time, when a sequential run exists
    /// for the same size.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub speedup: Option<f64>,
}

impl MeasurementEntry {
    /// Creates an entry from a measurement, given the sequential baseline.
    #[must_use]
    pub fn from_measurement(m: &Measurement, baseline_secs: Option<f64>) -> Self {
        let elapsed_secs = m.elapsed_secs();
        let speedup = baseline_secs
            .filter(|_| elapsed_secs > 0.0)
            .map(|base| base / elapsed_secs);
        Self {
            size: m.size,
            strategy: m.strategy,
            elapsed_secs,
            result: m.value,
            cas_retries: m.cas_retries,
            speedup,
        }
    }
}

/// Per-size summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryEntry {
    /// Array length.
    pub size: usize,
    /// Whether every strategy agreed on the result.
    pub consistent: bool,
    /// Strategy with the lowest elapsed time.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub fastest: Option<Strategy>,
}

impl SummaryEntry {
    /// Creates a summary entry from a size report.
    #[must_use]
    pub fn from_report(report: &SizeReport) -> Self {
        let fastest = report
            .measurements
            .iter()
            .min_by_key(|m| m.elapsed)
            .map(|m| m.strategy);
        Self {
            size: report.size,
            consistent: report.consistent,
            fastest,
        }
    }
}

impl JsonOutput {
    /// Returns true if every size produced consistent results.
    #[must_use]
    pub fn all_consistent(&self) -> bool {
        self.summary.iter().all(|s| s.consistent)
    }
}

/// Generates JSON output from benchmark results.
#[must_use]
pub fn generate_output(results: &BenchResults, config: &BenchConfig) -> JsonOutput {
    let mut measurements = Vec::new();
    for report in &results.reports {
        let baseline = report
            .measurements
            .iter()
            .find(|m| m.strategy == Strategy::Sequential)
            .map(Measurement::elapsed_secs);
        measurements.extend(
            report
                .measurements
                .iter()
                .map(|m| MeasurementEntry::from_measurement(m, baseline)),
        );
    }

    JsonOutput {
        schema_version: SCHEMA_VERSION,
        tool: "xorfold".to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        config: ConfigEntry {
            sizes: config.sizes.clone(),
            threads: config.threads,
            modulus: config.modulus,
            seed: results.seed,
            strategies: config.strategies.clone(),
        },
        measurements,
        summary: results.reports.iter().map(SummaryEntry::from_report).collect(),
    }
}

/// Serializes benchmark results to a JSON string.
///
/// # Errors
///
/// Returns an error if JSON serialization fails (should not happen in practice).
pub fn to_json_string(
    results: &BenchResults,
    config: &BenchConfig,
    pretty: bool,
) -> Result<String, serde_json::Error> {
    let output = generate_output(results, config);
    if pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }
}
