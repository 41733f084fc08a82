//! Command-line driver for the xorfold benchmark.
//!
//! Runs the Sequential, Mutex and CAS reduction strategies over a list of
//! problem sizes and prints a results table.
//!
//! # Usage
//!
//! ```bash
//! xorfold-bench run --sizes 10000,1000000 --threads 8
//! xorfold-bench run --format json --output results.json
//! xorfold-bench report results.json --format csv
//! ```
//!
//! Flags that are not given fall back to the `XORFOLD_*` environment
//! variables, then to the built-in defaults.

// CLI tools need to print to stdout/stderr
#![allow(clippy::print_stdout, clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use xorfold::generate::entropy_seed;
use xorfold::json_output::{generate_output, JsonOutput, MeasurementEntry};
use xorfold::{BenchConfig, Strategy, Suite};

/// Benchmark parallel XOR reduction strategies.
#[derive(Parser, Debug)]
#[command(name = "xorfold-bench", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Run the benchmark suite.
    Run(RunArgs),
    /// Re-render a saved JSON report.
    Report(ReportArgs),
}

/// Output formats.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    /// Aligned results table.
    Text,
    /// Comma-separated rows.
    Csv,
    /// Schema-versioned JSON document.
    Json,
}

/// Arguments for the run subcommand.
#[derive(Parser, Debug)]
struct RunArgs {
    /// Problem sizes to benchmark, comma separated.
    #[arg(long, value_delimiter = ',')]
    sizes: Option<Vec<usize>>,

    /// Worker threads for the parallel strategies.
    #[arg(long, short)]
    threads: Option<usize>,

    /// Predicate modulus (elements divisible by it are folded).
    #[arg(long, allow_negative_numbers = true)]
    modulus: Option<i32>,

    /// RNG seed for the input arrays. Drawn from OS entropy if omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Strategies to run, comma separated (sequential, mutex, cas).
    #[arg(long = "strategy", value_delimiter = ',')]
    strategies: Option<Vec<Strategy>>,

    /// Output format written to stdout.
    #[arg(long, short, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Also write the JSON report to this file.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

/// Arguments for the report subcommand.
#[derive(Parser, Debug)]
struct ReportArgs {
    /// Path to a JSON report written by `run`.
    input: PathBuf,

    /// Output format.
    #[arg(long, short, value_enum, default_value_t = Format::Text)]
    format: Format,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run_benchmark(&args),
        Command::Report(args) => generate_report(&args),
    }
}

/// Merges command-line flags over the environment configuration.
fn build_config(args: &RunArgs) -> Result<BenchConfig> {
    let mut config = BenchConfig::from_env().context("Invalid XORFOLD_* environment")?;

    if let Some(ref sizes) = args.sizes {
        config.sizes.clone_from(sizes);
    }
    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    if let Some(modulus) = args.modulus {
        config.modulus = modulus;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(ref strategies) = args.strategies {
        config.strategies.clone_from(strategies);
    }

    // Fix the seed now so it can be reported before the first size runs.
    if config.seed.is_none() {
        config.seed = Some(entropy_seed());
    }

    config.validate().context("Invalid benchmark configuration")?;
    Ok(config)
}

/// Runs the suite, streaming rows for the text and CSV formats.
fn run_benchmark(args: &RunArgs) -> Result<()> {
    let config = build_config(args)?;
    let suite = Suite::new(config.clone())?;

    eprintln!(
        "Running {} size(s) with {} thread(s), modulus {}, seed {}",
        config.sizes.len(),
        config.threads,
        config.modulus,
        config.seed.unwrap_or_default()
    );

    match args.format {
        Format::Text => print_text_header(),
        Format::Csv => println!("{CSV_HEADER}"),
        Format::Json => {}
    }

    let results = suite.run(|m| {
        let row = MeasurementEntry::from_measurement(m, None);
        match args.format {
            Format::Text => println!("{}", text_row(&row)),
            Format::Csv => println!("{}", csv_row(&row)),
            Format::Json => eprintln!(
                "  {} {}: {:.6}s",
                row.size,
                row.strategy.name(),
                row.elapsed_secs
            ),
        }
    })?;

    let output = generate_output(&results, &config);

    match args.format {
        Format::Text => print_summary(&output),
        Format::Json => println!("{}", serde_json::to_string_pretty(&output)?),
        Format::Csv => {}
    }

    if let Some(ref path) = args.output {
        let json = serde_json::to_string_pretty(&output)?;
        std::fs::write(path, &json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("Results written to: {}", path.display());
    }

    check_consistency(&output)
}

/// Fails if any size produced disagreeing results.
fn check_consistency(output: &JsonOutput) -> Result<()> {
    let mismatched: Vec<usize> = output
        .summary
        .iter()
        .filter(|s| !s.consistent)
        .map(|s| s.size)
        .collect();

    if mismatched.is_empty() {
        return Ok(());
    }

    for size in &mismatched {
        let values: Vec<String> = output
            .measurements
            .iter()
            .filter(|m| m.size == *size)
            .map(|m| format!("{}={}", m.strategy.name(), m.result))
            .collect();
        eprintln!("MISMATCH at size {size}: {}", values.join(", "));
    }
    anyhow::bail!("strategies disagreed on {} size(s)", mismatched.len())
}

/// Re-renders a saved report.
fn generate_report(args: &ReportArgs) -> Result<()> {
    let file = File::open(&args.input).context("Failed to open input file")?;
    let report: JsonOutput =
        serde_json::from_reader(BufReader::new(file)).context("Failed to parse report")?;

    if report.schema_version != xorfold::json_output::SCHEMA_VERSION {
        anyhow::bail!(
            "unsupported schema version {} (expected {})",
            report.schema_version,
            xorfold::json_output::SCHEMA_VERSION
        );
    }

    match args.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        Format::Csv => {
            println!("{CSV_HEADER}");
            for m in &report.measurements {
                println!("{}", csv_row(m));
            }
        }
        Format::Text => {
            print_text_header();
            for m in &report.measurements {
                println!("{}", text_row(m));
            }
            print_summary(&report);
        }
    }

    Ok(())
}

const CSV_HEADER: &str = "size,strategy,elapsed_secs,result,cas_retries";

fn csv_row(m: &MeasurementEntry) -> String {
    format!(
        "{},{},{:.6},{},{}",
        m.size,
        m.strategy.name(),
        m.elapsed_secs,
        m.result,
        m.cas_retries
    )
}

fn print_text_header() {
    println!("\n=================================== XOR Test Results ===================================");
    println!(
        "{:<15}{:<15}{:<20}{:<15}CAS retries",
        "Matrix Size", "Mode", "Time (s)", "XOR Result"
    );
    println!("{:-<88}", "");
}

fn text_row(m: &MeasurementEntry) -> String {
    format!(
        "{:<15}{:<15}{:<20.6}{:<15}{}",
        m.size,
        m.strategy.name(),
        m.elapsed_secs,
        m.result,
        m.cas_retries
    )
}

/// Prints per-size speedups and the fastest strategy.
fn print_summary(report: &JsonOutput) {
    println!("\n=== Summary (seed {}, {} threads) ===", report.config.seed, report.config.threads);

    for entry in &report.summary {
        let speedups: Vec<String> = report
            .measurements
            .iter()
            .filter(|m| m.size == entry.size && m.strategy != Strategy::Sequential)
            .filter_map(|m| m.speedup.map(|s| format!("{} {s:.2}x", m.strategy.name())))
            .collect();

        println!(
            "{:<15}fastest: {:<12}{}{}",
            entry.size,
            entry.fastest.map_or("-", Strategy::name),
            if speedups.is_empty() {
                String::new()
            } else {
                format!("vs sequential: {}", speedups.join(", "))
            },
            if entry.consistent { "" } else { "  MISMATCH" }
        );
    }
}
