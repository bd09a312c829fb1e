//! VCD X-Check CLI Application
//!
//! Command-line interface for the VCD X-state analyzer. It uses the
//! vcd-xcheck library and adds:
//! - Single-dump analysis from command-line thresholds
//! - TOML-configured batch runs over many test cases
//! - Parallel batch execution with deterministic report ordering
//! - Text and JSON report output with process exit codes

use anyhow::{bail, Result};
use clap::Parser;
use rayon::prelude::*;
use std::path::PathBuf;
use vcd_xcheck::{AnalysisConfig, Analyzer, BatchReport, SimTime};

mod config;
mod output;

/// VCD X-Check - detect X states persisting after reset in simulation dumps
#[derive(Parser, Debug)]
#[command(name = "vcd-xcheck-cli")]
#[command(about = "Analyze VCD dumps for X states persisting after reset", long_about = None)]
#[command(version)]
struct Args {
    /// Path to a single VCD dump to analyze
    #[arg(short, long, value_name = "FILE")]
    dump: Option<PathBuf>,

    /// Reset release time for single-dump mode (dump time units)
    #[arg(long, value_name = "TIME", default_value_t = 300_000)]
    reset_release: SimTime,

    /// Post-reset observation time for single-dump mode (dump time units)
    #[arg(long, value_name = "TIME", default_value_t = 500_000)]
    post_reset: SimTime,

    /// Only analyze signals whose qualified name contains this substring
    /// (can be repeated)
    #[arg(short, long, value_name = "SUBSTR")]
    filter: Vec<String>,

    /// Path to a batch configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Emit the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("VCD X-Check CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using analyzer library v{}", vcd_xcheck::VERSION);

    let exit_code = if let Some(dump) = &args.dump {
        single_dump_mode(dump, &args)?
    } else if let Some(config_path) = &args.config {
        batch_mode(config_path, &args)?
    } else {
        println!("VCD X-Check - No input specified");
        println!("\nQuick Start:");
        println!("  vcd-xcheck-cli --dump wave.vcd --filter dut");
        println!("  vcd-xcheck-cli --dump wave.vcd --reset-release 300000 --post-reset 500000");
        println!("\nFor batch runs over many test cases:");
        println!("  vcd-xcheck-cli --config checks.toml");
        println!("\nUse --help for more options");
        0
    };

    std::process::exit(exit_code);
}

/// Single-dump mode: thresholds and filter from the command line
fn single_dump_mode(dump: &PathBuf, args: &Args) -> Result<i32> {
    let mut analysis = AnalysisConfig::new(args.reset_release, args.post_reset);
    analysis = match args.filter.len() {
        0 => analysis,
        1 => analysis.with_path_filter(args.filter[0].clone()),
        _ => analysis.with_filter(vcd_xcheck::SignalFilter::AnyPathContains(
            args.filter.clone(),
        )),
    };

    let name = dump
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dump")
        .to_string();

    let analyzer = Analyzer::new(analysis);
    let report = analyzer.analyze_file(&name, dump);
    let batch = BatchReport::new(vec![report]);

    emit(&batch, args.json, 20)?;
    Ok(batch.verdict.exit_code())
}

/// Batch mode: test list, thresholds and filters from a TOML config
fn batch_mode(config_path: &PathBuf, args: &Args) -> Result<i32> {
    log::info!("Loading configuration from: {:?}", config_path);
    let app_config = config::load_config(config_path)?;

    if app_config.tests.is_empty() {
        bail!("Config {:?} declares no [[tests]] entries", config_path);
    }

    let analyzer = Analyzer::new(app_config.analysis.to_analysis_config());
    log::info!(
        "Running {} test case(s): reset_release={}, post_reset={}",
        app_config.tests.len(),
        analyzer.config().reset_release_time,
        analyzer.config().post_reset_time
    );

    // Each dump owns its own parsing session, so test cases run in
    // parallel; collect preserves config order, keeping the report
    // ordered by test identity rather than completion time.
    let reports = app_config
        .tests
        .par_iter()
        .map(|test| analyzer.analyze_file(&test.name, &test.dump))
        .collect();
    let batch = BatchReport::new(reports);

    let json = args.json || app_config.output.format == config::OutputFormat::Json;
    emit(&batch, json, app_config.output.max_listed)?;
    Ok(batch.verdict.exit_code())
}

fn emit(batch: &BatchReport, json: bool, max_listed: usize) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if json {
        output::print_json(&mut out, batch)
    } else {
        output::print_text(&mut out, batch, max_listed)
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
