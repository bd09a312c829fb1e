//! VCD X-State Analysis Library
//!
//! A library for detecting signals that remain in an unknown ("X") logic
//! state after a hardware design's reset sequence should have completed. It
//! parses textual value-change dumps produced by digital simulation and
//! classifies each signal's X-state behavior against configurable time
//! thresholds.
//!
//! # Architecture
//!
//! Data flows strictly forward through five stages:
//! - [`tokenizer`]: raw dump text into structural tokens, streaming,
//!   tolerant of malformed lines
//! - [`header`]: declaration tokens into the scope-qualified signal table
//! - [`timeline`]: time markers and value changes into per-signal timelines
//! - [`classify`]: timelines plus thresholds into per-signal classifications
//! - [`report`]: classifications into per-test and batch reports
//!
//! The library does NOT:
//! - Invoke a simulator or build hardware sources
//! - Parse non-binary value kinds (reals, strings) or merge multiple dumps
//! - Print human-readable output beyond the structured report types
//!
//! Those concerns belong to the application layer (vcd-xcheck-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use vcd_xcheck::{AnalysisConfig, Analyzer, TestStatus};
//! use std::path::Path;
//!
//! let analyzer = Analyzer::new(
//!     AnalysisConfig::new(300_000, 500_000).with_path_filter("dut"),
//! );
//!
//! let report = analyzer.analyze_file("fifo_reset_tb", Path::new("wave.vcd"));
//! for entry in &report.persistent {
//!     eprintln!("  - {} @ {}: {}", entry.signal, entry.time, entry.value);
//! }
//! assert_eq!(report.status, TestStatus::Pass);
//! ```

// Public modules
pub mod analyzer;
pub mod classify;
pub mod header;
pub mod parser;
pub mod report;
pub mod timeline;
pub mod tokenizer;
pub mod types;

// Re-export main types for convenience
pub use analyzer::Analyzer;
pub use classify::{classify, AnalysisConfig, Classification, PersistentX, SignalFilter};
pub use parser::Waveform;
pub use report::{BatchReport, BatchVerdict, PersistentEntry, TestReport, TestStatus};
pub use types::{
    AnalyzerError, LogicValue, ParseWarning, Result, Signal, SignalId, SignalTable,
    SimTime, ValueRecord,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
