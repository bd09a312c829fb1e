//! High-level analysis entry point
//!
//! [`Analyzer`] bundles an [`AnalysisConfig`] and runs the full pipeline for
//! one test case: parse the dump, classify the filtered signals, aggregate
//! the report. A dump that cannot be read yields an `Error`-status report for
//! that test case alone; it never aborts the caller's batch.

use crate::classify::{classify, AnalysisConfig};
use crate::parser::Waveform;
use crate::report::TestReport;
use crate::types::AnalyzerError;
use std::io::BufRead;
use std::path::Path;

/// The main analyzer - entry point for per-test-case analysis
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    /// Create an analyzer with the given analysis parameters
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// The analysis parameters in use
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze one dump file and produce its test report.
    ///
    /// # Example
    /// ```no_run
    /// use vcd_xcheck::{AnalysisConfig, Analyzer};
    /// use std::path::Path;
    ///
    /// let analyzer = Analyzer::new(
    ///     AnalysisConfig::new(300_000, 500_000).with_path_filter("dut"),
    /// );
    /// let report = analyzer.analyze_file("fifo_reset_tb", Path::new("wave.vcd"));
    /// println!("{}: {}", report.name, report.status);
    /// ```
    pub fn analyze_file(&self, name: &str, path: &Path) -> TestReport {
        match Waveform::parse_file(path) {
            Ok(waveform) => self.finish(name, &waveform),
            Err(AnalyzerError::SourceUnavailable(msg)) => {
                log::error!("{}: dump unavailable: {}", name, msg);
                TestReport::errored(name)
            }
            Err(e) => {
                log::error!("{}: dump unreadable: {}", name, e);
                TestReport::errored(name)
            }
        }
    }

    /// Analyze a dump from an in-memory or streaming source
    pub fn analyze_reader<R: BufRead>(&self, name: &str, reader: R) -> TestReport {
        match Waveform::parse_reader(reader) {
            Ok(waveform) => self.finish(name, &waveform),
            Err(e) => {
                log::error!("{}: dump unreadable: {}", name, e);
                TestReport::errored(name)
            }
        }
    }

    fn finish(&self, name: &str, waveform: &Waveform) -> TestReport {
        for warning in waveform.warnings() {
            log::warn!("{}: {}", name, warning);
        }
        let classifications = classify(waveform, &self.config);
        let report = TestReport::aggregate(name, waveform, &classifications);
        log::info!(
            "{}: {} ({} analyzed, {} persistent)",
            report.name,
            report.status,
            report.signals_analyzed,
            report.persistent.len()
        );
        report
    }
}
