//! Report aggregation
//!
//! Combines per-signal classifications into a per-test-case [`TestReport`]
//! and per-test reports into a [`BatchReport`] with an overall verdict. All
//! report types serialize with serde so the CLI can emit them as JSON
//! unchanged.

use crate::classify::Classification;
use crate::parser::Waveform;
use crate::types::{SignalId, SimTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Outcome of one test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// No unknown state persisted past reset release
    Pass,
    /// At least one signal kept an unknown state after reset release
    Fail,
    /// The dump source could not be produced or read
    Error,
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Pass => write!(f, "PASS"),
            TestStatus::Fail => write!(f, "FAIL"),
            TestStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// One signal that kept an unknown state after reset release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentEntry {
    /// Fully qualified signal name
    pub signal: String,
    /// Time of the earliest offending record
    pub time: SimTime,
    /// The offending value
    pub value: String,
}

/// Aggregated X-state result for one test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestReport {
    /// Test case identity
    pub name: String,
    /// Number of signals that passed the filter and had records
    pub signals_analyzed: usize,
    /// Signals whose earliest record contained an unknown state
    pub x_at_init_count: usize,
    /// Signals that started unknown but were clean by the post-reset point
    pub x_cleared_count: usize,
    /// Signals with an unknown state persisting after reset release, in
    /// signal declaration order
    pub persistent: Vec<PersistentEntry>,
    /// Overall outcome for this test case
    pub status: TestStatus,
}

impl TestReport {
    /// Build the report for one analyzed waveform.
    ///
    /// Iterates the signal table in declaration order so `persistent` is
    /// deterministic regardless of classification map iteration order.
    pub fn aggregate(
        name: impl Into<String>,
        waveform: &Waveform,
        classifications: &HashMap<SignalId, Classification>,
    ) -> Self {
        let mut x_at_init_count = 0;
        let mut x_cleared_count = 0;
        let mut persistent = Vec::new();

        for signal in waveform.signals().iter() {
            let Some(c) = classifications.get(&signal.id) else {
                continue;
            };
            if c.has_x_at_init {
                x_at_init_count += 1;
            }
            if c.x_cleared_by_post_reset {
                x_cleared_count += 1;
            }
            if let Some(p) = &c.x_persists_after_reset {
                persistent.push(PersistentEntry {
                    signal: signal.full_name(),
                    time: p.time,
                    value: p.value.as_str().to_string(),
                });
            }
        }

        let status = if persistent.is_empty() {
            TestStatus::Pass
        } else {
            TestStatus::Fail
        };

        Self {
            name: name.into(),
            signals_analyzed: classifications.len(),
            x_at_init_count,
            x_cleared_count,
            persistent,
            status,
        }
    }

    /// Build the report for a test whose dump could not be read
    pub fn errored(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signals_analyzed: 0,
            x_at_init_count: 0,
            x_cleared_count: 0,
            persistent: Vec::new(),
            status: TestStatus::Error,
        }
    }
}

/// Overall verdict across a batch of test cases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchVerdict {
    /// Every test passed
    AllPass,
    /// At least one test failed, none errored
    SomeFailed,
    /// At least one test errored
    SomeErrored,
}

impl BatchVerdict {
    /// Process exit code: 0 all pass, 1 some failed, 2 some errored
    pub fn exit_code(&self) -> i32 {
        match self {
            BatchVerdict::AllPass => 0,
            BatchVerdict::SomeFailed => 1,
            BatchVerdict::SomeErrored => 2,
        }
    }
}

/// The combined multi-test report.
///
/// Test order is the caller's submission order (test identity), never
/// completion order, so batch output stays deterministic under parallel
/// execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Per-test reports, ordered by test identity
    pub tests: Vec<TestReport>,
    /// Overall verdict
    pub verdict: BatchVerdict,
}

impl BatchReport {
    /// Combine per-test reports into the batch verdict.
    ///
    /// Error dominates failure: any errored test makes the batch
    /// `SomeErrored` even if other tests also failed.
    pub fn new(tests: Vec<TestReport>) -> Self {
        let verdict = if tests.iter().any(|t| t.status == TestStatus::Error) {
            BatchVerdict::SomeErrored
        } else if tests.iter().any(|t| t.status == TestStatus::Fail) {
            BatchVerdict::SomeFailed
        } else {
            BatchVerdict::AllPass
        };
        Self { tests, verdict }
    }

    /// Total persistent-X entries across all tests
    pub fn total_persistent(&self) -> usize {
        self.tests.iter().map(|t| t.persistent.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, AnalysisConfig};
    use crate::parser::Waveform;
    use std::io::Cursor;

    fn report_for(dump: &str, config: &AnalysisConfig) -> TestReport {
        let waveform = Waveform::parse_reader(Cursor::new(dump)).unwrap();
        let classifications = classify(&waveform, config);
        TestReport::aggregate("case", &waveform, &classifications)
    }

    #[test]
    fn test_clean_dump_passes() {
        let report = report_for(
            "$var wire 1 ! q $end\n\
             $enddefinitions $end\n\
             $dumpvars\n0!\n$end\n\
             #600000\n1!\n",
            &AnalysisConfig::new(300000, 500000),
        );
        assert_eq!(report.status, TestStatus::Pass);
        assert_eq!(report.signals_analyzed, 1);
        assert_eq!(report.x_at_init_count, 0);
        assert_eq!(report.x_cleared_count, 0);
        assert!(report.persistent.is_empty());
    }

    #[test]
    fn test_persistent_x_fails() {
        let report = report_for(
            "$scope module dut $end\n\
             $var wire 1 ! q $end\n\
             $upscope $end\n\
             $enddefinitions $end\n\
             #600000\nx!\n",
            &AnalysisConfig::new(300000, 500000),
        );
        assert_eq!(report.status, TestStatus::Fail);
        assert_eq!(
            report.persistent,
            vec![PersistentEntry {
                signal: "dut.q".to_string(),
                time: 600000,
                value: "x".to_string(),
            }]
        );
    }

    #[test]
    fn test_persistent_entries_in_declaration_order() {
        let report = report_for(
            "$var wire 1 ! a $end\n\
             $var wire 1 # b $end\n\
             $var wire 1 % c $end\n\
             $enddefinitions $end\n\
             #600000\nx%\nx!\nx#\n",
            &AnalysisConfig::new(300000, 500000),
        );
        let names: Vec<&str> = report.persistent.iter().map(|p| p.signal.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_classification_passes_by_default() {
        let report = report_for(
            "$var wire 1 ! q $end\n$enddefinitions $end\n",
            &AnalysisConfig::new(300000, 500000),
        );
        assert_eq!(report.status, TestStatus::Pass);
        assert_eq!(report.signals_analyzed, 0);
    }

    #[test]
    fn test_batch_verdict_precedence() {
        let pass = TestReport::aggregate(
            "p",
            &Waveform::parse_reader(Cursor::new("$enddefinitions $end\n")).unwrap(),
            &HashMap::new(),
        );
        let mut fail = pass.clone();
        fail.status = TestStatus::Fail;
        let error = TestReport::errored("e");

        let batch = BatchReport::new(vec![pass.clone()]);
        assert_eq!(batch.verdict, BatchVerdict::AllPass);
        assert_eq!(batch.verdict.exit_code(), 0);

        let batch = BatchReport::new(vec![pass.clone(), fail.clone()]);
        assert_eq!(batch.verdict, BatchVerdict::SomeFailed);
        assert_eq!(batch.verdict.exit_code(), 1);

        // Error dominates even when failures are present
        let batch = BatchReport::new(vec![pass, fail, error]);
        assert_eq!(batch.verdict, BatchVerdict::SomeErrored);
        assert_eq!(batch.verdict.exit_code(), 2);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = TestReport::errored("missing_dump");
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"status\":\"error\""));
    }
}
