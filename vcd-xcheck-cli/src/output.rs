//! Report printing
//!
//! Renders a [`BatchReport`] as a human-readable summary or as JSON. Text
//! mode truncates long persistent-X listings per test; JSON output is always
//! complete.

use anyhow::Result;
use std::io::Write;
use vcd_xcheck::{BatchReport, TestReport, TestStatus};

const RULE: &str =
    "======================================================================";

/// Print the full batch report as text
pub fn print_text<W: Write>(out: &mut W, batch: &BatchReport, max_listed: usize) -> Result<()> {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "VCD X-State Analysis After Reset")?;
    writeln!(out, "{}", RULE)?;

    for test in &batch.tests {
        print_test(out, test, max_listed)?;
    }

    writeln!(out, "\n{}", RULE)?;
    writeln!(out, "SUMMARY")?;
    writeln!(out, "{}", RULE)?;
    for test in &batch.tests {
        let status = match test.status {
            TestStatus::Pass => "PASS".to_string(),
            TestStatus::Fail => format!("FAIL ({} persistent X)", test.persistent.len()),
            TestStatus::Error => "ERROR".to_string(),
        };
        writeln!(out, "  {}: {}", test.name, status)?;
    }
    writeln!(out, "\nTotal persistent X states: {}", batch.total_persistent())?;

    Ok(())
}

/// Print one test case section
fn print_test<W: Write>(out: &mut W, test: &TestReport, max_listed: usize) -> Result<()> {
    writeln!(out, "\n{}", RULE)?;
    writeln!(out, "Test: {}", test.name)?;
    writeln!(out, "{}", RULE)?;

    if test.status == TestStatus::Error {
        writeln!(out, "  ERROR: dump missing or unreadable")?;
        return Ok(());
    }

    writeln!(out, "  Signals analyzed: {}", test.signals_analyzed)?;
    writeln!(out, "  X at init (t=0): {}", test.x_at_init_count)?;
    writeln!(out, "  X cleared by reset: {}", test.x_cleared_count)?;
    writeln!(
        out,
        "  X persisting after reset release: {}",
        test.persistent.len()
    )?;

    if test.persistent.is_empty() {
        writeln!(out, "\n  No X states after reset release")?;
    } else {
        writeln!(out, "\n  Signals with X state after reset:")?;
        for entry in test.persistent.iter().take(max_listed) {
            writeln!(out, "    - {} @ {}: {}", entry.signal, entry.time, entry.value)?;
        }
        if test.persistent.len() > max_listed {
            writeln!(
                out,
                "    ... and {} more",
                test.persistent.len() - max_listed
            )?;
        }
    }

    Ok(())
}

/// Print the full batch report as JSON
pub fn print_json<W: Write>(out: &mut W, batch: &BatchReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, batch)?;
    writeln!(out)?;
    Ok(())
}
