//! Temporal X-state classification
//!
//! Given a finished [`Waveform`], a signal filter and two time thresholds,
//! computes per-signal X-state behavior relative to the reset sequence:
//! whether the signal started unknown, whether it was clean again by the
//! post-reset observation point, and whether any unknown value appears after
//! reset release.
//!
//! Threshold comparisons are half-open: a record at exactly the reset release
//! time counts as pre-release (`<=`), and "after" checks are strict (`>`).

use crate::parser::Waveform;
use crate::types::{LogicValue, Signal, SignalId, SimTime, ValueRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Predicate selecting which signals participate in classification.
///
/// Matching is over the signal's fully qualified name (scope path plus name).
/// Signals failing the filter are excluded from the result entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalFilter {
    /// Every declared signal participates
    #[default]
    All,
    /// The qualified name must contain this substring
    PathContains(String),
    /// The qualified name must contain at least one of these substrings
    AnyPathContains(Vec<String>),
}

impl SignalFilter {
    /// True if `signal` should be classified
    pub fn matches(&self, signal: &Signal) -> bool {
        match self {
            SignalFilter::All => true,
            SignalFilter::PathContains(needle) => signal.full_name().contains(needle),
            SignalFilter::AnyPathContains(needles) => {
                let full = signal.full_name();
                needles.iter().any(|needle| full.contains(needle))
            }
        }
    }
}

/// Analysis parameters: the reset window thresholds and the signal filter.
///
/// `post_reset_time >= reset_release_time` is expected but not enforced; an
/// inverted window simply yields whatever the literal comparisons produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Instant by which the design's reset sequence is assumed complete
    pub reset_release_time: SimTime,
    /// Later "steady state" observation point
    pub post_reset_time: SimTime,
    /// Which signals to classify
    #[serde(default)]
    pub filter: SignalFilter,
}

impl AnalysisConfig {
    /// Create a configuration with the given thresholds and no filter
    pub fn new(reset_release_time: SimTime, post_reset_time: SimTime) -> Self {
        Self {
            reset_release_time,
            post_reset_time,
            filter: SignalFilter::All,
        }
    }

    /// Builder method: restrict analysis to qualified names containing `needle`
    pub fn with_path_filter(mut self, needle: impl Into<String>) -> Self {
        self.filter = SignalFilter::PathContains(needle.into());
        self
    }

    /// Builder method: set the signal filter directly
    pub fn with_filter(mut self, filter: SignalFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Per-signal X-state classification result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// The earliest record's value contained an unknown state
    pub has_x_at_init: bool,
    /// Started unknown, the first record after the post-reset point is clean,
    /// and no unknown state reappeared after reset release
    pub x_cleared_by_post_reset: bool,
    /// First record strictly after reset release containing an unknown state
    pub x_persists_after_reset: Option<PersistentX>,
}

/// The earliest offending record for a signal whose X persists past reset.
///
/// Only the first occurrence per signal is retained: the report names the
/// earliest offending time, not every recurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentX {
    /// Simulation time of the offending record
    pub time: SimTime,
    /// The offending value
    pub value: LogicValue,
}

/// Classify every filtered signal in the waveform.
///
/// Signals with zero observed records are excluded: no information implies no
/// claim. The result maps identifiers to classifications; iterate the
/// waveform's signal table for deterministic (declaration) order.
pub fn classify(
    waveform: &Waveform,
    config: &AnalysisConfig,
) -> HashMap<SignalId, Classification> {
    let mut results = HashMap::new();

    for signal in waveform.signals().iter() {
        if !config.filter.matches(signal) {
            continue;
        }
        let records = waveform.records(&signal.id);
        if records.is_empty() {
            continue;
        }
        let classification = classify_records(records, config);
        log::debug!(
            "{}: init_x={} cleared={} persists={:?}",
            signal.full_name(),
            classification.has_x_at_init,
            classification.x_cleared_by_post_reset,
            classification.x_persists_after_reset.as_ref().map(|p| p.time),
        );
        results.insert(signal.id.clone(), classification);
    }

    log::info!("classified {} signal(s)", results.len());
    results
}

/// Classify one non-empty, time-ordered record sequence
fn classify_records(records: &[ValueRecord], config: &AnalysisConfig) -> Classification {
    let has_x_at_init = records[0].value.contains_unknown();

    let first_after_post_reset = records
        .iter()
        .find(|r| r.time > config.post_reset_time)
        .map(|r| &r.value);

    let x_persists_after_reset = records
        .iter()
        .find(|r| r.time > config.reset_release_time && r.value.contains_unknown())
        .map(|r| PersistentX {
            time: r.time,
            value: r.value.clone(),
        });

    // A clean value at the observation point does not count as cleared if an
    // unknown state reappeared anywhere after reset release; a relapse taints
    // the signal even when it settles again later.
    let x_cleared_by_post_reset = has_x_at_init
        && first_after_post_reset.is_some_and(|v| !v.contains_unknown())
        && x_persists_after_reset.is_none();

    Classification {
        has_x_at_init,
        x_cleared_by_post_reset,
        x_persists_after_reset,
    }
}
