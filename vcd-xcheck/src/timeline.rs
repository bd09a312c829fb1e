//! Timeline builder
//!
//! Consumes time markers and value changes appearing after `$enddefinitions`
//! and appends chronologically ordered [`ValueRecord`]s to each signal's
//! timeline. The builder keeps a running time cursor (starting at 0) and
//! enforces non-decreasing time: a marker that regresses is ignored and the
//! previous, larger time kept, so the finished timelines are always
//! monotonic. Changes for undeclared identifiers are dropped.

use crate::types::{
    LogicValue, ParseWarning, SignalId, SignalTable, SimTime, ValueRecord,
};
use std::collections::{HashMap, HashSet};

/// Incremental builder for per-signal timelines
#[derive(Debug)]
pub struct TimelineBuilder<'a> {
    table: &'a SignalTable,
    current_time: SimTime,
    timelines: HashMap<SignalId, Vec<ValueRecord>>,
    /// Unknown identifiers already warned about, to keep logs bounded
    unknown_seen: HashSet<SignalId>,
    warnings: Vec<ParseWarning>,
}

impl<'a> TimelineBuilder<'a> {
    /// Create a timeline builder over a finished signal table
    pub fn new(table: &'a SignalTable) -> Self {
        Self {
            table,
            current_time: 0,
            timelines: HashMap::new(),
            unknown_seen: HashSet::new(),
            warnings: Vec::new(),
        }
    }

    /// The current value of the time cursor
    pub fn current_time(&self) -> SimTime {
        self.current_time
    }

    /// Handle a `#<time>` marker.
    ///
    /// A marker smaller than the current time is a structural anomaly: the
    /// regression is ignored and the previous time kept, so appended records
    /// stay in non-decreasing time order.
    pub fn time_marker(&mut self, time: SimTime) {
        if time < self.current_time {
            self.warnings.push(ParseWarning::NonMonotonicTime {
                marker: time,
                current: self.current_time,
            });
            return;
        }
        self.current_time = time;
    }

    /// Handle a scalar value change.
    ///
    /// A scalar targeting a vector-declared signal is treated as a 1-bit
    /// value and left-extended to the declared width, so every record on a
    /// timeline has the same bit count.
    pub fn scalar_change(&mut self, value: char, id: SignalId) {
        let Some(value) = LogicValue::scalar(value) else {
            return;
        };
        self.vector_change(value, id);
    }

    /// Handle a vector value change.
    ///
    /// Values shorter than the declared width are left-extended per VCD
    /// shortening rules; values wider than the declaration are dropped with a
    /// warning so every record on a timeline stays width-consistent.
    pub fn vector_change(&mut self, value: LogicValue, id: SignalId) {
        let Some(signal) = self.table.get(&id) else {
            self.warn_unknown(id);
            return;
        };
        if value.width() > signal.width {
            self.warnings.push(ParseWarning::WidthOverflow {
                id,
                declared: signal.width,
                got: value.width(),
            });
            return;
        }
        let value = value.extend_to_width(signal.width);
        let time = self.current_time;
        self.timelines
            .entry(id)
            .or_default()
            .push(ValueRecord { time, value });
    }

    fn warn_unknown(&mut self, id: SignalId) {
        if self.unknown_seen.insert(id.clone()) {
            self.warnings.push(ParseWarning::UnknownIdentifier { id });
        }
    }

    /// Finish building and yield the timelines plus accumulated warnings
    pub fn finish(self) -> (HashMap<SignalId, Vec<ValueRecord>>, Vec<ParseWarning>) {
        let records: usize = self.timelines.values().map(Vec::len).sum();
        log::info!(
            "timelines complete: {} record(s) across {} signal(s)",
            records,
            self.timelines.len()
        );
        (self.timelines, self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Signal;

    fn table() -> SignalTable {
        let mut table = SignalTable::new();
        table.insert(Signal {
            id: SignalId::new("!"),
            name: "q".to_string(),
            width: 1,
            scope_path: vec!["dut".to_string()],
        });
        table.insert(Signal {
            id: SignalId::new("%"),
            name: "data".to_string(),
            width: 4,
            scope_path: vec!["dut".to_string()],
        });
        table
    }

    #[test]
    fn test_records_stamped_with_current_time() {
        let table = table();
        let mut builder = TimelineBuilder::new(&table);
        builder.scalar_change('x', SignalId::new("!"));
        builder.time_marker(100);
        builder.scalar_change('0', SignalId::new("!"));
        builder.time_marker(400);
        builder.scalar_change('1', SignalId::new("!"));

        let (timelines, warnings) = builder.finish();
        assert!(warnings.is_empty());
        let records = &timelines[&SignalId::new("!")];
        let times: Vec<u64> = records.iter().map(|r| r.time).collect();
        assert_eq!(times, vec![0, 100, 400]);
        assert_eq!(records[0].value.as_str(), "x");
    }

    #[test]
    fn test_time_regression_ignored() {
        let table = table();
        let mut builder = TimelineBuilder::new(&table);
        builder.time_marker(500);
        builder.time_marker(200); // regression: kept at 500
        builder.scalar_change('1', SignalId::new("!"));

        let (timelines, warnings) = builder.finish();
        assert_eq!(timelines[&SignalId::new("!")][0].time, 500);
        assert_eq!(
            warnings,
            vec![ParseWarning::NonMonotonicTime {
                marker: 200,
                current: 500,
            }]
        );
    }

    #[test]
    fn test_unknown_identifier_dropped_once_warned() {
        let table = table();
        let mut builder = TimelineBuilder::new(&table);
        builder.scalar_change('1', SignalId::new("?"));
        builder.scalar_change('0', SignalId::new("?"));

        let (timelines, warnings) = builder.finish();
        assert!(timelines.is_empty());
        // Warned once per identifier, not per occurrence
        assert_eq!(
            warnings,
            vec![ParseWarning::UnknownIdentifier {
                id: SignalId::new("?")
            }]
        );
    }

    #[test]
    fn test_scalar_change_extended_to_declared_width() {
        let table = table();
        let mut builder = TimelineBuilder::new(&table);
        builder.vector_change(LogicValue::parse("0010").unwrap(), SignalId::new("%"));
        builder.scalar_change('0', SignalId::new("%"));
        builder.scalar_change('x', SignalId::new("%"));

        let (timelines, warnings) = builder.finish();
        assert!(warnings.is_empty());
        let records = &timelines[&SignalId::new("%")];
        // Every record on a 4-bit signal carries 4 bits
        let widths: Vec<u32> = records.iter().map(|r| r.value.width()).collect();
        assert_eq!(widths, vec![4, 4, 4]);
        assert_eq!(records[1].value.as_str(), "0000");
        assert_eq!(records[2].value.as_str(), "xxxx");
    }

    #[test]
    fn test_vector_extension_and_overflow() {
        let table = table();
        let mut builder = TimelineBuilder::new(&table);
        builder.vector_change(LogicValue::parse("10").unwrap(), SignalId::new("%"));
        builder.vector_change(LogicValue::parse("x1").unwrap(), SignalId::new("%"));
        builder.vector_change(LogicValue::parse("10101").unwrap(), SignalId::new("%"));

        let (timelines, warnings) = builder.finish();
        let records = &timelines[&SignalId::new("%")];
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].value.as_str(), "0010");
        assert_eq!(records[1].value.as_str(), "xxx1");
        assert_eq!(
            warnings,
            vec![ParseWarning::WidthOverflow {
                id: SignalId::new("%"),
                declared: 4,
                got: 5,
            }]
        );
    }
}
