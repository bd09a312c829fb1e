//! Dump parsing session
//!
//! Ties the tokenizer, header builder and timeline builder together into a
//! single forward pass over the dump source, producing a finished
//! [`Waveform`]: the signal table, the per-signal timelines, and every
//! structural anomaly observed along the way.
//!
//! Parsing is strictly sequential and stateful within one dump (scope stack,
//! running time cursor); independent dumps can be parsed concurrently since a
//! `Waveform` session shares no mutable state.

use crate::header::HeaderBuilder;
use crate::timeline::TimelineBuilder;
use crate::tokenizer::{Token, Tokenizer};
use crate::types::{
    AnalyzerError, ParseWarning, Result, SignalId, SignalTable, ValueRecord,
};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A fully parsed dump: signal table, timelines, and parse diagnostics.
///
/// Owned exclusively by one parsing session and immutable once produced.
#[derive(Debug)]
pub struct Waveform {
    table: SignalTable,
    timelines: HashMap<SignalId, Vec<ValueRecord>>,
    warnings: Vec<ParseWarning>,
}

impl Waveform {
    /// Parse a dump from any buffered reader.
    ///
    /// Declaration tokens are routed to the header builder until
    /// `$enddefinitions`; time markers and value changes are routed to the
    /// timeline builder afterwards. Tokens arriving on the wrong side of the
    /// header boundary are ignored, matching the recover-and-continue policy
    /// for structural anomalies. Only I/O failures abort the parse.
    pub fn parse_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut tokenizer = Tokenizer::new(reader);
        let mut header = HeaderBuilder::new();
        let mut warnings = Vec::new();

        // Header phase: declarations up to $enddefinitions. A value-phase
        // token arriving first means the dump omitted $enddefinitions; the
        // header is treated as implicitly complete and the token replayed.
        let mut pending = None;
        let table = loop {
            match tokenizer.next() {
                Some(Ok(Token::ScopeOpen(name))) => header.scope_open(name),
                Some(Ok(Token::ScopeClose)) => header.scope_close(tokenizer.line_no()),
                Some(Ok(Token::VarDecl { width, id, name })) => {
                    header.var_decl(width, id, name)
                }
                Some(Ok(Token::HeaderEnd)) | None => {
                    let (table, header_warnings) = header.finish();
                    warnings.extend(header_warnings);
                    break table;
                }
                Some(Ok(
                    token @ (Token::TimeMarker(_)
                    | Token::ScalarChange { .. }
                    | Token::VectorChange { .. }),
                )) => {
                    let (table, header_warnings) = header.finish();
                    warnings.extend(header_warnings);
                    pending = Some(token);
                    break table;
                }
                // $dumpvars markers carry no declaration content.
                Some(Ok(Token::DumpvarsBegin | Token::BlockEnd)) => continue,
                Some(Err(e)) => return Err(e),
            }
        };

        // Value phase: time markers and changes after the header.
        let mut timeline = TimelineBuilder::new(&table);
        for token in pending.map(Ok).into_iter().chain(&mut tokenizer) {
            match token? {
                Token::TimeMarker(time) => timeline.time_marker(time),
                Token::ScalarChange { value, id } => timeline.scalar_change(value, id),
                Token::VectorChange { value, id } => timeline.vector_change(value, id),
                // $dumpvars blocks just bracket initial value records.
                Token::DumpvarsBegin | Token::BlockEnd => {}
                // Stray declaration tokens after the header carry no effect.
                Token::ScopeOpen(_)
                | Token::ScopeClose
                | Token::VarDecl { .. }
                | Token::HeaderEnd => {}
            }
        }

        let (timelines, timeline_warnings) = timeline.finish();
        warnings.extend(timeline_warnings);
        warnings.extend(
            tokenizer
                .skipped_lines()
                .iter()
                .map(|&line_no| ParseWarning::MalformedLine { line_no }),
        );

        Ok(Self {
            table,
            timelines,
            warnings,
        })
    }

    /// Parse a dump file from disk.
    ///
    /// A missing or unreadable file maps to
    /// [`AnalyzerError::SourceUnavailable`]; the caller reports that test
    /// case as errored without affecting other dumps.
    pub fn parse_file(path: &Path) -> Result<Self> {
        log::info!("Parsing dump file: {:?}", path);
        let file = File::open(path).map_err(|e| {
            AnalyzerError::SourceUnavailable(format!("{:?}: {}", path, e))
        })?;
        Self::parse_reader(BufReader::new(file))
    }

    /// The signal table, in declaration order
    pub fn signals(&self) -> &SignalTable {
        &self.table
    }

    /// The timeline for one signal; empty slice if it never changed
    pub fn records(&self, id: &SignalId) -> &[ValueRecord] {
        self.timelines.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Structural anomalies observed while parsing
    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const DUMP: &str = "\
$timescale 1ps $end
$scope module tb $end
$scope module dut $end
$var wire 1 ! q $end
$var reg 4 % count [3:0] $end
$upscope $end
$var wire 1 # clk $end
$upscope $end
$enddefinitions $end
$dumpvars
x!
bxxxx %
0#
$end
#100000
0!
b0000 %
#400000
x!
#700000
1!
";

    #[test]
    fn test_parse_full_dump() {
        let waveform = Waveform::parse_reader(Cursor::new(DUMP)).unwrap();
        assert!(waveform.warnings().is_empty());
        assert_eq!(waveform.signals().len(), 3);

        let q = SignalId::new("!");
        let times: Vec<u64> = waveform.records(&q).iter().map(|r| r.time).collect();
        assert_eq!(times, vec![0, 100000, 400000, 700000]);

        let clk = SignalId::new("#");
        assert_eq!(waveform.records(&clk).len(), 1);

        // Signal with no records at all
        assert!(waveform.records(&SignalId::new("?")).is_empty());
    }

    #[test]
    fn test_timestamps_non_decreasing() {
        let waveform = Waveform::parse_reader(Cursor::new(DUMP)).unwrap();
        for signal in waveform.signals().iter() {
            let records = waveform.records(&signal.id);
            for pair in records.windows(2) {
                assert!(pair[0].time <= pair[1].time);
            }
        }
    }

    #[test]
    fn test_parse_is_idempotent() {
        let a = Waveform::parse_reader(Cursor::new(DUMP)).unwrap();
        let b = Waveform::parse_reader(Cursor::new(DUMP)).unwrap();

        assert_eq!(a.signals(), b.signals());
        assert_eq!(a.warnings(), b.warnings());
        for signal in a.signals().iter() {
            assert_eq!(a.records(&signal.id), b.records(&signal.id));
        }
    }

    #[test]
    fn test_signal_count_matches_declarations() {
        // Declarations after $enddefinitions must not extend the table.
        let dump = "\
$var wire 1 ! a $end
$var wire 1 # b $end
$enddefinitions $end
$var wire 1 % late $end
#0
1!
";
        let waveform = Waveform::parse_reader(Cursor::new(dump)).unwrap();
        assert_eq!(waveform.signals().len(), 2);
    }

    #[test]
    fn test_unparseable_declaration_warned() {
        // A $var with a non-numeric width is a structural anomaly, not a
        // silently ignored directive.
        let dump = "$var wire eight ! q $end\n$enddefinitions $end\n#0\n";
        let waveform = Waveform::parse_reader(Cursor::new(dump)).unwrap();

        assert!(waveform.signals().is_empty());
        assert_eq!(
            waveform.warnings(),
            &[ParseWarning::MalformedLine { line_no: 1 }]
        );
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let err = Waveform::parse_file(Path::new("/nonexistent/wave.vcd")).unwrap_err();
        assert!(matches!(err, AnalyzerError::SourceUnavailable(_)));
    }

    #[test]
    fn test_headerless_dump_yields_empty_table() {
        let waveform = Waveform::parse_reader(Cursor::new("#0\n1!\n")).unwrap();
        assert!(waveform.signals().is_empty());
        // The change referenced an undeclared id and was dropped
        assert_eq!(
            waveform.warnings(),
            &[ParseWarning::UnknownIdentifier {
                id: SignalId::new("!")
            }]
        );
    }
}
