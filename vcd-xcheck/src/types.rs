//! Core types for the VCD X-state analysis library
//!
//! This module defines the fundamental types shared by the parsing and
//! classification stages: signal identities, logic values, timeline records,
//! the signal table, and the error/warning taxonomy.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Result type for analyzer operations
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Simulation time in the dump's raw time unit (no timescale interpretation)
pub type SimTime = u64;

/// Opaque per-signal identifier assigned by the simulator.
///
/// Unique within one dump and used only as a lookup key to correlate `$var`
/// declarations with value-change records. Never ordered or interpreted
/// numerically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalId(String);

impl SignalId {
    /// Create a signal identifier from its raw token text
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw identifier token as it appears in the dump
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A four-state logic value: one character per bit, drawn from `{0,1,x,z,X,Z}`.
///
/// Scalars are one character; vectors carry one character per declared bit,
/// most significant first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicValue(String);

impl LogicValue {
    /// True if `c` is a legal four-state value character
    pub fn is_state_char(c: char) -> bool {
        matches!(c, '0' | '1' | 'x' | 'z' | 'X' | 'Z')
    }

    /// True if `c` denotes an unknown or high-impedance state
    pub fn is_unknown_char(c: char) -> bool {
        matches!(c, 'x' | 'X' | 'z' | 'Z')
    }

    /// Build a logic value, validating every character.
    ///
    /// Returns `None` if the string is empty or contains a character outside
    /// the four-state alphabet.
    pub fn parse(bits: &str) -> Option<Self> {
        if bits.is_empty() || !bits.chars().all(Self::is_state_char) {
            return None;
        }
        Some(Self(bits.to_string()))
    }

    /// Build a single-bit value from a scalar state character
    pub fn scalar(c: char) -> Option<Self> {
        if Self::is_state_char(c) {
            Some(Self(c.to_string()))
        } else {
            None
        }
    }

    /// Number of bits in this value
    pub fn width(&self) -> u32 {
        self.0.len() as u32
    }

    /// The value as its character string (MSB first for vectors)
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if any bit is in an unknown or high-impedance state
    pub fn contains_unknown(&self) -> bool {
        self.0.chars().any(Self::is_unknown_char)
    }

    /// Left-extend a vector value to the declared width, per VCD shortening
    /// rules: fill with `0`, unless the leftmost recorded bit is an unknown
    /// state, in which case that state is replicated.
    pub fn extend_to_width(&self, width: u32) -> Self {
        let current = self.0.len() as u32;
        if current >= width {
            return self.clone();
        }
        let leftmost = self.0.chars().next().unwrap_or('0');
        let fill = if Self::is_unknown_char(leftmost) {
            leftmost
        } else {
            '0'
        };
        let mut extended = String::with_capacity(width as usize);
        for _ in 0..(width - current) {
            extended.push(fill);
        }
        extended.push_str(&self.0);
        Self(extended)
    }
}

impl fmt::Display for LogicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One observed value change on a signal's timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRecord {
    /// Simulation time of the change, in the dump's raw time unit
    pub time: SimTime,
    /// The value the signal changed to
    pub value: LogicValue,
}

/// A declared signal from the dump header.
///
/// Created once during header parsing and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    /// Identifier correlating declarations with value-change records
    pub id: SignalId,
    /// Declared signal name (without scope qualification)
    pub name: String,
    /// Declared bit width (>= 1)
    pub width: u32,
    /// Scope names from root to the declaration point
    pub scope_path: Vec<String>,
}

impl Signal {
    /// Fully qualified name: scope path plus signal name, joined with `.`
    pub fn full_name(&self) -> String {
        if self.scope_path.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.scope_path.join("."), self.name)
        }
    }
}

/// The signal table built from the dump header.
///
/// Preserves declaration order: iteration visits signals in the order their
/// `$var` lines appeared, which makes all downstream report ordering
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalTable {
    signals: Vec<Signal>,
    index: HashMap<SignalId, usize>,
}

impl SignalTable {
    /// Create an empty signal table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a signal, keyed by its identifier.
    ///
    /// Returns `false` (and keeps the existing entry) if the identifier was
    /// already declared; identifiers are unique within one dump.
    pub fn insert(&mut self, signal: Signal) -> bool {
        if self.index.contains_key(&signal.id) {
            return false;
        }
        self.index.insert(signal.id.clone(), self.signals.len());
        self.signals.push(signal);
        true
    }

    /// Look up a signal by identifier
    pub fn get(&self, id: &SignalId) -> Option<&Signal> {
        self.index.get(id).map(|&i| &self.signals[i])
    }

    /// True if the identifier was declared in the header
    pub fn contains(&self, id: &SignalId) -> bool {
        self.index.contains_key(id)
    }

    /// Number of declared signals
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// True if no signals were declared
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Iterate signals in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter()
    }
}

/// Errors that can occur during analysis
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// The dump source could not be opened or read.
    ///
    /// This is the only per-test fatal condition; it maps to an `Error`
    /// status for that test case without affecting others.
    #[error("Failed to read dump source: {0}")]
    SourceUnavailable(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Recoverable structural anomalies observed while parsing a dump.
///
/// These never abort parsing; the offending line or token is skipped or its
/// effect neutralized, and the anomaly is accumulated on the finished
/// [`Waveform`](crate::parser::Waveform) for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// A line matched no recognized token shape
    MalformedLine { line_no: usize },
    /// `$upscope` with no open scope
    ScopeUnderflow { line_no: usize },
    /// `$enddefinitions` reached with scopes still open
    UnclosedScopes { depth: usize },
    /// A `$var` re-used an identifier already declared
    DuplicateIdentifier { id: SignalId },
    /// A time marker went backwards; the previous time was kept
    NonMonotonicTime { marker: SimTime, current: SimTime },
    /// A value change referenced an identifier with no declaration
    UnknownIdentifier { id: SignalId },
    /// A vector value was wider than the signal's declared width
    WidthOverflow { id: SignalId, declared: u32, got: u32 },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::MalformedLine { line_no } => {
                write!(f, "line {}: unrecognized line shape, skipped", line_no)
            }
            ParseWarning::ScopeUnderflow { line_no } => {
                write!(f, "line {}: $upscope with empty scope stack", line_no)
            }
            ParseWarning::UnclosedScopes { depth } => {
                write!(f, "header ended with {} unclosed scope(s)", depth)
            }
            ParseWarning::DuplicateIdentifier { id } => {
                write!(f, "duplicate identifier '{}', first declaration kept", id)
            }
            ParseWarning::NonMonotonicTime { marker, current } => {
                write!(
                    f,
                    "time marker #{} regresses below current time {}, ignored",
                    marker, current
                )
            }
            ParseWarning::UnknownIdentifier { id } => {
                write!(f, "value change for undeclared identifier '{}', dropped", id)
            }
            ParseWarning::WidthOverflow { id, declared, got } => {
                write!(
                    f,
                    "value for '{}' has {} bits, declared width {}, dropped",
                    id, got, declared
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logic_value_parse() {
        assert!(LogicValue::parse("01xzXZ").is_some());
        assert!(LogicValue::parse("").is_none());
        assert!(LogicValue::parse("012").is_none());
        assert!(LogicValue::scalar('x').is_some());
        assert!(LogicValue::scalar('q').is_none());
    }

    #[test]
    fn test_logic_value_unknown_detection() {
        assert!(LogicValue::parse("0x10").unwrap().contains_unknown());
        assert!(LogicValue::parse("Z").unwrap().contains_unknown());
        assert!(!LogicValue::parse("0110").unwrap().contains_unknown());
    }

    #[test]
    fn test_logic_value_extension() {
        let v = LogicValue::parse("10").unwrap();
        assert_eq!(v.extend_to_width(4).as_str(), "0010");

        let x = LogicValue::parse("x0").unwrap();
        assert_eq!(x.extend_to_width(4).as_str(), "xxx0");

        // Already at width: unchanged
        assert_eq!(v.extend_to_width(2).as_str(), "10");
    }

    #[test]
    fn test_signal_full_name() {
        let sig = Signal {
            id: SignalId::new("!"),
            name: "q".to_string(),
            width: 1,
            scope_path: vec!["tb".to_string(), "dut".to_string()],
        };
        assert_eq!(sig.full_name(), "tb.dut.q");

        let root = Signal {
            id: SignalId::new("#"),
            name: "clk".to_string(),
            width: 1,
            scope_path: vec![],
        };
        assert_eq!(root.full_name(), "clk");
    }

    #[test]
    fn test_signal_table_declaration_order() {
        let mut table = SignalTable::new();
        for (id, name) in [("!", "a"), ("#", "b"), ("$", "c")] {
            table.insert(Signal {
                id: SignalId::new(id),
                name: name.to_string(),
                width: 1,
                scope_path: vec![],
            });
        }

        let names: Vec<&str> = table.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(table.len(), 3);
        assert!(table.contains(&SignalId::new("#")));
    }

    #[test]
    fn test_signal_table_rejects_duplicate_id() {
        let mut table = SignalTable::new();
        let first = Signal {
            id: SignalId::new("!"),
            name: "first".to_string(),
            width: 1,
            scope_path: vec![],
        };
        let second = Signal {
            id: SignalId::new("!"),
            name: "second".to_string(),
            width: 8,
            scope_path: vec![],
        };

        assert!(table.insert(first));
        assert!(!table.insert(second));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&SignalId::new("!")).unwrap().name, "first");
    }
}
