//! VCD dump tokenizer
//!
//! Splits raw dump text into a stream of structural tokens. Each recognized
//! line shape maps to exactly one [`Token`]; lines matching no shape are
//! skipped and counted, never fatal. The tokenizer streams from any
//! [`BufRead`] source so large dumps are never held in memory at once.
//!
//! Recognized line shapes:
//! - `$scope <kind> <name> $end`
//! - `$upscope $end`
//! - `$var <kind> <width> <id> <name> [<range>] $end`
//! - `$enddefinitions $end`
//! - `$dumpvars` and its closing `$end`
//! - `#<digits>` time markers
//! - `<bit><id>` scalar changes, `<bit>` in `{0,1,x,z,X,Z}`
//! - `b<bits> <id>` / `B<bits> <id>` vector changes
//!
//! Other `$` directives (`$date`, `$version`, `$timescale`, `$comment`, ...)
//! carry no information this analysis needs and are skipped without being
//! counted as malformed.

use crate::types::{LogicValue, Result, SignalId, SimTime};
use std::io::BufRead;

/// A structural token produced from one dump line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `$scope <kind> <name> $end`
    ScopeOpen(String),
    /// `$upscope $end`
    ScopeClose,
    /// `$var <kind> <width> <id> <name> [...] $end`
    VarDecl {
        width: u32,
        id: SignalId,
        name: String,
    },
    /// `$enddefinitions $end`
    HeaderEnd,
    /// `#<digits>`
    TimeMarker(SimTime),
    /// Single state character immediately followed by the identifier
    ScalarChange { value: char, id: SignalId },
    /// `b<bits> <id>` or `B<bits> <id>`
    VectorChange { value: LogicValue, id: SignalId },
    /// `$dumpvars`
    DumpvarsBegin,
    /// A bare `$end` (closes `$dumpvars` or a skipped block directive)
    BlockEnd,
}

/// Classification of one dump line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineShape {
    /// A recognized structural token
    Token(Token),
    /// Legal dump content this analysis does not consume (empty lines,
    /// `$date`, `$version`, `$timescale`, `$comment`, `$dumpall`, ...)
    Ignored,
    /// A line matching no recognized shape, including a recognized keyword
    /// with a bad shape (e.g. `$var` with a non-numeric width)
    Malformed,
}

/// Classify a single trimmed dump line.
///
/// This function is pure; the streaming tokenizer counts `Malformed` lines
/// as structural anomalies and drops `Ignored` ones silently.
pub fn classify_line(line: &str) -> LineShape {
    let line = line.trim();
    if line.is_empty() {
        return LineShape::Ignored;
    }

    if let Some(rest) = line.strip_prefix('#') {
        return match rest.parse::<SimTime>() {
            Ok(time) => LineShape::Token(Token::TimeMarker(time)),
            Err(_) => LineShape::Malformed,
        };
    }

    if line.starts_with('$') {
        return classify_directive(line);
    }

    if line.starts_with('b') || line.starts_with('B') {
        return classify_vector_change(line);
    }

    classify_scalar_change(line)
}

/// Tokenize a single trimmed dump line, discarding the ignored/malformed
/// distinction
pub fn tokenize_line(line: &str) -> Option<Token> {
    match classify_line(line) {
        LineShape::Token(token) => Some(token),
        LineShape::Ignored | LineShape::Malformed => None,
    }
}

/// Classify a `$`-keyword line.
///
/// A recognized keyword whose operands do not fit its shape is malformed;
/// an unrecognized keyword is legal content this analysis ignores.
fn classify_directive(line: &str) -> LineShape {
    let mut parts = line.split_whitespace();
    let Some(keyword) = parts.next() else {
        return LineShape::Malformed;
    };

    match keyword {
        "$scope" => {
            // $scope <kind> <name> $end
            let _kind = parts.next();
            match parts.next() {
                Some(name) if name != "$end" => {
                    LineShape::Token(Token::ScopeOpen(name.to_string()))
                }
                _ => LineShape::Malformed,
            }
        }
        "$upscope" => LineShape::Token(Token::ScopeClose),
        "$var" => classify_var_decl(parts),
        "$enddefinitions" => LineShape::Token(Token::HeaderEnd),
        "$dumpvars" => LineShape::Token(Token::DumpvarsBegin),
        "$end" => LineShape::Token(Token::BlockEnd),
        _ => LineShape::Ignored,
    }
}

/// Classify the operands of `$var <kind> <width> <id> <name> [<range>] $end`.
///
/// Trailing range annotations like "[7:0]" are ignored.
fn classify_var_decl<'a>(mut parts: impl Iterator<Item = &'a str>) -> LineShape {
    let (Some(_kind), Some(width), Some(id), Some(name)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return LineShape::Malformed;
    };
    let Some(width) = width.parse::<u32>().ok().filter(|&w| w >= 1) else {
        return LineShape::Malformed;
    };
    if name == "$end" {
        return LineShape::Malformed;
    }
    LineShape::Token(Token::VarDecl {
        width,
        id: SignalId::new(id),
        name: name.to_string(),
    })
}

/// Classify `b<bits> <id>` / `B<bits> <id>`
fn classify_vector_change(line: &str) -> LineShape {
    let mut parts = line.split_whitespace();
    let (Some(first), Some(id), None) = (parts.next(), parts.next(), parts.next()) else {
        return LineShape::Malformed;
    };
    match LogicValue::parse(&first[1..]) {
        Some(value) => LineShape::Token(Token::VectorChange {
            value,
            id: SignalId::new(id),
        }),
        None => LineShape::Malformed,
    }
}

/// Classify `<bit><id>` with no space between state character and identifier
fn classify_scalar_change(line: &str) -> LineShape {
    let mut chars = line.chars();
    let Some(value) = chars.next() else {
        return LineShape::Malformed;
    };
    if !LogicValue::is_state_char(value) {
        return LineShape::Malformed;
    }
    let id = chars.as_str();
    if id.is_empty() || id.contains(char::is_whitespace) {
        return LineShape::Malformed;
    }
    LineShape::Token(Token::ScalarChange {
        value,
        id: SignalId::new(id),
    })
}

/// Streaming tokenizer over a buffered dump source.
///
/// Yields `Ok(Token)` for each recognized line; only I/O failures from the
/// underlying reader surface as `Err`. Unrecognized lines are counted in
/// [`Tokenizer::skipped_lines`] and otherwise ignored.
pub struct Tokenizer<R: BufRead> {
    lines: std::io::Lines<R>,
    line_no: usize,
    skipped_lines: Vec<usize>,
}

impl<R: BufRead> Tokenizer<R> {
    /// Create a tokenizer over a buffered reader
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            skipped_lines: Vec::new(),
        }
    }

    /// Line number of the most recently consumed line (1-based)
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    /// Line numbers that matched no recognized token shape, including
    /// recognized declaration keywords with bad operands.
    ///
    /// Ignored `$` directives (`$date`, `$timescale`, ...) are not included;
    /// they are legal dump content this analysis simply does not consume.
    pub fn skipped_lines(&self) -> &[usize] {
        &self.skipped_lines
    }
}

impl<R: BufRead> Iterator for Tokenizer<R> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;

            match classify_line(&line) {
                LineShape::Token(token) => return Some(Ok(token)),
                LineShape::Ignored => continue,
                LineShape::Malformed => {
                    log::debug!("line {}: skipping unrecognized line", self.line_no);
                    self.skipped_lines.push(self.line_no);
                    continue;
                }
            }
        }
    }
}
