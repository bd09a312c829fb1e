//! Dump header builder
//!
//! Consumes declaration tokens (scope open/close, variable declarations)
//! appearing before `$enddefinitions` and produces the [`SignalTable`]. The
//! scope stack is transient: pushed on scope open, popped on scope close, and
//! required to be empty when the header ends. Unbalanced scopes are structural
//! anomalies, recorded as warnings and never fatal; the stack is treated as
//! reset and processing continues.

use crate::types::{ParseWarning, Signal, SignalId, SignalTable};

/// Incremental builder for the signal table
#[derive(Debug, Default)]
pub struct HeaderBuilder {
    scope_stack: Vec<String>,
    table: SignalTable,
    warnings: Vec<ParseWarning>,
}

impl HeaderBuilder {
    /// Create an empty header builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a `$scope` token: push the scope name
    pub fn scope_open(&mut self, name: String) {
        log::debug!("entering scope '{}'", name);
        self.scope_stack.push(name);
    }

    /// Handle an `$upscope` token: pop the current scope.
    ///
    /// An underflow (close with empty stack) is recorded as a warning and
    /// otherwise ignored.
    pub fn scope_close(&mut self, line_no: usize) {
        if self.scope_stack.pop().is_none() {
            self.warnings.push(ParseWarning::ScopeUnderflow { line_no });
        }
    }

    /// Handle a `$var` token: create the signal at the current scope path.
    ///
    /// A duplicate identifier keeps the first declaration and records a
    /// warning; identifiers are unique within one dump.
    pub fn var_decl(&mut self, width: u32, id: SignalId, name: String) {
        let signal = Signal {
            id: id.clone(),
            name,
            width,
            scope_path: self.scope_stack.clone(),
        };
        if !self.table.insert(signal) {
            self.warnings.push(ParseWarning::DuplicateIdentifier { id });
        }
    }

    /// Handle `$enddefinitions`: finish the header and yield the signal table.
    ///
    /// A non-empty scope stack at this point is a structural anomaly; it is
    /// recorded and the stack discarded.
    pub fn finish(mut self) -> (SignalTable, Vec<ParseWarning>) {
        if !self.scope_stack.is_empty() {
            let depth = self.scope_stack.len();
            self.warnings.push(ParseWarning::UnclosedScopes { depth });
        }
        log::info!("header complete: {} signal(s) declared", self.table.len());
        (self.table, self.warnings)
    }
}
