//! Source location carried by every AST node
//!
//! Both front ends (the pest grammar and the ESTree reader) fill these in so
//! that emitter diagnostics can point back at the offending construct.

use serde::Serialize;

/// Position of a node in the input (1-indexed; `line == 0` means unknown)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Location for nodes synthesized without position info
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_known(&self) -> bool {
        self.line > 0
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.is_known() {
            return Ok(());
        }
        write!(f, "{}:{}", self.line, self.column)
    }
}
