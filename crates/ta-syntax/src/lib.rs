//! # ta-syntax
//!
//! Syntax checks for generated animation scripts.
//!
//! Scripts are parsed with `rustpython-parser`, never executed or imported.
//! The check is a fast-fail gate in front of the (slow) renderer, and its
//! diagnostics are written to be pasted straight into a repair prompt:
//!
//! ```text
//! SyntaxError: invalid syntax. Got unexpected token ':' (line 1, column 7)
//!     def f(:
//!           ^
//! ```
//!
//! After parsing, assignment targets are walked once more: the grammar
//! accepts `x + 1 = 2` and leaves the rejection to the compiler.

pub mod diagnostic;
mod targets;

pub use diagnostic::{DiagnosticKind, SyntaxDiagnostic};

use rustpython_parser::{ast, Parse, ParseError};
use ta_core::{SyntaxValidator, ValidationResult};

/// Name reported as the source of parse errors.
const SOURCE_PATH: &str = "<script>";

/// Syntax validator for Python-syntax animation scripts.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonSyntaxValidator;

impl PythonSyntaxValidator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self
    }

    /// Check `code`, returning the first syntax error.
    pub fn check(&self, code: &str) -> Result<(), SyntaxDiagnostic> {
        let suite = ast::Suite::parse(code, SOURCE_PATH).map_err(|e| located(code, &e))?;
        targets::check(code, &suite)
    }
}

impl SyntaxValidator for PythonSyntaxValidator {
    fn validate(&self, code: &str) -> ValidationResult {
        match self.check(code) {
            Ok(()) => ValidationResult::Valid,
            Err(diagnostic) => ValidationResult::invalid(diagnostic.render()),
        }
    }
}

fn located(code: &str, error: &ParseError) -> SyntaxDiagnostic {
    let reason = error.error.to_string();
    let kind = if reason.to_ascii_lowercase().contains("indent") {
        DiagnosticKind::Indentation
    } else {
        DiagnosticKind::Syntax
    };
    SyntaxDiagnostic::at_offset(kind, code, u32::from(error.offset) as usize, reason)
}
