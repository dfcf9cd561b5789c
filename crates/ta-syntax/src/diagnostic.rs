//! Parser diagnostics with source excerpts.

use std::fmt;

/// Which family of error a diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Token or statement shape is wrong
    Syntax,
    /// Block structure (indentation) is wrong
    Indentation,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Syntax => f.write_str("SyntaxError"),
            DiagnosticKind::Indentation => f.write_str("IndentationError"),
        }
    }
}

/// A single syntax error, positioned in the source.
///
/// Lines and columns are 1-based; columns count characters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {reason} (line {line}, column {column})")]
pub struct SyntaxDiagnostic {
    /// Error family
    pub kind: DiagnosticKind,
    /// Human readable reason
    pub reason: String,
    /// Line of the offending token
    pub line: usize,
    /// Column of the offending token
    pub column: usize,
    /// The offending source line, verbatim
    pub source_line: String,
}

impl SyntaxDiagnostic {
    /// Diagnostic for the byte `offset` into `source`.
    ///
    /// Offsets past the end, or inside a multi-byte character, are pulled
    /// back to the nearest character boundary.
    pub(crate) fn at_offset(
        kind: DiagnosticKind,
        source: &str,
        offset: usize,
        reason: impl Into<String>,
    ) -> Self {
        let mut offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }

        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;

        Self::build(kind, source, line, column, reason.into())
    }

    fn build(kind: DiagnosticKind, source: &str, line: usize, column: usize, reason: String) -> Self {
        debug_assert!(line > 0, "Lines are 1-based");
        debug_assert!(column > 0, "Columns are 1-based");

        let source_line = source
            .lines()
            .nth(line.saturating_sub(1))
            .unwrap_or("")
            .trim_end()
            .to_string();

        Self {
            kind,
            reason,
            line,
            column,
            source_line,
        }
    }

    /// Multi-line report: summary, source excerpt and a caret.
    ///
    /// This text goes verbatim into repair prompts.
    pub fn render(&self) -> String {
        let mut report = self.to_string();

        if !self.source_line.trim().is_empty() {
            let excerpt = self.source_line.replace('\t', " ");
            let caret_offset = self.column.saturating_sub(1).min(excerpt.chars().count());
            report.push_str(&format!(
                "\n    {}\n    {}^",
                excerpt,
                " ".repeat(caret_offset)
            ));
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_points_at_column() {
        let source = "x = 1\ndef f(:\n";
        let diagnostic = SyntaxDiagnostic::at_offset(DiagnosticKind::Syntax, source, 11, "invalid syntax");
        assert_eq!((diagnostic.line, diagnostic.column), (2, 6));
        assert_eq!(
            diagnostic.render(),
            "SyntaxError: invalid syntax (line 2, column 6)\n    def f(:\n         ^"
        );
    }

    #[test]
    fn test_render_without_source_line() {
        let diagnostic =
            SyntaxDiagnostic::at_offset(DiagnosticKind::Indentation, "if x:\n", 6, "expected an indented block");
        assert_eq!(
            diagnostic.render(),
            "IndentationError: expected an indented block (line 2, column 1)"
        );
    }

    #[test]
    fn test_offset_counts_characters_not_bytes() {
        let source = "t = \"\u{3b1}\u{3b2}\" +\n";
        let end = source.len() - 1;
        let diagnostic = SyntaxDiagnostic::at_offset(DiagnosticKind::Syntax, source, end, "invalid syntax");
        assert_eq!((diagnostic.line, diagnostic.column), (1, 11));

        // Inside the two-byte alpha
        let diagnostic = SyntaxDiagnostic::at_offset(DiagnosticKind::Syntax, source, 6, "invalid syntax");
        assert_eq!(diagnostic.column, 6);

        let diagnostic = SyntaxDiagnostic::at_offset(DiagnosticKind::Syntax, source, 1000, "invalid syntax");
        assert_eq!(diagnostic.line, 2);
    }
}
