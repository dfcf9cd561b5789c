//! Theorem statements and the intuition text derived from them.

use std::fmt;

use crate::error::CoreError;

const THEOREM_BEGIN: &str = "\\begin{theorem}";
const THEOREM_END: &str = "\\end{theorem}";

/// The natural-language or LaTeX body of a theorem.
///
/// Immutable once constructed. The pipeline only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TheoremStatement(String);

impl TheoremStatement {
    /// Create a statement from raw text. Surrounding whitespace is trimmed.
    pub fn new(text: impl Into<String>) -> Result<Self, CoreError> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyTheorem);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Extract the first `theorem` environment from a LaTeX document.
    ///
    /// An optional `[title]` argument directly after `\begin{theorem}` is
    /// dropped from the body.
    pub fn from_latex(source: &str) -> Result<Self, CoreError> {
        let begin = source.find(THEOREM_BEGIN).ok_or(CoreError::TheoremNotFound)?;
        let mut body = &source[begin + THEOREM_BEGIN.len()..];

        let end = body.find(THEOREM_END).ok_or(CoreError::TheoremNotFound)?;
        body = &body[..end];

        let leading = body.trim_start();
        if leading.starts_with('[') {
            if let Some(close) = leading.find(']') {
                body = &leading[close + 1..];
            }
        }

        Self::new(body)
    }

    /// Borrow the statement text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TheoremStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visual explanation of a theorem, produced once per run by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntuitionExplanation(String);

impl IntuitionExplanation {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IntuitionExplanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_and_rejects_empty() {
        let theorem = TheoremStatement::new("  a^2+b^2=c^2 \n").unwrap();
        assert_eq!(theorem.as_str(), "a^2+b^2=c^2");

        assert_eq!(TheoremStatement::new("   \n\t"), Err(CoreError::EmptyTheorem));
    }

    #[test]
    fn test_from_latex_extracts_first_environment() {
        let source = r"\documentclass{article}
\begin{document}
\begin{theorem}
The angle bisectors of a triangle meet in a single point.
\end{theorem}
\begin{theorem}
Second one.
\end{theorem}
\end{document}";

        let theorem = TheoremStatement::from_latex(source).unwrap();
        assert_eq!(
            theorem.as_str(),
            "The angle bisectors of a triangle meet in a single point."
        );
    }

    #[test]
    fn test_from_latex_drops_title_argument() {
        let source = r"\begin{theorem}[Pythagoras] $a^2 + b^2 = c^2$ \end{theorem}";
        let theorem = TheoremStatement::from_latex(source).unwrap();
        assert_eq!(theorem.as_str(), "$a^2 + b^2 = c^2$");
    }

    #[test]
    fn test_from_latex_missing_environment() {
        assert_eq!(
            TheoremStatement::from_latex(r"\begin{lemma} x \end{lemma}"),
            Err(CoreError::TheoremNotFound)
        );
        assert_eq!(
            TheoremStatement::from_latex(r"\begin{theorem} unterminated"),
            Err(CoreError::TheoremNotFound)
        );
        assert_eq!(
            TheoremStatement::from_latex(r"\begin{theorem}  \end{theorem}"),
            Err(CoreError::EmptyTheorem)
        );
    }
}
