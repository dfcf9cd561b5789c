//! Errors raised by the core types themselves.

/// Errors from constructing core values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Theorem statement is empty")]
    EmptyTheorem,

    #[error("No \\begin{{theorem}} ... \\end{{theorem}} environment found")]
    TheoremNotFound,
}
