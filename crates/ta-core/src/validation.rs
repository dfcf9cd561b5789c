//! Structural validation results.

use std::fmt;

/// Outcome of a static check on a script.
///
/// The reason of an invalid result is fed verbatim into the next repair
/// prompt, so it is kept as a sum type rather than collapsed to a flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(String),
}

impl ValidationResult {
    /// Create an invalid result.
    pub fn invalid(message: impl Into<String>) -> Self {
        let message = message.into();
        debug_assert!(!message.is_empty(), "Invalid result needs a reason");
        Self::Invalid(message)
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The diagnostic of an invalid result.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid(message) => Some(message),
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("valid"),
            Self::Invalid(message) => write!(f, "invalid: {}", message),
        }
    }
}

/// Static, side-effect free structural check of script source.
pub trait SyntaxValidator {
    /// Parse `code` without executing it.
    fn validate(&self, code: &str) -> ValidationResult;
}

impl<V: SyntaxValidator + ?Sized> SyntaxValidator for &V {
    fn validate(&self, code: &str) -> ValidationResult {
        (**self).validate(code)
    }
}
