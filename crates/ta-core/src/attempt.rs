//! Records of render attempts.

use std::path::PathBuf;

use crate::script::CandidateScript;

/// How a single render attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The artifact exists at this path
    Success(PathBuf),
    /// Render failed with this message
    Failure(String),
}

/// One render attempt of one run.
#[derive(Debug, Clone)]
pub struct RenderAttempt {
    /// Attempt number (1-indexed)
    pub attempt: u32,
    /// Script version that was rendered
    pub script: CandidateScript,
    /// Outcome of the attempt
    pub outcome: RenderOutcome,
}

impl RenderAttempt {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, RenderOutcome::Success(_))
    }

    /// Failure message, if the attempt failed.
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            RenderOutcome::Success(_) => None,
            RenderOutcome::Failure(message) => Some(message),
        }
    }

    /// Format as a single-line status for logging.
    pub fn format_status(&self) -> String {
        match &self.outcome {
            RenderOutcome::Success(path) => {
                format!("[PASS] render #{}: {}", self.attempt, path.display())
            }
            RenderOutcome::Failure(message) => {
                let first_line = message.lines().next().unwrap_or("unknown error");
                format!("[FAIL] render #{}: {}", self.attempt, first_line)
            }
        }
    }
}
