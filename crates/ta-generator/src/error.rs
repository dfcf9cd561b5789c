//! Error types for each pipeline stage.

use ta_core::CoreError;

/// The run cannot start: something outside the code is misconfigured.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("{0} is not set; export it before running (e.g. export {0}=...)")]
    MissingCredential(&'static str),

    #[error("Invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// The model never produced usable text within the attempt bound.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("No usable model response after {attempts} attempts (last: {last_error})")]
    Exhausted { attempts: u32, last_error: String },
}

/// Script synthesis failed.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Reviewed script is missing `{expected}`:\n{code}")]
    MissingEntryPoint { expected: String, code: String },

    #[error("Script still invalid after {rounds} repair rounds: {last_error}")]
    Exhausted { rounds: u32, last_error: String },

    #[error("Failed to persist script: {0}")]
    Io(#[from] std::io::Error),
}

/// The render-and-repair loop gave up.
#[derive(Debug, thiserror::Error)]
pub enum RenderRetryError {
    #[error("Render failed after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },

    #[error("Could not obtain a repaired script: {0}")]
    Repair(#[from] GenerationError),

    #[error("Failed to persist script: {0}")]
    Io(#[from] std::io::Error),
}

/// Any failure of a full theorem run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Theorem(#[from] CoreError),

    #[error("Intuition step failed: {0}")]
    Intuition(#[from] GenerationError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error(transparent)]
    Render(#[from] RenderRetryError),

    #[error("Output directory error: {0}")]
    Io(#[from] std::io::Error),
}
