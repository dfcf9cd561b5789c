//! # ta-core
//!
//! Core types for turning a theorem statement into a rendered animation.
//!
//! The pipeline is a chain of unreliable external services (a language model
//! and a rendering engine) held together by local, deterministic checks:
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Theorem    │ ──> │  Language   │ ──> │  Candidate  │
//! │  Statement  │     │    Model    │     │   Script    │
//! └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                │
//!                        ┌───────────────────────┘
//!                        ▼
//!                 ┌─────────────┐   Invalid(msg)   ┌─────────────┐
//!                 │   Syntax    │ ───────────────> │  Fix Prompt │
//!                 │  Validator  │                  └─────────────┘
//!                 └──────┬──────┘
//!                        │ Valid
//!                        ▼
//!                 ┌─────────────┐   Failure(msg)   ┌─────────────┐
//!                 │  Renderer   │ ───────────────> │Repair Prompt│
//!                 └──────┬──────┘                  └─────────────┘
//!                        │ Success
//!                        ▼
//!                   video artifact
//! ```
//!
//! This crate holds the data model, the pure script helpers
//! (code extraction, import normalization) and the traits through which
//! the external services are injected.

pub mod attempt;
pub mod budget;
pub mod error;
pub mod model;
pub mod render;
pub mod script;
pub mod theorem;
pub mod validation;

pub use attempt::{RenderAttempt, RenderOutcome};
pub use budget::{
    RetryBudget, GENERATION_ATTEMPTS_MAX, RENDER_ATTEMPTS_MAX, SYNTAX_REPAIR_ROUNDS_MAX,
};
pub use error::CoreError;
pub use model::{GeneratedText, LanguageModel, ServiceError};
pub use render::{artifact_path, RenderError, RenderQuality, Renderer};
pub use script::{
    extract_code_block, has_entry_point, normalize_imports, CandidateScript, ScriptTemplate,
};
pub use theorem::{IntuitionExplanation, TheoremStatement};
pub use validation::{SyntaxValidator, ValidationResult};
