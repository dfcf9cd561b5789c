//! # ta-generator
//!
//! Theorem in, rendered animation out.
//!
//! A language model explains the theorem, drafts a Manim script and
//! reviews it. Local checks then gate the script before the renderer ever
//! sees it, and every render failure goes back to the model as a repair
//! prompt carrying the exact error.
//!
//! # Usage
//!
//! ```bash
//! export GEMINI_API_KEY=...
//! cargo run -p ta-generator -- run "a^2+b^2=c^2" out/pythagoras
//! cargo run -p ta-generator -- run --tex paper.tex out/paper
//! cargo run -p ta-generator -- intuition "a^2+b^2=c^2" out/pythagoras
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Theorem   │ ──> │  Intuition  │ ──> │ Draft, then │
//! │  Statement  │     │   Prompt    │     │   Review    │
//! └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                │
//!                     ┌──────────────────────────┘
//!                     ▼
//!              ┌─────────────┐
//!              │ Entry point │ ── missing ──> MissingEntryPoint
//!              │   + import  │
//!              │ normalizing │
//!              └──────┬──────┘
//!                     ▼
//!              ┌─────────────┐  Invalid   ┌─────────────┐
//!              │   Syntax    │ ─────────> │  Fix Prompt │ (≤ 5 rounds)
//!              │  Validator  │ <───────── │             │
//!              └──────┬──────┘            └─────────────┘
//!                     │ Valid
//!                     ▼
//!              ┌─────────────┐  Failure   ┌─────────────┐
//!              │  Renderer   │ ─────────> │   Repair    │ (≤ 4 renders)
//!              │             │ <───────── │   Prompt    │
//!              └──────┬──────┘            └─────────────┘
//!                     ▼
//!   media/videos/<script>/480p15/<script>.mp4
//! ```

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod pipeline;
pub mod prompt;
pub mod retry;
pub mod synthesizer;
pub mod workspace;

pub use client::{ClientConfig, GeminiClient, API_KEY_ENV};
pub use config::GeneratorConfig;
pub use controller::{RenderReport, RenderRetryController, RenderState};
pub use error::{
    ConfigurationError, GenerationError, PipelineError, RenderRetryError, SynthesisError,
};
pub use pipeline::{PipelineReport, TheoremPipeline};
pub use prompt::{PromptBuilder, API_USAGE_HINTS};
pub use retry::{generate_with_backoff, generate_with_retry};
pub use synthesizer::{ScriptSynthesizer, SynthesisReport};
pub use workspace::{RunWorkspace, DEFAULT_SCRIPT_NAME, INTUITION_FILE};

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::Duration;

    use ta_core::{IntuitionExplanation, TheoremStatement};

    use crate::config::GeneratorConfig;

    /// A script the validator accepts.
    pub const VALID_SCRIPT: &str = r#"from manim import *
import numpy as np


class TheoremScene(Scene):
    def construct(self):
        a, b = 3, 4
        triangle = Polygon(ORIGIN, RIGHT * a, UP * b, color=BLUE)
        label = MathTex("a^2+b^2=c^2").to_edge(UP)
        self.play(Create(triangle))
        self.play(Write(label))
        self.wait()"#;

    /// `code` wrapped the way models usually answer.
    pub fn fenced(code: &str) -> String {
        format!("Here is the script:\n\n```python\n{}\n```\n", code)
    }

    /// Defaults without retry pauses.
    pub fn test_config() -> GeneratorConfig {
        GeneratorConfig {
            retry_backoff: Duration::ZERO,
            ..GeneratorConfig::default()
        }
    }

    pub fn theorem() -> (TheoremStatement, IntuitionExplanation) {
        (
            TheoremStatement::new("a^2+b^2=c^2").unwrap(),
            IntuitionExplanation::new("Squares on the legs fill the square on the hypotenuse."),
        )
    }
}
