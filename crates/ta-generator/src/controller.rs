//! Render-and-repair loop.
//!
//! ```text
//!            ┌──────────── repaired script ────────────┐
//!            ▼                                         │
//!      ┌───────────┐  failure, budget left   ┌─────────┴─┐
//!  ──> │ Rendering │ ──────────────────────> │ Repairing │
//!      └─────┬─────┘                         └───────────┘
//!            │ success          │ failure, budget spent
//!            ▼                  ▼
//!         Done             Abandoned
//! ```
//!
//! Attempts are strictly sequential: every repair prompt carries the error
//! of the render that just failed, so nothing can overlap.

use std::path::PathBuf;

use ta_core::{
    extract_code_block, normalize_imports, CandidateScript, LanguageModel, RenderAttempt,
    RenderOutcome, Renderer, RetryBudget,
};

use crate::config::GeneratorConfig;
use crate::error::RenderRetryError;
use crate::prompt::PromptBuilder;
use crate::retry::generate_with_backoff;
use crate::workspace::RunWorkspace;

/// State of the render loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderState {
    /// Rendering the current script (attempt is 1-indexed)
    Rendering { attempt: u32 },
    /// Asking the model to fix the script after this render error
    Repairing { error: String },
    /// Rendered; the artifact exists
    Done(PathBuf),
    /// Budget spent; terminal
    Abandoned { error: String },
}

/// Result of a successful render loop.
#[derive(Debug, Clone)]
pub struct RenderReport {
    /// Verified video path
    pub artifact: PathBuf,
    /// Every attempt in order; the last one succeeded
    pub attempts: Vec<RenderAttempt>,
    /// Repair prompts in the order they were sent
    pub repair_prompts: Vec<String>,
}

impl RenderReport {
    /// The script that rendered.
    pub fn final_script(&self) -> Option<&CandidateScript> {
        self.attempts.last().map(|a| &a.script)
    }
}

/// Drives the renderer, patching the script through the model between failures.
pub struct RenderRetryController<'a, M, R> {
    model: &'a M,
    renderer: &'a R,
    workspace: &'a RunWorkspace,
    config: &'a GeneratorConfig,
    prompts: PromptBuilder,
}

impl<'a, M, R> RenderRetryController<'a, M, R>
where
    M: LanguageModel,
    R: Renderer,
{
    pub fn new(
        model: &'a M,
        renderer: &'a R,
        workspace: &'a RunWorkspace,
        config: &'a GeneratorConfig,
    ) -> Self {
        Self {
            model,
            renderer,
            workspace,
            config,
            prompts: PromptBuilder::new(config.template.clone()),
        }
    }

    /// Render `script`, repairing it after each failure until it renders or
    /// the attempt budget is spent.
    ///
    /// The script file always holds the script of the latest render attempt.
    pub async fn run(&self, script: CandidateScript) -> Result<RenderReport, RenderRetryError> {
        let attempts_max = self.config.render_attempts_max;
        let script_path = self.workspace.script_path();
        let out_dir = self.workspace.out_dir();

        let mut budget = RetryBudget::new(attempts_max);
        let mut current = script;
        let mut attempts: Vec<RenderAttempt> = Vec::new();
        let mut repair_prompts: Vec<String> = Vec::new();

        self.workspace.write_script(&current).await?;

        let mut state = match budget.consume() {
            Some(attempt) => RenderState::Rendering { attempt },
            None => RenderState::Abandoned {
                error: "render attempt budget is zero".to_string(),
            },
        };

        loop {
            state = match state {
                RenderState::Rendering { attempt } => {
                    tracing::info!(attempt, attempts_max, "Rendering {}", script_path.display());

                    match self.renderer.render(&script_path, out_dir).await {
                        Ok(artifact) => {
                            attempts.push(RenderAttempt {
                                attempt,
                                script: current.clone(),
                                outcome: RenderOutcome::Success(artifact.clone()),
                            });
                            RenderState::Done(artifact)
                        }
                        Err(e) => {
                            let error = e.diagnostic();
                            let record = RenderAttempt {
                                attempt,
                                script: current.clone(),
                                outcome: RenderOutcome::Failure(error.clone()),
                            };
                            tracing::warn!("{}", record.format_status());
                            attempts.push(record);

                            if budget.is_exhausted() {
                                RenderState::Abandoned { error }
                            } else {
                                RenderState::Repairing { error }
                            }
                        }
                    }
                }

                RenderState::Repairing { error } => {
                    let prompt = self.prompts.render_repair_prompt(current.as_str(), &error);
                    repair_prompts.push(prompt.clone());
                    tracing::info!(repair = repair_prompts.len(), "Requesting script repair");

                    let response = generate_with_backoff(
                        self.model,
                        &prompt,
                        self.config.generation_attempts_max,
                        self.config.retry_backoff,
                    )
                    .await?;
                    let repaired = extract_code_block(response.as_str());
                    current = CandidateScript::new(normalize_imports(&repaired, &self.config.template));
                    self.workspace.write_script(&current).await?;

                    match budget.consume() {
                        Some(attempt) => RenderState::Rendering { attempt },
                        None => RenderState::Abandoned { error },
                    }
                }

                RenderState::Done(artifact) => {
                    tracing::info!(attempts = attempts.len(), "Rendered {}", artifact.display());
                    return Ok(RenderReport {
                        artifact,
                        attempts,
                        repair_prompts,
                    });
                }

                RenderState::Abandoned { error } => {
                    tracing::warn!(attempts = budget.used(), "Giving up on rendering");
                    return Err(RenderRetryError::Exhausted {
                        attempts: budget.used(),
                        last_error: error,
                    });
                }
            };
        }
    }
}
