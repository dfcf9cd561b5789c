//! Script synthesis: draft, review, entry-point gate, import
//! normalization, then validate-and-fix rounds.
//!
//! Every stage overwrites the script file, so the file always shows the
//! latest text the model produced.

use ta_core::{
    extract_code_block, has_entry_point, normalize_imports, CandidateScript,
    IntuitionExplanation, LanguageModel, RetryBudget, SyntaxValidator, TheoremStatement,
    ValidationResult,
};

use crate::config::GeneratorConfig;
use crate::error::{GenerationError, SynthesisError};
use crate::prompt::PromptBuilder;
use crate::retry::generate_with_backoff;
use crate::workspace::RunWorkspace;

/// A structurally valid script and how much repair it took.
#[derive(Debug, Clone)]
pub struct SynthesisReport {
    pub script: CandidateScript,
    /// Syntax repair rounds used (0 when the reviewed script was valid)
    pub repair_rounds: u32,
}

/// Turns a theorem and its intuition into a script that parses.
pub struct ScriptSynthesizer<'a, M, V> {
    model: &'a M,
    validator: &'a V,
    workspace: &'a RunWorkspace,
    config: &'a GeneratorConfig,
    prompts: PromptBuilder,
}

impl<'a, M, V> ScriptSynthesizer<'a, M, V>
where
    M: LanguageModel,
    V: SyntaxValidator,
{
    pub fn new(
        model: &'a M,
        validator: &'a V,
        workspace: &'a RunWorkspace,
        config: &'a GeneratorConfig,
    ) -> Self {
        Self {
            model,
            validator,
            workspace,
            config,
            prompts: PromptBuilder::new(config.template.clone()),
        }
    }

    /// Synthesize a valid script.
    pub async fn synthesize(
        &self,
        theorem: &TheoremStatement,
        intuition: &IntuitionExplanation,
    ) -> Result<CandidateScript, SynthesisError> {
        Ok(self.synthesize_with_report(theorem, intuition).await?.script)
    }

    /// [`Self::synthesize`], also reporting the repair rounds used.
    ///
    /// On success the script contains the entry point and exactly one
    /// canonical import, and the validator accepts it.
    pub async fn synthesize_with_report(
        &self,
        theorem: &TheoremStatement,
        intuition: &IntuitionExplanation,
    ) -> Result<SynthesisReport, SynthesisError> {
        let template = &self.config.template;

        let draft = self.ask(&self.prompts.generation_prompt(theorem, intuition)).await?;
        self.workspace.write_script(&draft).await?;
        tracing::info!(lines = draft.lines_count(), "Draft script generated");

        let reviewed = self.ask(&self.prompts.review_prompt(draft.as_str())).await?;
        self.workspace.write_script(&reviewed).await?;
        tracing::info!(lines = reviewed.lines_count(), "Draft script reviewed");

        if !has_entry_point(reviewed.as_str(), template) {
            return Err(SynthesisError::MissingEntryPoint {
                expected: template.entry_point_declaration(),
                code: reviewed.into_inner(),
            });
        }

        let mut current = self.normalized(reviewed.as_str());
        self.workspace.write_script(&current).await?;

        let mut budget = RetryBudget::new(self.config.syntax_repair_rounds_max);
        loop {
            let error = match self.check(&current) {
                ValidationResult::Valid => {
                    tracing::info!(repair_rounds = budget.used(), "Script is structurally valid");
                    return Ok(SynthesisReport {
                        script: current,
                        repair_rounds: budget.used(),
                    });
                }
                ValidationResult::Invalid(error) => error,
            };

            let Some(round) = budget.consume() else {
                tracing::warn!(rounds = budget.used(), "Giving up on syntax repair");
                return Err(SynthesisError::Exhausted {
                    rounds: budget.used(),
                    last_error: error,
                });
            };

            tracing::warn!(
                round,
                rounds_max = budget.max(),
                "Script invalid: {}",
                error.lines().next().unwrap_or("")
            );

            let fixed = self
                .ask(&self.prompts.syntax_fix_prompt(current.as_str(), &error))
                .await?;
            current = self.normalized(fixed.as_str());
            self.workspace.write_script(&current).await?;
        }
    }

    /// One prompt, retried; returns the extracted code.
    async fn ask(&self, prompt: &str) -> Result<CandidateScript, GenerationError> {
        tracing::debug!(prompt_chars = prompt.len(), "Requesting script");
        let response = generate_with_backoff(
            self.model,
            prompt,
            self.config.generation_attempts_max,
            self.config.retry_backoff,
        )
        .await?;
        Ok(CandidateScript::new(extract_code_block(response.as_str())))
    }

    fn normalized(&self, code: &str) -> CandidateScript {
        CandidateScript::new(normalize_imports(code, &self.config.template))
    }

    /// Validation including the entry point, which a fix may have dropped.
    fn check(&self, script: &CandidateScript) -> ValidationResult {
        let template = &self.config.template;
        if !has_entry_point(script.as_str(), template) {
            return ValidationResult::invalid(format!(
                "Missing required scene declaration `{}`",
                template.entry_point_declaration()
            ));
        }
        self.validator.validate(script.as_str())
    }
}
