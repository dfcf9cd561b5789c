//! End-to-end theorem run: intuition, synthesis, render loop.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use ta_core::{
    IntuitionExplanation, LanguageModel, RenderAttempt, Renderer, SyntaxValidator,
    TheoremStatement,
};
use ta_render::ManimRenderer;
use ta_syntax::PythonSyntaxValidator;

use crate::client::{ClientConfig, GeminiClient};
use crate::config::GeneratorConfig;
use crate::controller::RenderRetryController;
use crate::error::{ConfigurationError, GenerationError, PipelineError};
use crate::prompt::PromptBuilder;
use crate::retry::generate_with_backoff;
use crate::synthesizer::ScriptSynthesizer;
use crate::workspace::RunWorkspace;

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub theorem: TheoremStatement,
    pub intuition_path: PathBuf,
    pub script_path: PathBuf,
    /// Verified video path
    pub artifact: PathBuf,
    /// Syntax repair rounds spent during synthesis
    pub repair_rounds: u32,
    /// Render attempts in order
    pub render_attempts: Vec<RenderAttempt>,
    pub duration: Duration,
}

impl PipelineReport {
    /// Format a human-readable summary.
    pub fn format_summary(&self) -> String {
        let mut summary = format!(
            "[SUCCESS] Animation rendered in {:.2}s\n",
            self.duration.as_secs_f64()
        );

        summary.push_str(&format!("  Theorem: {}\n", first_line(self.theorem.as_str())));
        summary.push_str(&format!("  Syntax repair rounds: {}\n", self.repair_rounds));
        summary.push_str(&format!("  Render attempts: {}\n", self.render_attempts.len()));
        for attempt in &self.render_attempts {
            summary.push_str(&format!("    {}\n", attempt.format_status()));
        }

        summary.push_str(&format!("\nIntuition: {}\n", self.intuition_path.display()));
        summary.push_str(&format!("Script:    {}\n", self.script_path.display()));
        summary.push_str(&format!("Video:     {}\n", self.artifact.display()));
        summary
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

/// The whole theorem-to-video pipeline over injected services.
pub struct TheoremPipeline<M, V, R> {
    model: M,
    validator: V,
    renderer: R,
    config: GeneratorConfig,
    prompts: PromptBuilder,
}

impl TheoremPipeline<GeminiClient, PythonSyntaxValidator, ManimRenderer> {
    /// Production pipeline configured from the process environment.
    ///
    /// Fails before any network traffic when the credential is missing.
    pub fn from_env(config: GeneratorConfig) -> Result<Self, ConfigurationError> {
        Self::from_client_config(ClientConfig::from_env()?, config)
    }

    /// Production pipeline configured through `lookup` (an environment
    /// stand-in), see [`ClientConfig::from_lookup`].
    pub fn from_lookup<F>(lookup: F, config: GeneratorConfig) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_client_config(ClientConfig::from_lookup(lookup)?, config)
    }

    pub fn from_client_config(
        client: ClientConfig,
        config: GeneratorConfig,
    ) -> Result<Self, ConfigurationError> {
        let model = GeminiClient::new(client)?;
        let renderer = ManimRenderer::new(config.render_config());
        Ok(Self::new(model, PythonSyntaxValidator::new(), renderer, config))
    }
}

impl<M, V, R> TheoremPipeline<M, V, R>
where
    M: LanguageModel,
    V: SyntaxValidator,
    R: Renderer,
{
    pub fn new(model: M, validator: V, renderer: R, config: GeneratorConfig) -> Self {
        let prompts = PromptBuilder::new(config.template.clone());
        Self {
            model,
            validator,
            renderer,
            config,
            prompts,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn workspace(&self, out_dir: &Path) -> RunWorkspace {
        RunWorkspace::with_script_name(out_dir, self.config.script_name.clone())
    }

    /// Ask the model for the visual intuition behind `theorem`.
    pub async fn generate_intuition(
        &self,
        theorem: &TheoremStatement,
    ) -> Result<IntuitionExplanation, GenerationError> {
        let prompt = self.prompts.intuition_prompt(theorem);
        let text = generate_with_backoff(
            &self.model,
            &prompt,
            self.config.generation_attempts_max,
            self.config.retry_backoff,
        )
        .await?;
        Ok(IntuitionExplanation::new(text.into_inner()))
    }

    /// Only write `intuition.txt` into `out_dir`.
    pub async fn run_intuition(
        &self,
        theorem: &TheoremStatement,
        out_dir: &Path,
    ) -> Result<IntuitionExplanation, PipelineError> {
        let workspace = self.workspace(out_dir);
        workspace.prepare().await?;

        let intuition = self.generate_intuition(theorem).await?;
        workspace.write_intuition(&intuition).await?;
        tracing::info!("Intuition written to {}", workspace.intuition_path().display());
        Ok(intuition)
    }

    /// Turn `theorem` into a rendered video under `out_dir`.
    ///
    /// On failure the latest intuition and script stay on disk.
    pub async fn run(
        &self,
        theorem: &TheoremStatement,
        out_dir: &Path,
    ) -> Result<PipelineReport, PipelineError> {
        let start = Instant::now();
        let workspace = self.workspace(out_dir);
        workspace.prepare().await?;
        tracing::info!(out_dir = %out_dir.display(), "Starting theorem run");

        let intuition = self.generate_intuition(theorem).await?;
        workspace.write_intuition(&intuition).await?;
        tracing::info!(chars = intuition.as_str().len(), "Intuition generated");

        let synthesizer = ScriptSynthesizer::new(&self.model, &self.validator, &workspace, &self.config);
        let synthesis = synthesizer.synthesize_with_report(theorem, &intuition).await?;

        let controller = RenderRetryController::new(&self.model, &self.renderer, &workspace, &self.config);
        let render = controller.run(synthesis.script).await?;

        Ok(PipelineReport {
            theorem: theorem.clone(),
            intuition_path: workspace.intuition_path(),
            script_path: workspace.script_path(),
            artifact: render.artifact,
            repair_rounds: synthesis.repair_rounds,
            render_attempts: render.attempts,
            duration: start.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RenderRetryError, SynthesisError};
    use crate::test_support::{fenced, test_config, VALID_SCRIPT};
    use ta_dst::{
        get_or_generate_seed, FaultConfig, RenderStep, ScriptedModel, ScriptedRenderer, SimModel,
        SimRenderer,
    };

    const INTUITION: &str = "Draw a right triangle. Grow a square on each side.\n\nSlide the pieces of the two small squares into the big one.";

    #[tokio::test]
    async fn test_full_run_with_one_render_repair() {
        let dir = tempfile::tempdir().unwrap();
        let model = ScriptedModel::from_texts([
            INTUITION.to_string(),
            fenced(VALID_SCRIPT),
            fenced(VALID_SCRIPT),
            fenced(&format!("{}\n        self.wait(2)", VALID_SCRIPT)),
        ]);
        let renderer = ScriptedRenderer::failing_then_success([
            "NameError: name 'ShowCreation' is not defined",
        ]);
        let pipeline = TheoremPipeline::new(model, PythonSyntaxValidator::new(), renderer, test_config());

        let theorem = TheoremStatement::new("a^2+b^2=c^2").unwrap();
        let report = pipeline.run(&theorem, dir.path()).await.unwrap();

        assert_eq!(
            report.artifact,
            dir.path().join("media/videos/theorem_animation/480p15/theorem_animation.mp4")
        );
        assert!(report.artifact.exists());
        assert_eq!(report.repair_rounds, 0);
        assert_eq!(report.render_attempts.len(), 2);

        assert_eq!(std::fs::read_to_string(&report.intuition_path).unwrap(), INTUITION);
        let script = std::fs::read_to_string(&report.script_path).unwrap();
        assert!(script.contains("self.wait(2)"));

        let prompts = pipeline.model.prompts();
        assert_eq!(prompts.len(), 4);
        assert!(prompts[0].starts_with("Explain the intuition"));
        assert!(prompts[1].contains("Slide the pieces"));
        assert!(prompts[3].contains("ShowCreation"));

        let summary = report.format_summary();
        assert!(summary.starts_with("[SUCCESS]"));
        assert!(summary.contains("Render attempts: 2"));
        assert!(summary.contains("[FAIL] render #1: NameError"));
    }

    #[tokio::test]
    async fn test_run_intuition_writes_only_intuition() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("run");
        let pipeline = TheoremPipeline::new(
            ScriptedModel::from_texts([INTUITION]),
            PythonSyntaxValidator::new(),
            ScriptedRenderer::default(),
            test_config(),
        );

        let theorem = TheoremStatement::new("a^2+b^2=c^2").unwrap();
        let intuition = pipeline.run_intuition(&theorem, &out_dir).await.unwrap();

        assert_eq!(intuition.as_str(), INTUITION);
        assert!(out_dir.join("intuition.txt").exists());
        assert!(!out_dir.join("theorem_animation.py").exists());
        assert_eq!(pipeline.renderer.calls_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_run_leaves_last_script() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = TheoremPipeline::new(
            ScriptedModel::from_texts([INTUITION]).with_fallback(fenced(VALID_SCRIPT)),
            PythonSyntaxValidator::new(),
            ScriptedRenderer::new([
                RenderStep::Fail("e1".to_string()),
                RenderStep::Fail("e2".to_string()),
                RenderStep::Fail("e3".to_string()),
                RenderStep::Fail("e4".to_string()),
            ]),
            test_config(),
        );

        let theorem = TheoremStatement::new("a^2+b^2=c^2").unwrap();
        let err = pipeline.run(&theorem, dir.path()).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Render(RenderRetryError::Exhausted { attempts: 4, .. })
        ));
        assert!(err.to_string().contains("e4"));
        assert!(dir.path().join("intuition.txt").exists());
        assert!(dir.path().join("theorem_animation.py").exists());
    }

    #[tokio::test]
    async fn test_synthesis_failure_skips_render() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = TheoremPipeline::new(
            ScriptedModel::from_texts([INTUITION]).with_fallback(fenced("print('no scene here')")),
            PythonSyntaxValidator::new(),
            ScriptedRenderer::new([RenderStep::Success]),
            test_config(),
        );

        let theorem = TheoremStatement::new("a^2+b^2=c^2").unwrap();
        let err = pipeline.run(&theorem, dir.path()).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Synthesis(SynthesisError::MissingEntryPoint { .. })
        ));
        assert_eq!(pipeline.renderer.calls_count(), 0);
    }

    #[test]
    fn test_missing_credential_is_configuration_error() {
        let err = ClientConfig::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingCredential("GEMINI_API_KEY")));

        let err = PipelineError::from(err);
        assert!(matches!(err, PipelineError::Configuration(_)));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_any_request() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::any())
            .respond_with(wiremock::ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let base_url = server.uri();
        for api_key in [None, Some("  ")] {
            let lookup = |name: &str| match name {
                crate::client::API_KEY_ENV => api_key.map(str::to_string),
                crate::client::BASE_URL_ENV => Some(base_url.clone()),
                _ => None,
            };
            let result = TheoremPipeline::from_lookup(lookup, test_config());
            assert!(matches!(
                result,
                Err(ConfigurationError::MissingCredential("GEMINI_API_KEY"))
            ));
        }

        server.verify().await;
    }

    #[tokio::test]
    async fn test_seeded_runs_stay_within_budgets() {
        let base_seed = get_or_generate_seed();
        let config = test_config();

        for offset in 0..40u64 {
            let seed = base_seed.wrapping_add(offset);
            let dir = tempfile::tempdir().unwrap();
            let pipeline = TheoremPipeline::new(
                SimModel::new(seed, FaultConfig::aggressive(), fenced(VALID_SCRIPT)),
                PythonSyntaxValidator::new(),
                SimRenderer::new(seed ^ 0x5eed, FaultConfig::aggressive()),
                config.clone(),
            );

            let theorem = TheoremStatement::new("a^2+b^2=c^2").unwrap();
            let result = pipeline.run(&theorem, dir.path()).await;
            let renders = pipeline.renderer.calls_count();

            assert!(renders <= u64::from(config.render_attempts_max), "seed {}", seed);
            match result {
                Ok(report) => {
                    assert!(report.artifact.exists(), "seed {}", seed);
                    assert_eq!(report.render_attempts.len() as u64, renders, "seed {}", seed);
                    assert!(report.render_attempts.last().unwrap().is_success());
                }
                Err(PipelineError::Render(RenderRetryError::Exhausted { attempts, .. })) => {
                    assert_eq!(attempts, config.render_attempts_max, "seed {}", seed);
                    assert_eq!(renders, u64::from(attempts), "seed {}", seed);
                }
                Err(PipelineError::Intuition(_))
                | Err(PipelineError::Synthesis(SynthesisError::Generation(_)))
                | Err(PipelineError::Render(RenderRetryError::Repair(_))) => {}
                Err(other) => panic!("seed {}: unexpected error {:?}", seed, other),
            }
        }
    }
}
