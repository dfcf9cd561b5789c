//! Simulated language model and renderer.
//!
//! Two flavours of each:
//! - `Scripted*` replays an exact queue of outcomes and records what it saw,
//!   for tests that assert on prompts or on the script on disk.
//! - `Sim*` draws faults from a seeded [`FaultInjector`], for loops that
//!   check invariants over many seeds.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use ta_core::{
    artifact_path, GeneratedText, LanguageModel, RenderError, RenderQuality, Renderer,
    ServiceError,
};

use crate::fault::{FaultConfig, FaultInjector, ModelFault, RenderFault};
use crate::random::DeterministicRng;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One queued model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelResponse {
    Text(String),
    Empty,
    Error(ServiceError),
}

/// A model that replays queued responses and records every prompt.
///
/// Once the queue is empty the fallback text is returned, or a transport
/// error when there is none.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    responses: Mutex<VecDeque<ModelResponse>>,
    fallback: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue plain text responses in order.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let model = Self::new();
        {
            let mut responses = lock(&model.responses);
            responses.extend(texts.into_iter().map(|t| ModelResponse::Text(t.into())));
        }
        model
    }

    pub fn then(self, response: ModelResponse) -> Self {
        lock(&self.responses).push_back(response);
        self
    }

    pub fn then_text(self, text: impl Into<String>) -> Self {
        self.then(ModelResponse::Text(text.into()))
    }

    pub fn then_empty(self) -> Self {
        self.then(ModelResponse::Empty)
    }

    pub fn then_error(self, error: ServiceError) -> Self {
        self.then(ModelResponse::Error(error))
    }

    /// Text returned once the queue runs dry.
    pub fn with_fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback = Some(text.into());
        self
    }

    /// Every prompt received, in order.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    pub fn calls_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    /// Responses still queued.
    pub fn remaining(&self) -> usize {
        lock(&self.responses).len()
    }
}

impl LanguageModel for ScriptedModel {
    async fn generate(&self, prompt: &str) -> Result<GeneratedText, ServiceError> {
        lock(&self.prompts).push(prompt.to_string());
        let next = lock(&self.responses).pop_front();

        match next {
            Some(ModelResponse::Text(text)) => Ok(GeneratedText::new(text)),
            Some(ModelResponse::Empty) => Ok(GeneratedText::default()),
            Some(ModelResponse::Error(error)) => Err(error),
            None => match &self.fallback {
                Some(text) => Ok(GeneratedText::new(text.clone())),
                None => Err(ServiceError::Transport(
                    "scripted model has no responses left".to_string(),
                )),
            },
        }
    }
}

/// One queued render outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderStep {
    /// Write the artifact and succeed
    Success,
    /// Exit with an error carrying this message
    Fail(String),
    /// Exit cleanly without writing the artifact
    Silent,
}

/// A renderer that replays queued outcomes.
///
/// Records the script file contents as they were on disk at every call.
#[derive(Debug, Default)]
pub struct ScriptedRenderer {
    steps: Mutex<VecDeque<RenderStep>>,
    quality: RenderQuality,
    scripts_seen: Mutex<Vec<String>>,
}

impl ScriptedRenderer {
    pub fn new<I>(steps: I) -> Self
    where
        I: IntoIterator<Item = RenderStep>,
    {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Fail with each message in turn, then succeed.
    pub fn failing_then_success<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut steps: Vec<RenderStep> = messages
            .into_iter()
            .map(|m| RenderStep::Fail(m.into()))
            .collect();
        steps.push(RenderStep::Success);
        Self::new(steps)
    }

    pub fn with_quality(mut self, quality: RenderQuality) -> Self {
        self.quality = quality;
        self
    }

    /// Script contents at each render call, in order.
    pub fn scripts_seen(&self) -> Vec<String> {
        lock(&self.scripts_seen).clone()
    }

    pub fn calls_count(&self) -> usize {
        lock(&self.scripts_seen).len()
    }
}

impl Renderer for ScriptedRenderer {
    async fn render(&self, script_path: &Path, out_dir: &Path) -> Result<PathBuf, RenderError> {
        let script = tokio::fs::read_to_string(script_path)
            .await
            .map_err(|e| RenderError::Spawn(format!("script {}: {}", script_path.display(), e)))?;
        lock(&self.scripts_seen).push(script);

        let step = lock(&self.steps).pop_front();
        let artifact = expected_artifact(script_path, out_dir, self.quality)?;

        match step {
            Some(RenderStep::Success) => {
                write_artifact(&artifact).await?;
                Ok(artifact)
            }
            Some(RenderStep::Fail(message)) => Err(RenderError::Failed {
                status: "exit status: 1".to_string(),
                message,
            }),
            Some(RenderStep::Silent) => Err(RenderError::ArtifactNotFound(artifact)),
            None => Err(RenderError::Failed {
                status: "exit status: 1".to_string(),
                message: "scripted renderer has no outcomes left".to_string(),
            }),
        }
    }
}

/// A model returning `response` except when the injector says otherwise.
#[derive(Debug)]
pub struct SimModel {
    response: String,
    fault: Mutex<FaultInjector>,
    calls: Mutex<u64>,
}

impl SimModel {
    pub fn new(seed: u64, config: FaultConfig, response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            fault: Mutex::new(FaultInjector::new(DeterministicRng::new(seed), config)),
            calls: Mutex::new(0),
        }
    }

    pub fn calls_count(&self) -> u64 {
        *lock(&self.calls)
    }

    pub fn faults_count(&self) -> u64 {
        lock(&self.fault).stats().total()
    }
}

impl LanguageModel for SimModel {
    async fn generate(&self, _prompt: &str) -> Result<GeneratedText, ServiceError> {
        *lock(&self.calls) += 1;
        let fault = lock(&self.fault).model_fault();

        match fault {
            Some(ModelFault::TransportFailure) => Err(ServiceError::Transport(
                "simulated connection reset".to_string(),
            )),
            Some(ModelFault::EmptyResponse) => Ok(GeneratedText::default()),
            None => Ok(GeneratedText::new(self.response.clone())),
        }
    }
}

/// A renderer that fails as often as the injector says.
#[derive(Debug)]
pub struct SimRenderer {
    quality: RenderQuality,
    fault: Mutex<FaultInjector>,
    calls: Mutex<u64>,
}

impl SimRenderer {
    pub fn new(seed: u64, config: FaultConfig) -> Self {
        Self {
            quality: RenderQuality::default(),
            fault: Mutex::new(FaultInjector::new(DeterministicRng::new(seed), config)),
            calls: Mutex::new(0),
        }
    }

    pub fn calls_count(&self) -> u64 {
        *lock(&self.calls)
    }

    pub fn faults_count(&self) -> u64 {
        lock(&self.fault).stats().total()
    }
}

impl Renderer for SimRenderer {
    async fn render(&self, script_path: &Path, out_dir: &Path) -> Result<PathBuf, RenderError> {
        let call = {
            let mut calls = lock(&self.calls);
            *calls += 1;
            *calls
        };
        let fault = lock(&self.fault).render_fault();
        let artifact = expected_artifact(script_path, out_dir, self.quality)?;

        match fault {
            Some(RenderFault::Failure) => Err(RenderError::Failed {
                status: "exit status: 1".to_string(),
                message: format!("simulated render failure on call {}", call),
            }),
            Some(RenderFault::MissingArtifact) => Err(RenderError::ArtifactNotFound(artifact)),
            None => {
                write_artifact(&artifact).await?;
                Ok(artifact)
            }
        }
    }
}

fn expected_artifact(
    script_path: &Path,
    out_dir: &Path,
    quality: RenderQuality,
) -> Result<PathBuf, RenderError> {
    let base = script_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| RenderError::Spawn(format!("bad script path: {}", script_path.display())))?;
    Ok(artifact_path(out_dir, base, quality))
}

async fn write_artifact(artifact: &Path) -> Result<(), RenderError> {
    let io_error = |e: std::io::Error| RenderError::Spawn(format!("{}: {}", artifact.display(), e));
    if let Some(parent) = artifact.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
    }
    tokio::fs::write(artifact, b"simulated video").await.map_err(io_error)
}
