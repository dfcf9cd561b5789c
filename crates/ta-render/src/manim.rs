//! Rendering through the manim command line.
//!
//! One render is one child process. The engine can exit cleanly without
//! writing a video, so success is only reported once the artifact is seen
//! on disk.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Instant;

use ta_core::{artifact_path, RenderError, Renderer};
use tokio::process::Command;

use crate::config::RenderConfig;

/// Longest diagnostic handed back to the repair loop.
pub const RENDER_ERROR_CHARS_MAX: usize = 4000;

/// Renderer driving the `manim` executable.
#[derive(Debug, Clone, Default)]
pub struct ManimRenderer {
    config: RenderConfig,
}

impl ManimRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Create with default config.
    pub fn with_defaults() -> Self {
        Self::new(RenderConfig::default())
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Where a render of `script_path` will leave its video.
    pub fn expected_artifact(&self, script_path: &Path, out_dir: &Path) -> Result<PathBuf, RenderError> {
        let base = script_base_name(script_path)?;
        Ok(artifact_path(out_dir, &base, self.config.quality))
    }

    fn command(&self, script_path: &Path, out_dir: &Path, base: &str) -> Command {
        let mut cmd = Command::new(&self.config.program);
        cmd.args(&self.config.program_args)
            .arg(self.config.quality.flag())
            .arg("--media_dir")
            .arg(out_dir.join("media"))
            .arg("-o")
            .arg(base)
            .arg(script_path)
            .arg(&self.config.scene_name)
            .current_dir(out_dir)
            .kill_on_drop(true);
        cmd
    }

    async fn run(&self, script_path: &Path, out_dir: &Path) -> Result<PathBuf, RenderError> {
        let base = script_base_name(script_path)?;
        let artifact = artifact_path(out_dir, &base, self.config.quality);

        // The child runs inside out_dir, so relative paths must not leak into it.
        let out_abs = tokio::fs::canonicalize(out_dir)
            .await
            .map_err(|e| RenderError::Spawn(format!("output directory {}: {}", out_dir.display(), e)))?;
        let script_abs = tokio::fs::canonicalize(script_path)
            .await
            .map_err(|e| RenderError::Spawn(format!("script {}: {}", script_path.display(), e)))?;

        // A video left by an earlier round must not pass for this one.
        match tokio::fs::remove_file(&artifact).await {
            Ok(()) => tracing::debug!(artifact = %artifact.display(), "Removed stale artifact"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(RenderError::Spawn(format!(
                    "stale artifact {}: {}",
                    artifact.display(),
                    e
                )))
            }
        }

        tracing::info!(
            script = %script_path.display(),
            quality = self.config.quality.directory(),
            "Rendering scene {}",
            self.config.scene_name
        );

        let start = Instant::now();
        let result = tokio::time::timeout(
            self.config.timeout,
            self.command(&script_abs, &out_abs, &base).output(),
        )
        .await;
        let duration = start.elapsed();

        let output = match result {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(RenderError::Spawn(format!(
                    "{}: {}",
                    self.config.program, e
                )))
            }
            Err(_) => return Err(RenderError::Timeout(self.config.timeout)),
        };

        let artifact_exists = tokio::fs::try_exists(&artifact).await.unwrap_or(false);
        tracing::debug!(
            status = %output.status,
            artifact_exists,
            "Renderer exited after {:?}",
            duration
        );

        if !output.status.success() {
            return Err(RenderError::Failed {
                status: output.status.to_string(),
                message: failure_message(&output),
            });
        }
        if !artifact_exists {
            return Err(RenderError::ArtifactNotFound(artifact));
        }
        Ok(artifact)
    }
}

impl Renderer for ManimRenderer {
    async fn render(&self, script_path: &Path, out_dir: &Path) -> Result<PathBuf, RenderError> {
        self.run(script_path, out_dir).await
    }
}

fn script_base_name(script_path: &Path) -> Result<String, RenderError> {
    script_path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| RenderError::Spawn(format!("script path has no file name: {}", script_path.display())))
}

fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        return extract_render_error(&stderr);
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        return extract_render_error(&stdout);
    }
    format!("renderer exited with {} and no output", output.status)
}

/// Extract the part of the engine output worth showing the model.
///
/// Prefers the last Python traceback; falls back to the trailing lines.
/// The result is capped at [`RENDER_ERROR_CHARS_MAX`] characters, keeping
/// the end, where the exception line is.
pub fn extract_render_error(output: &str) -> String {
    let lines: Vec<&str> = output.lines().collect();

    let start = lines
        .iter()
        .rposition(|l| l.trim_start().starts_with("Traceback (most recent call last)"))
        .unwrap_or_else(|| lines.len().saturating_sub(20));

    let tail = lines[start..]
        .iter()
        .map(|l| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    let tail = tail.trim();

    if tail.is_empty() {
        return "unknown render error".to_string();
    }

    let chars = tail.chars().count();
    if chars <= RENDER_ERROR_CHARS_MAX {
        return tail.to_string();
    }
    let kept: String = tail.chars().skip(chars - RENDER_ERROR_CHARS_MAX).collect();
    format!("...{}", kept)
}
