//! Rendering engine seam and the artifact path convention.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Output quality of the rendering engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderQuality {
    /// 854x480 at 15 fps
    #[default]
    Low,
    /// 1280x720 at 30 fps
    Medium,
    /// 1920x1080 at 60 fps
    High,
}

impl RenderQuality {
    /// Command-line flag selecting this quality.
    pub fn flag(self) -> &'static str {
        match self {
            RenderQuality::Low => "-ql",
            RenderQuality::Medium => "-qm",
            RenderQuality::High => "-qh",
        }
    }

    /// Directory the engine writes videos of this quality into.
    pub fn directory(self) -> &'static str {
        match self {
            RenderQuality::Low => "480p15",
            RenderQuality::Medium => "720p30",
            RenderQuality::High => "1080p60",
        }
    }

    /// Parse a user-facing name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" | "l" | "480p" | "480p15" => Some(RenderQuality::Low),
            "medium" | "m" | "720p" | "720p30" => Some(RenderQuality::Medium),
            "high" | "h" | "1080p" | "1080p60" => Some(RenderQuality::High),
            _ => None,
        }
    }
}

/// Where the engine leaves the video for a script.
///
/// `out_dir/media/videos/<base>/<quality dir>/<base>.mp4`
pub fn artifact_path(out_dir: &Path, script_base_name: &str, quality: RenderQuality) -> PathBuf {
    debug_assert!(!script_base_name.is_empty(), "Script base name must not be empty");

    out_dir
        .join("media")
        .join("videos")
        .join(script_base_name)
        .join(quality.directory())
        .join(format!("{}.mp4", script_base_name))
}

/// Failure of a single render call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to start renderer: {0}")]
    Spawn(String),

    #[error("Renderer exited with {status}: {message}")]
    Failed { status: String, message: String },

    #[error("Render timed out after {0:?}")]
    Timeout(Duration),

    #[error("artifact not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),
}

impl RenderError {
    /// Text handed to the repair prompt.
    pub fn diagnostic(&self) -> String {
        match self {
            RenderError::Failed { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// A rendering engine.
///
/// Renders the script at `script_path` and returns the verified artifact
/// path. Implementations must check the artifact exists before returning
/// success.
pub trait Renderer {
    fn render(
        &self,
        script_path: &Path,
        out_dir: &Path,
    ) -> impl Future<Output = Result<PathBuf, RenderError>> + Send;
}
