//! Files of one theorem run.
//!
//! ```text
//! <out_dir>/
//!   intuition.txt
//!   <script_name>.py
//!   media/videos/<script_name>/<quality>/<script_name>.mp4
//! ```
//!
//! Files are overwritten in place and never deleted, so a failed run leaves
//! its last attempt behind for inspection.

use std::io;
use std::path::{Path, PathBuf};

use ta_core::{artifact_path, CandidateScript, IntuitionExplanation, RenderQuality};

pub const DEFAULT_SCRIPT_NAME: &str = "theorem_animation";
pub const INTUITION_FILE: &str = "intuition.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunWorkspace {
    out_dir: PathBuf,
    script_name: String,
}

impl RunWorkspace {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self::with_script_name(out_dir, DEFAULT_SCRIPT_NAME)
    }

    pub fn with_script_name(out_dir: impl Into<PathBuf>, script_name: impl Into<String>) -> Self {
        let script_name = script_name.into();
        debug_assert!(!script_name.is_empty(), "Script name must not be empty");
        debug_assert!(!script_name.contains('/'), "Script name is a file stem, not a path");

        Self {
            out_dir: out_dir.into(),
            script_name,
        }
    }

    /// Create the output directory.
    pub async fn prepare(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.out_dir).await
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn script_name(&self) -> &str {
        &self.script_name
    }

    pub fn intuition_path(&self) -> PathBuf {
        self.out_dir.join(INTUITION_FILE)
    }

    pub fn script_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.py", self.script_name))
    }

    /// Where the renderer leaves the video of this run's script.
    pub fn artifact_path(&self, quality: RenderQuality) -> PathBuf {
        artifact_path(&self.out_dir, &self.script_name, quality)
    }

    pub async fn write_intuition(&self, intuition: &IntuitionExplanation) -> io::Result<()> {
        tokio::fs::write(self.intuition_path(), intuition.as_str()).await
    }

    /// Overwrite the script file with `script`.
    pub async fn write_script(&self, script: &CandidateScript) -> io::Result<()> {
        let mut contents = script.as_str().to_string();
        if !contents.ends_with('\n') {
            contents.push('\n');
        }
        tokio::fs::write(self.script_path(), contents).await
    }

    /// Current script file contents.
    pub async fn read_script(&self) -> io::Result<String> {
        tokio::fs::read_to_string(self.script_path()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let workspace = RunWorkspace::new("/tmp/run");
        assert_eq!(workspace.intuition_path(), PathBuf::from("/tmp/run/intuition.txt"));
        assert_eq!(workspace.script_path(), PathBuf::from("/tmp/run/theorem_animation.py"));
        assert_eq!(
            workspace.artifact_path(RenderQuality::Low),
            PathBuf::from("/tmp/run/media/videos/theorem_animation/480p15/theorem_animation.mp4")
        );

        let custom = RunWorkspace::with_script_name("out", "pythagoras");
        assert_eq!(custom.script_path(), PathBuf::from("out/pythagoras.py"));
    }

    #[tokio::test]
    async fn test_writes_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = RunWorkspace::new(dir.path().join("nested/run"));
        workspace.prepare().await.unwrap();

        workspace.write_script(&CandidateScript::new("first")).await.unwrap();
        workspace.write_script(&CandidateScript::new("second")).await.unwrap();
        assert_eq!(workspace.read_script().await.unwrap(), "second\n");

        workspace
            .write_intuition(&IntuitionExplanation::new("picture it"))
            .await
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(workspace.intuition_path()).unwrap(),
            "picture it"
        );
    }
}
