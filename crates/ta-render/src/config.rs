//! Renderer configuration.

use std::time::Duration;

use ta_core::RenderQuality;

/// How the rendering engine is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Executable to run
    pub program: String,
    /// Arguments placed before the engine flags (e.g. `["-m", "manim"]`)
    pub program_args: Vec<String>,
    /// Scene class to render
    pub scene_name: String,
    /// Output quality
    pub quality: RenderQuality,
    /// Wall-clock limit for one render
    pub timeout: Duration,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            program: "manim".to_string(),
            program_args: Vec::new(),
            scene_name: "TheoremScene".to_string(),
            quality: RenderQuality::Low,
            timeout: Duration::from_secs(600), // 10 minutes
        }
    }
}

impl RenderConfig {
    /// Fast, low resolution renders while iterating.
    pub fn preview() -> Self {
        Self {
            quality: RenderQuality::Low,
            timeout: Duration::from_secs(180),
            ..Default::default()
        }
    }

    /// Full resolution render for the finished animation.
    pub fn final_cut() -> Self {
        Self {
            quality: RenderQuality::High,
            timeout: Duration::from_secs(1800), // 30 minutes
            ..Default::default()
        }
    }

    /// Run the engine through another program (e.g. `python -m manim`).
    pub fn with_program(mut self, program: impl Into<String>, args: Vec<String>) -> Self {
        self.program = program.into();
        self.program_args = args;
        self
    }

    pub fn with_quality(mut self, quality: RenderQuality) -> Self {
        self.quality = quality;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let default = RenderConfig::default();
        assert_eq!(default.program, "manim");
        assert_eq!(default.scene_name, "TheoremScene");
        assert_eq!(default.quality, RenderQuality::Low);

        assert!(RenderConfig::preview().timeout < default.timeout);
        assert_eq!(RenderConfig::final_cut().quality, RenderQuality::High);
    }

    #[test]
    fn test_with_program() {
        let config = RenderConfig::default()
            .with_program("python3", vec!["-m".to_string(), "manim".to_string()])
            .with_quality(RenderQuality::Medium);
        assert_eq!(config.program, "python3");
        assert_eq!(config.program_args, ["-m", "manim"]);
        assert_eq!(config.quality, RenderQuality::Medium);
    }
}
