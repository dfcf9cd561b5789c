//! Run configuration.

use std::time::Duration;

use ta_core::{
    RenderQuality, ScriptTemplate, GENERATION_ATTEMPTS_MAX, RENDER_ATTEMPTS_MAX,
    SYNTAX_REPAIR_ROUNDS_MAX,
};
use ta_render::RenderConfig;

use crate::workspace::DEFAULT_SCRIPT_NAME;

/// Bounds and shape of one theorem run.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Raw model calls per prompt before giving up
    pub generation_attempts_max: u32,
    /// Syntax repair rounds after the reviewed draft
    pub syntax_repair_rounds_max: u32,
    /// Render attempts, counting the first one
    pub render_attempts_max: u32,
    /// Initial pause between model retries (doubles each retry)
    pub retry_backoff: Duration,
    /// Required script structure
    pub template: ScriptTemplate,
    /// Render quality
    pub quality: RenderQuality,
    /// File stem of the script (and of the video)
    pub script_name: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            generation_attempts_max: GENERATION_ATTEMPTS_MAX,
            syntax_repair_rounds_max: SYNTAX_REPAIR_ROUNDS_MAX,
            render_attempts_max: RENDER_ATTEMPTS_MAX,
            retry_backoff: Duration::from_secs(1),
            template: ScriptTemplate::default(),
            quality: RenderQuality::Low,
            script_name: DEFAULT_SCRIPT_NAME.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Quick config for fast iteration.
    pub fn quick() -> Self {
        Self {
            generation_attempts_max: 2,
            syntax_repair_rounds_max: 3,
            render_attempts_max: 2,
            retry_backoff: Duration::from_millis(500),
            ..Default::default()
        }
    }

    /// Thorough config: more repair headroom, better video.
    pub fn thorough() -> Self {
        Self {
            generation_attempts_max: 5,
            syntax_repair_rounds_max: 8,
            render_attempts_max: 6,
            quality: RenderQuality::Medium,
            ..Default::default()
        }
    }

    /// Renderer settings matching this run's template and quality.
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            scene_name: self.template.scene_name.clone(),
            quality: self.quality,
            ..RenderConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds() {
        let config = GeneratorConfig::default();
        assert_eq!(config.generation_attempts_max, 3);
        assert_eq!(config.syntax_repair_rounds_max, 5);
        assert_eq!(config.render_attempts_max, 4);
        assert_eq!(config.script_name, "theorem_animation");
    }

    #[test]
    fn test_presets_order() {
        let quick = GeneratorConfig::quick();
        let thorough = GeneratorConfig::thorough();
        assert!(quick.render_attempts_max < thorough.render_attempts_max);
        assert!(quick.syntax_repair_rounds_max < thorough.syntax_repair_rounds_max);
    }

    #[test]
    fn test_render_config_follows_template() {
        let mut config = GeneratorConfig::thorough();
        config.template.scene_name = "CircleScene".to_string();
        let render = config.render_config();
        assert_eq!(render.scene_name, "CircleScene");
        assert_eq!(render.quality, RenderQuality::Medium);
        assert_eq!(render.program, "manim");
    }
}
