//! Deterministic fault injection for the external services.
//!
//! The failure modes mirror what the real services do:
//! - the model answers with nothing
//! - the model call fails in transport
//! - the renderer exits with an error
//! - the renderer exits cleanly but writes no video

use crate::random::DeterministicRng;

/// Configuration for fault injection.
#[derive(Debug, Clone)]
pub struct FaultConfig {
    /// Probability a model call returns empty text
    pub empty_response_probability: f64,
    /// Probability a model call fails in transport
    pub transport_failure_probability: f64,
    /// Probability a render exits with an error
    pub render_failure_probability: f64,
    /// Probability a render "succeeds" without writing the artifact
    pub missing_artifact_probability: f64,
    /// Whether fault injection is enabled
    pub enabled: bool,
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self {
            empty_response_probability: 0.05,
            transport_failure_probability: 0.05,
            render_failure_probability: 0.2,
            missing_artifact_probability: 0.05,
            enabled: true,
        }
    }
}

impl FaultConfig {
    /// No faults.
    #[must_use]
    pub fn none() -> Self {
        Self {
            empty_response_probability: 0.0,
            transport_failure_probability: 0.0,
            render_failure_probability: 0.0,
            missing_artifact_probability: 0.0,
            enabled: false,
        }
    }

    /// Heavy faults on both services.
    #[must_use]
    pub fn aggressive() -> Self {
        Self {
            empty_response_probability: 0.2,
            transport_failure_probability: 0.2,
            render_failure_probability: 0.5,
            missing_artifact_probability: 0.2,
            enabled: true,
        }
    }

    /// Only the model misbehaves.
    #[must_use]
    pub fn flaky_model() -> Self {
        Self {
            render_failure_probability: 0.0,
            missing_artifact_probability: 0.0,
            empty_response_probability: 0.3,
            transport_failure_probability: 0.3,
            enabled: true,
        }
    }
}

/// A fault to apply to one model call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFault {
    EmptyResponse,
    TransportFailure,
}

/// A fault to apply to one render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFault {
    Failure,
    MissingArtifact,
}

/// Deterministic fault injector.
///
/// The same seed and config produce the same fault sequence.
#[derive(Debug)]
pub struct FaultInjector {
    rng: DeterministicRng,
    config: FaultConfig,
    stats: FaultStats,
}

impl FaultInjector {
    pub fn new(rng: DeterministicRng, config: FaultConfig) -> Self {
        for p in [
            config.empty_response_probability,
            config.transport_failure_probability,
            config.render_failure_probability,
            config.missing_artifact_probability,
        ] {
            debug_assert!((0.0..=1.0).contains(&p), "Probabilities must be in [0.0, 1.0]");
        }

        Self {
            rng,
            config,
            stats: FaultStats::default(),
        }
    }

    pub fn with_default_config(rng: DeterministicRng) -> Self {
        Self::new(rng, FaultConfig::default())
    }

    /// Fault for the next model call, if any.
    pub fn model_fault(&mut self) -> Option<ModelFault> {
        if !self.config.enabled {
            return None;
        }
        if self.rng.gen_bool(self.config.transport_failure_probability) {
            self.stats.transport_failures_count += 1;
            return Some(ModelFault::TransportFailure);
        }
        if self.rng.gen_bool(self.config.empty_response_probability) {
            self.stats.empty_responses_count += 1;
            return Some(ModelFault::EmptyResponse);
        }
        None
    }

    /// Fault for the next render call, if any.
    pub fn render_fault(&mut self) -> Option<RenderFault> {
        if !self.config.enabled {
            return None;
        }
        if self.rng.gen_bool(self.config.render_failure_probability) {
            self.stats.render_failures_count += 1;
            return Some(RenderFault::Failure);
        }
        if self.rng.gen_bool(self.config.missing_artifact_probability) {
            self.stats.missing_artifacts_count += 1;
            return Some(RenderFault::MissingArtifact);
        }
        None
    }

    #[must_use]
    pub fn stats(&self) -> FaultStats {
        self.stats
    }

    #[must_use]
    pub fn config(&self) -> &FaultConfig {
        &self.config
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }
}

/// Counts of injected faults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultStats {
    pub empty_responses_count: u64,
    pub transport_failures_count: u64,
    pub render_failures_count: u64,
    pub missing_artifacts_count: u64,
}

impl FaultStats {
    pub fn total(&self) -> u64 {
        self.empty_responses_count
            + self.transport_failures_count
            + self.render_failures_count
            + self.missing_artifacts_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_faults_when_disabled() {
        let mut injector = FaultInjector::new(DeterministicRng::new(12345), FaultConfig::none());

        for _ in 0..1000 {
            assert_eq!(injector.model_fault(), None);
            assert_eq!(injector.render_fault(), None);
        }
        assert_eq!(injector.stats().total(), 0);
    }

    #[test]
    fn test_same_seed_same_faults() {
        let mut inj1 = FaultInjector::new(DeterministicRng::new(42), FaultConfig::aggressive());
        let mut inj2 = FaultInjector::new(DeterministicRng::new(42), FaultConfig::aggressive());

        for _ in 0..200 {
            assert_eq!(inj1.model_fault(), inj2.model_fault());
            assert_eq!(inj1.render_fault(), inj2.render_fault());
        }
        assert_eq!(inj1.stats(), inj2.stats());
    }

    #[test]
    fn test_certain_faults() {
        let config = FaultConfig {
            transport_failure_probability: 1.0,
            render_failure_probability: 1.0,
            ..FaultConfig::default()
        };
        let mut injector = FaultInjector::new(DeterministicRng::new(7), config);

        for _ in 0..10 {
            assert_eq!(injector.model_fault(), Some(ModelFault::TransportFailure));
            assert_eq!(injector.render_fault(), Some(RenderFault::Failure));
        }
        let stats = injector.stats();
        assert_eq!(stats.transport_failures_count, 10);
        assert_eq!(stats.render_failures_count, 10);
        assert_eq!(stats.empty_responses_count, 0);
    }

    #[test]
    fn test_flaky_model_spares_renderer() {
        let mut injector = FaultInjector::new(DeterministicRng::new(99), FaultConfig::flaky_model());
        for _ in 0..500 {
            assert_eq!(injector.render_fault(), None);
        }
        for _ in 0..500 {
            injector.model_fault();
        }
        assert!(injector.stats().transport_failures_count > 0);
        assert!(injector.stats().empty_responses_count > 0);
    }
}
