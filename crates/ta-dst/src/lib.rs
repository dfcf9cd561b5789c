//! # ta-dst
//!
//! Deterministic simulation of the pipeline's external services.
//!
//! The language model and the rendering engine are slow, costly and flaky.
//! Tests replace them with fakes from this crate:
//!
//! ```rust
//! use ta_dst::{RenderStep, ScriptedModel, ScriptedRenderer};
//!
//! // The model answers twice, the renderer fails once then succeeds.
//! let model = ScriptedModel::from_texts(["intuition", "```python\n...\n```"]);
//! let renderer = ScriptedRenderer::new([
//!     RenderStep::Fail("NameError: name 'ShowCreation' is not defined".to_string()),
//!     RenderStep::Success,
//! ]);
//! ```
//!
//! ## Reproducibility
//!
//! Seeded fakes (`SimModel`, `SimRenderer`) replay the same faults for the
//! same seed:
//! ```bash
//! DST_SEED=12345 cargo test
//! ```

pub mod fault;
pub mod random;
pub mod sim;

pub use fault::{FaultConfig, FaultInjector, FaultStats, ModelFault, RenderFault};
pub use random::DeterministicRng;
pub use sim::{ModelResponse, RenderStep, ScriptedModel, ScriptedRenderer, SimModel, SimRenderer};

/// Seed from `DST_SEED`, or a fresh random one.
///
/// The seed is logged so a failing run can be reproduced.
#[must_use]
pub fn get_or_generate_seed() -> u64 {
    let from_env = std::env::var("DST_SEED")
        .ok()
        .and_then(|s| match s.trim().parse::<u64>() {
            Ok(seed) => Some(seed),
            Err(e) => {
                tracing::warn!("Ignoring DST_SEED={:?}: {}", s, e);
                None
            }
        });

    match from_env {
        Some(seed) => {
            tracing::info!("DST_SEED={} (from environment)", seed);
            seed
        }
        None => {
            let seed = rand::random::<u64>().max(1);
            tracing::info!("DST_SEED={} (randomly generated)", seed);
            seed
        }
    }
}
