//! Caller-facing facade bundling configuration and the model cache.

use tracing::warn;

use crate::cache::ModelCache;
use crate::config::RouterConfig;
use crate::predictor::{self, PredictionResult};
use crate::training::{self, TrainOutcome};
use crate::validation::PromptImprover;

pub struct PromptRouter {
    config: RouterConfig,
    cache: ModelCache,
}

impl PromptRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            cache: ModelCache::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(RouterConfig::from_env())
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }

    /// Startup flow: consult the retraining policy and train when
    /// stale; otherwise reuse the persisted artifacts, which load
    /// lazily on first prediction.
    pub fn ensure_ready(&self) -> TrainOutcome {
        match training::should_retrain(&self.config) {
            Ok(true) => self.train(),
            Ok(false) => TrainOutcome::success("using existing trained model"),
            Err(e) => TrainOutcome::failure(e.to_string()),
        }
    }

    /// Trains from the configured corpus and installs the artifacts.
    pub fn train(&self) -> TrainOutcome {
        training::train(&self.config, &self.cache)
    }

    /// Predicts the routing target for a prompt.
    pub fn predict(&self, prompt: &str) -> PredictionResult {
        predictor::predict(prompt, &self.config, &self.cache)
    }

    /// Routes through the improver when it succeeds, degrading to the
    /// raw prompt on any improvement failure.
    pub fn predict_with_improver(
        &self,
        prompt: &str,
        improver: &dyn PromptImprover,
    ) -> PredictionResult {
        let outcome = improver.improve(prompt);
        let routed = match (outcome.success, outcome.improved_prompt) {
            (true, Some(improved)) => improved,
            _ => {
                warn!("prompt improvement unavailable, routing original prompt");
                prompt.to_string()
            }
        };
        self.predict(&routed)
    }
}
