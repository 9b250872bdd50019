//! Prompt-to-model prediction.
//!
//! Turns a prompt into a labeled prediction with calibrated confidence
//! and the full label->probability mapping. Low confidence is reported,
//! never rejected: downstream callers decide how to present it.

use std::collections::HashMap;

use tracing::{error, info, warn};

use crate::cache::ModelCache;
use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::validation::validate_prompt;

/// Structured outcome of a routing prediction.
#[derive(Debug, Clone, Default)]
pub struct PredictionResult {
    pub success: bool,
    pub predicted_model: Option<String>,
    pub confidence: Option<f32>,
    pub probabilities: Option<HashMap<String, f32>>,
    pub error: Option<String>,
}

impl PredictionResult {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// Top-n labels by probability, descending. For ranking/display
    /// collaborators.
    pub fn ranked(&self, top_n: usize) -> Vec<(String, f32)> {
        let Some(probabilities) = &self.probabilities else {
            return Vec::new();
        };
        let mut ranked: Vec<(String, f32)> = probabilities
            .iter()
            .map(|(label, p)| (label.clone(), *p))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(top_n);
        ranked
    }
}

/// Predicts which model should serve `prompt`. Never panics and never
/// propagates a raw fault: every failure comes back as a structured
/// result.
pub fn predict(prompt: &str, config: &RouterConfig, cache: &ModelCache) -> PredictionResult {
    match try_predict(prompt, config, cache) {
        Ok(result) => result,
        Err(e @ (RouterError::Validation(_) | RouterError::NotTrained)) => {
            warn!(error = %e, "prediction rejected");
            PredictionResult::failure(e.to_string())
        }
        Err(e) => {
            error!(error = %e, "prediction failed");
            PredictionResult::failure(e.to_string())
        }
    }
}

fn try_predict(
    prompt: &str,
    config: &RouterConfig,
    cache: &ModelCache,
) -> Result<PredictionResult, RouterError> {
    validate_prompt(prompt)?;

    let embedder = cache.get_embedding_model(&config.embedding_model)?;
    let classifier = cache.get_classifier(&config.classifier_path)?;
    let encoder = cache.get_label_encoder(&config.encoder_path)?;
    let (Some(classifier), Some(encoder)) = (classifier, encoder) else {
        return Err(RouterError::NotTrained);
    };

    let preview: String = prompt.chars().take(50).collect();
    info!(prompt = %preview, "predicting routing target");

    let embedding = embedder.encode(prompt)?;
    let probabilities = classifier.predict_proba(&embedding)?;

    let (best_index, confidence) = probabilities
        .iter()
        .copied()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .ok_or_else(|| {
            RouterError::from(anyhow::anyhow!("classifier returned an empty distribution"))
        })?;
    let predicted_model = encoder
        .inverse(best_index)
        .ok_or_else(|| {
            RouterError::from(anyhow::anyhow!(
                "class index {best_index} missing from encoder ({} labels)",
                encoder.len()
            ))
        })?
        .to_string();

    let mapping: HashMap<String, f32> = probabilities
        .iter()
        .enumerate()
        .filter_map(|(i, &p)| encoder.inverse(i).map(|label| (label.to_string(), p)))
        .collect();

    info!(model = %predicted_model, confidence, "prediction complete");
    if confidence < config.confidence_threshold {
        warn!(
            confidence,
            threshold = config.confidence_threshold,
            "low confidence prediction"
        );
    }

    Ok(PredictionResult {
        success: true,
        predicted_model: Some(predicted_model),
        confidence: Some(confidence),
        probabilities: Some(mapping),
        error: None,
    })
}
