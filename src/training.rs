//! Training of the routing classifier.
//!
//! Loads the labeled corpus, embeds every prompt, fits the label
//! encoder and the MLP, persists both artifacts and installs them into
//! the cache. Training never crashes the host process: every failure
//! comes back as a `TrainOutcome` value.

use std::path::Path;

use tracing::{error, info};

use crate::artifacts::{ArtifactStore, ModelFreshness};
use crate::cache::ModelCache;
use crate::classifiers::{MlpClassifier, MlpTrainOptions};
use crate::config::RouterConfig;
use crate::corpus::TrainingCorpus;
use crate::error::RouterError;
use crate::labels::LabelEncoder;

/// Outcome of a training run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainOutcome {
    pub success: bool,
    pub message: String,
}

impl TrainOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Whether training must run before predictions are available.
pub fn should_retrain(config: &RouterConfig) -> Result<bool, RouterError> {
    Ok(ArtifactStore::from_config(config).freshness()? == ModelFreshness::Stale)
}

/// Trains the classifier and label encoder from the configured corpus.
/// Validation failures leave the cache and any persisted artifacts
/// untouched.
pub fn train(config: &RouterConfig, cache: &ModelCache) -> TrainOutcome {
    match try_train(config, cache) {
        Ok(count) => TrainOutcome::success(format!("{count} examples trained")),
        Err(e) => {
            error!(error = %e, "training failed");
            TrainOutcome::failure(e.to_string())
        }
    }
}

fn try_train(config: &RouterConfig, cache: &ModelCache) -> Result<usize, RouterError> {
    info!(path = %config.training_data_path.display(), "loading training data");
    let corpus = TrainingCorpus::load(&config.training_data_path)?;
    corpus.validate()?;
    info!(examples = corpus.len(), "training data loaded");

    let embedder = cache.get_embedding_model(&config.embedding_model)?;
    let embeddings = embedder.encode_batch(&corpus.prompts())?;

    let labels = corpus.labels();
    let encoder = LabelEncoder::fit(&labels);
    let targets = encoder.encode_all(&labels)?;

    let options = MlpTrainOptions {
        hidden_layers: config.mlp_hidden_layers.clone(),
        max_iter: config.mlp_max_iter,
        seed: config.mlp_random_state,
    };
    info!(
        classes = encoder.len(),
        hidden_layers = ?options.hidden_layers,
        max_iter = options.max_iter,
        "fitting classifier"
    );
    let classifier = MlpClassifier::fit(&embeddings, &targets, encoder.len(), &options)?;

    persist(config, &classifier, &encoder)?;
    cache.set_classifier(classifier);
    cache.set_label_encoder(encoder);
    Ok(corpus.len())
}

/// Writes both artifacts; persisting the two together keeps them
/// version-locked.
fn persist(
    config: &RouterConfig,
    classifier: &MlpClassifier,
    encoder: &LabelEncoder,
) -> Result<(), RouterError> {
    if let Some(parent) = config.classifier_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| RouterError::persistence(parent, e))?;
        }
    }
    write_artifact(&config.classifier_path, &classifier.to_json()?)?;
    write_artifact(&config.encoder_path, &encoder.to_json()?)?;
    info!(
        classifier = %config.classifier_path.display(),
        encoder = %config.encoder_path.display(),
        "artifacts persisted"
    );
    Ok(())
}

fn write_artifact(path: &Path, json: &str) -> Result<(), RouterError> {
    std::fs::write(path, json).map_err(|e| RouterError::persistence(path, e))
}
