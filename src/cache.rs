//! Process-wide cache for loaded models, to avoid redundant loads.
//!
//! One instance is constructed at process start and passed explicitly
//! to every call that needs cached models. Each slot is populated at
//! most once (lazily, or directly after training) and is immutable
//! until `clear`. First-time population holds the slot lock across the
//! expensive load, so concurrent first calls wait and reuse the result
//! instead of loading twice.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::classifiers::MlpClassifier;
use crate::embedding::{BertEmbedder, SharedEmbedder};
use crate::error::RouterError;
use crate::labels::LabelEncoder;

#[derive(Default)]
pub struct ModelCache {
    embedder: Mutex<Option<SharedEmbedder>>,
    classifier: Mutex<Option<Arc<MlpClassifier>>>,
    encoder: Mutex<Option<Arc<LabelEncoder>>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached embedding model, constructing it from the
    /// identifier on first call. Construction loads model weights and
    /// happens at most once per process.
    pub fn get_embedding_model(&self, model_id: &str) -> Result<SharedEmbedder, RouterError> {
        let mut slot = self.embedder.lock();
        if let Some(embedder) = slot.as_ref() {
            return Ok(Arc::clone(embedder));
        }
        info!(model = model_id, "loading embedding model");
        let embedder: SharedEmbedder = Arc::new(BertEmbedder::load(model_id, false)?);
        *slot = Some(Arc::clone(&embedder));
        Ok(embedder)
    }

    /// Installs an embedding backend directly, bypassing construction
    /// from an identifier. This is the injection point for alternative
    /// `Embedder` implementations.
    pub fn set_embedding_model(&self, embedder: SharedEmbedder) {
        *self.embedder.lock() = Some(embedder);
    }

    /// Returns the cached classifier, deserializing it from `path` on
    /// first call if the artifact exists. A missing artifact is a
    /// normal state, reported as `None`.
    pub fn get_classifier(&self, path: &Path) -> Result<Option<Arc<MlpClassifier>>, RouterError> {
        let mut slot = self.classifier.lock();
        if slot.is_none() && path.exists() {
            info!(path = %path.display(), "loading classifier");
            let json =
                std::fs::read_to_string(path).map_err(|e| RouterError::persistence(path, e))?;
            *slot = Some(Arc::new(MlpClassifier::from_json(&json)?));
        }
        Ok(slot.clone())
    }

    /// Returns the cached label encoder, deserializing it from `path`
    /// on first call if the artifact exists.
    pub fn get_label_encoder(&self, path: &Path) -> Result<Option<Arc<LabelEncoder>>, RouterError> {
        let mut slot = self.encoder.lock();
        if slot.is_none() && path.exists() {
            info!(path = %path.display(), "loading label encoder");
            let json =
                std::fs::read_to_string(path).map_err(|e| RouterError::persistence(path, e))?;
            *slot = Some(Arc::new(LabelEncoder::from_json(&json)?));
        }
        Ok(slot.clone())
    }

    /// Installs a freshly trained classifier, skipping the disk
    /// round-trip.
    pub fn set_classifier(&self, classifier: MlpClassifier) {
        *self.classifier.lock() = Some(Arc::new(classifier));
    }

    /// Installs a freshly trained label encoder.
    pub fn set_label_encoder(&self, encoder: LabelEncoder) {
        *self.encoder.lock() = Some(Arc::new(encoder));
    }

    /// Drops all cached models. Used for process reset and test
    /// teardown.
    pub fn clear(&self) {
        *self.embedder.lock() = None;
        *self.classifier.lock() = None;
        *self.encoder.lock() = None;
    }
}
