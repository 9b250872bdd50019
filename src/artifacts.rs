//! Filesystem inspection for trained artifacts and the retraining
//! policy.
//!
//! The policy is conservative: it looks at existence and modification
//! times only, never at artifact content. A corpus edit that does not
//! change its mtime will not trigger retraining.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::info;

use crate::config::RouterConfig;
use crate::error::RouterError;

/// Whether persisted artifacts may be reused or must be rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFreshness {
    /// Artifacts are missing or older than the training corpus.
    Stale,
    /// Artifacts exist and are at least as new as the corpus.
    Fresh,
}

/// Locations of the trained artifacts and the corpus that produced
/// them. Pure filesystem inspection, no side effects.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    classifier_path: PathBuf,
    encoder_path: PathBuf,
    corpus_path: PathBuf,
}

impl ArtifactStore {
    pub fn new(classifier_path: PathBuf, encoder_path: PathBuf, corpus_path: PathBuf) -> Self {
        Self {
            classifier_path,
            encoder_path,
            corpus_path,
        }
    }

    pub fn from_config(config: &RouterConfig) -> Self {
        Self::new(
            config.classifier_path.clone(),
            config.encoder_path.clone(),
            config.training_data_path.clone(),
        )
    }

    /// True when both model artifacts exist on disk.
    pub fn models_exist(&self) -> bool {
        self.classifier_path.exists() && self.encoder_path.exists()
    }

    /// True when the corpus file was modified strictly after the
    /// persisted classifier. Missing files are a normal state.
    pub fn corpus_newer_than_classifier(&self) -> Result<bool, RouterError> {
        let (Some(corpus), Some(classifier)) = (
            mtime(&self.corpus_path)?,
            mtime(&self.classifier_path)?,
        ) else {
            return Ok(false);
        };
        Ok(corpus > classifier)
    }

    /// Evaluates the retraining policy.
    pub fn freshness(&self) -> Result<ModelFreshness, RouterError> {
        if !self.models_exist() {
            info!("model artifacts not found, training required");
            return Ok(ModelFreshness::Stale);
        }
        if self.corpus_newer_than_classifier()? {
            info!("training data newer than model, retraining required");
            return Ok(ModelFreshness::Stale);
        }
        info!("reusing existing trained model");
        Ok(ModelFreshness::Fresh)
    }
}

/// Modification time, with "file missing" as a normal state. Other
/// I/O failures (e.g. permission denied) propagate.
fn mtime(path: &Path) -> Result<Option<SystemTime>, RouterError> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(Some(
            meta.modified().map_err(|e| RouterError::persistence(path, e))?,
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(RouterError::persistence(path, e)),
    }
}
