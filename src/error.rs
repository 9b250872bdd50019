//! Error taxonomy for the router core.
//!
//! Validation and not-trained conditions are expected, recoverable
//! states; persistence and unexpected errors carry full context. The
//! boundary operations (`train`, `predict`) convert every variant into
//! a structured outcome instead of propagating it to the host.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    /// Invalid caller input: empty or too-long prompt, malformed corpus.
    #[error("{0}")]
    Validation(String),

    /// Prediction requested before any classifier/encoder is available.
    #[error("models not found; train the classifier first")]
    NotTrained,

    /// I/O failure reading or writing artifacts or the training corpus.
    #[error("artifact i/o failed for {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Anything else, including faults from the ML stack.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl RouterError {
    pub(crate) fn persistence(path: &Path, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.to_path_buf(),
            source,
        }
    }
}
