//! # Prompt Router
//!
//! Routes a free-text prompt to the best downstream model by embedding
//! the prompt with a sentence-embedding model and classifying the
//! embedding with a trained MLP:
//! - Embeddings via Candle BERT (Hugging Face hub or local directory)
//! - MLP classifier trained in-process, persisted as a JSON artifact
//!   together with its label encoder
//! - Lazy process-wide model cache and an mtime-based retraining
//!   policy evaluated at startup

pub mod artifacts;
pub mod cache;
pub mod classifiers;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod labels;
pub mod predictor;
pub mod router;
pub mod training;
pub mod validation;

#[cfg(test)]
pub mod test_fixtures;

#[cfg(test)]
mod router_test;

pub use artifacts::{ArtifactStore, ModelFreshness};
pub use cache::ModelCache;
pub use classifiers::{MlpClassifier, MlpTrainOptions};
pub use config::RouterConfig;
pub use corpus::{TrainingCorpus, TrainingExample};
pub use embedding::{BertEmbedder, Embedder, SharedEmbedder};
pub use error::RouterError;
pub use labels::LabelEncoder;
pub use predictor::{predict, PredictionResult};
pub use router::PromptRouter;
pub use training::{should_retrain, train, TrainOutcome};
pub use validation::{validate_prompt, ImproveOutcome, PromptImprover, MAX_PROMPT_CHARS};
