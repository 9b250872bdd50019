//! Classifier implementations for routing decisions.

pub mod mlp;

pub use mlp::{LayerDef, MlpClassifier, MlpModelData, MlpTrainOptions};
