//! Central configuration for the router (env + defaults).
//!
//! The core only reads this; it never mutates or persists it. Artifact
//! paths derive from the model directory unless overridden.

use std::env;
use std::path::PathBuf;

const DEFAULT_CLASSIFIER_FILE: &str = "mlp_classifier.json";
const DEFAULT_ENCODER_FILE: &str = "label_encoder.json";

#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub model_dir: PathBuf,
    pub classifier_path: PathBuf,
    pub encoder_path: PathBuf,
    pub training_data_path: PathBuf,
    /// Sentence-embedding model: a Hugging Face model id or a local
    /// directory holding config/tokenizer/weights.
    pub embedding_model: String,
    pub mlp_hidden_layers: Vec<usize>,
    pub mlp_max_iter: usize,
    pub mlp_random_state: u64,
    pub confidence_threshold: f32,
    pub top_n_predictions: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        let model_dir = PathBuf::from("models");
        Self {
            classifier_path: model_dir.join(DEFAULT_CLASSIFIER_FILE),
            encoder_path: model_dir.join(DEFAULT_ENCODER_FILE),
            model_dir,
            training_data_path: PathBuf::from("training_data.json"),
            embedding_model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            mlp_hidden_layers: vec![100, 50],
            mlp_max_iter: 500,
            mlp_random_state: 42,
            confidence_threshold: 0.5,
            top_n_predictions: 3,
        }
    }
}

impl RouterConfig {
    /// Builds a configuration from environment variables, falling back
    /// to the defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = env::var("MODEL_DIR") {
            config = config.with_model_dir(PathBuf::from(dir));
        }
        if let Ok(path) = env::var("CLASSIFIER_PATH") {
            config.classifier_path = PathBuf::from(path);
        }
        if let Ok(path) = env::var("ENCODER_PATH") {
            config.encoder_path = PathBuf::from(path);
        }
        if let Ok(path) = env::var("TRAINING_DATA_PATH") {
            config.training_data_path = PathBuf::from(path);
        }
        if let Ok(model) = env::var("EMBEDDING_MODEL") {
            config.embedding_model = model;
        }
        if let Ok(raw) = env::var("MLP_HIDDEN_LAYERS") {
            let layers = parse_hidden_layers(&raw);
            if !layers.is_empty() {
                config.mlp_hidden_layers = layers;
            }
        }
        if let Ok(v) = env::var("MLP_MAX_ITER") {
            if let Ok(n) = v.parse() {
                config.mlp_max_iter = n;
            }
        }
        if let Ok(v) = env::var("MLP_RANDOM_STATE") {
            if let Ok(n) = v.parse() {
                config.mlp_random_state = n;
            }
        }
        if let Ok(v) = env::var("CONFIDENCE_THRESHOLD") {
            if let Ok(t) = v.parse() {
                config.confidence_threshold = t;
            }
        }
        if let Ok(v) = env::var("TOP_N_PREDICTIONS") {
            if let Ok(n) = v.parse() {
                config.top_n_predictions = n;
            }
        }
        config
    }

    /// Moves the model directory and re-derives the artifact paths.
    pub fn with_model_dir(mut self, model_dir: PathBuf) -> Self {
        self.classifier_path = model_dir.join(DEFAULT_CLASSIFIER_FILE);
        self.encoder_path = model_dir.join(DEFAULT_ENCODER_FILE);
        self.model_dir = model_dir;
        self
    }
}

/// Parses a comma-separated width list, e.g. `"100,50"`.
fn parse_hidden_layers(raw: &str) -> Vec<usize> {
    raw.split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect()
}
