//! Candle BERT sentence embedder.
//!
//! Loads a sentence-transformers style BERT checkpoint from a local
//! directory or through the Hugging Face hub, then produces one vector
//! per prompt via masked mean pooling over the last hidden state
//! followed by L2 normalization.

use std::path::{Path, PathBuf};

use anyhow::{Context, Error as E, Result};
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, DTYPE};
use hf_hub::{api::sync::Api, Repo, RepoType};
use tokenizers::Tokenizer;
use tracing::info;

use super::Embedder;

const MAX_SEQUENCE_LENGTH: usize = 512;

pub struct BertEmbedder {
    bert: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    hidden_size: usize,
}

impl BertEmbedder {
    /// Loads the embedding model. Expensive: reads the full weight
    /// file, so callers are expected to construct at most one per
    /// process and share it.
    pub fn load(model_id: &str, use_cpu: bool) -> Result<Self> {
        let device = if use_cpu {
            Device::Cpu
        } else {
            Device::cuda_if_available(0)?
        };

        let (config_path, tokenizer_path, weights_path) = Self::resolve_files(model_id)?;

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config: Config = serde_json::from_str(&config_str)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(E::msg)?;

        let use_pth = weights_path.extension().and_then(|s| s.to_str()) == Some("bin");
        let vb = if use_pth {
            VarBuilder::from_pth(&weights_path, DTYPE, &device)?
        } else {
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DTYPE, &device)? }
        };

        let hidden_size = config.hidden_size;
        let bert = BertModel::load(vb, &config)?;
        info!(model = model_id, hidden_size, "embedding model loaded");

        Ok(Self {
            bert,
            tokenizer,
            device,
            hidden_size,
        })
    }

    /// Resolves config/tokenizer/weights either from a local model
    /// directory or from the hub by model id.
    fn resolve_files(model_id: &str) -> Result<(PathBuf, PathBuf, PathBuf)> {
        let dir = Path::new(model_id);
        if dir.is_dir() {
            let weights = if dir.join("model.safetensors").exists() {
                dir.join("model.safetensors")
            } else if dir.join("pytorch_model.bin").exists() {
                dir.join("pytorch_model.bin")
            } else {
                return Err(E::msg(format!(
                    "no model weights found in {}",
                    dir.display()
                )));
            };
            return Ok((dir.join("config.json"), dir.join("tokenizer.json"), weights));
        }

        let api = Api::new()?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));
        Ok((
            repo.get("config.json")?,
            repo.get("tokenizer.json")?,
            repo.get("model.safetensors")?,
        ))
    }

    /// Pads the batch to its longest sequence, capped at the model's
    /// maximum length.
    fn batch_tensors(
        &self,
        encodings: &[tokenizers::Encoding],
    ) -> Result<(Tensor, Tensor)> {
        let max_len = encodings
            .iter()
            .map(|e| e.len().min(MAX_SEQUENCE_LENGTH))
            .max()
            .unwrap_or(0);

        let mut input_ids = vec![vec![0u32; max_len]; encodings.len()];
        let mut attention_mask = vec![vec![0u32; max_len]; encodings.len()];
        for (row, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let len = ids.len().min(max_len);
            input_ids[row][..len].copy_from_slice(&ids[..len]);
            attention_mask[row][..len].copy_from_slice(&mask[..len]);
        }

        let input_ids = Tensor::new(input_ids, &self.device)?;
        let attention_mask = Tensor::new(attention_mask, &self.device)?;
        Ok((input_ids, attention_mask))
    }
}

impl Embedder for BertEmbedder {
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(E::msg)?;
        let (input_ids, attention_mask) = self.batch_tensors(&encodings)?;
        let token_type_ids = input_ids.zeros_like()?;

        let hidden = self
            .bert
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        // Masked mean pooling: average real tokens only, then L2
        // normalize (sentence-transformers semantics).
        let mask = attention_mask.to_dtype(DTYPE)?.unsqueeze(2)?;
        let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?.clamp(1e-9, f64::INFINITY)?;
        let mean = summed.broadcast_div(&counts)?;
        let norms = mean.sqr()?.sum_keepdim(1)?.sqrt()?;
        let normalized = mean.broadcast_div(&norms)?;

        Ok(normalized.to_vec2::<f32>()?)
    }

    fn dimension(&self) -> usize {
        self.hidden_size
    }
}
