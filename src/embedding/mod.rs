//! Sentence-embedding seam.
//!
//! The trainer and predictor only ever see this trait, so the concrete
//! embedding backend stays swappable (and injectable in tests).

pub mod bert;

pub use bert::BertEmbedder;

use std::sync::Arc;

use anyhow::Result;

/// Narrow interface over the embedding backend.
pub trait Embedder: Send + Sync {
    /// Embeds a batch of prompts; one fixed-length vector per prompt,
    /// in input order.
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Embedding dimensionality, constant for the process lifetime.
    fn dimension(&self) -> usize;

    /// Embeds a single prompt.
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.encode_batch(&[text])?;
        vectors
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector"))
    }
}

pub type SharedEmbedder = Arc<dyn Embedder>;
