//! Deterministic embedding backend for tests, injected through the
//! `Embedder` seam so no model files are needed.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use anyhow::Result;

use crate::embedding::Embedder;

pub const TEST_EMBEDDING_DIM: usize = 64;

/// Hashed bag-of-words embedding: each lowercased token increments one
/// bucket, then the vector is L2 normalized. `DefaultHasher::new()`
/// uses fixed keys, so the output is stable across runs.
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self {
            dim: TEST_EMBEDDING_DIM,
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dim];
        for token in text.to_lowercase().split_whitespace() {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            vector[(hasher.finish() as usize) % self.dim] += 1.0;
        }
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for HashEmbedder {
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_embedder_is_deterministic_and_normalized() {
        let embedder = HashEmbedder::new();
        let a = embedder.encode("hi there").unwrap();
        let b = embedder.encode("hi there").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), embedder.dimension());
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_shared_tokens_increase_similarity() {
        let embedder = HashEmbedder::new();
        let greeting = embedder.encode("hi hello").unwrap();
        let similar = embedder.encode("hi there").unwrap();
        let distant = embedder.encode("explain quantum mechanics").unwrap();

        let dot = |a: &[f32], b: &[f32]| -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() };
        assert!(dot(&greeting, &similar) > dot(&greeting, &distant));
    }
}
