//! MLP (Multi-Layer Perceptron) routing classifier.
//!
//! A feed-forward stack of linear layers with ReLU between them,
//! trained in-process against (embedding, label-index) pairs and
//! compiled to tensors for inference.
//!
//! ## Artifact format
//! Models persist as JSON with the following structure:
//! - `layers`: list of layer definitions (linear, relu)
//! - `feature_dim`: input embedding dimension
//! - `n_classes`: output label count
//! - `hidden_layers`: hidden layer widths used at fit time

use anyhow::{Context, Result};
use candle_core::{D, Device, Tensor, Var};
use candle_nn::{loss, AdamW, Linear, Module, Optimizer, ParamsAdamW};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const LEARNING_RATE: f64 = 1e-2;

/// MLP layer definition in the JSON artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LayerDef {
    #[serde(rename = "linear")]
    Linear {
        in_features: usize,
        out_features: usize,
        weight: Vec<Vec<f32>>,
        bias: Vec<f32>,
    },
    #[serde(rename = "relu")]
    Relu,
}

/// Serialized MLP model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpModelData {
    pub algorithm: String,
    pub feature_dim: usize,
    pub n_classes: usize,
    pub hidden_layers: Vec<usize>,
    pub layers: Vec<LayerDef>,
}

/// Fit-time knobs. The fixed seed makes retraining reproducible.
#[derive(Debug, Clone)]
pub struct MlpTrainOptions {
    pub hidden_layers: Vec<usize>,
    pub max_iter: usize,
    pub seed: u64,
}

/// Compiled layer for inference.
enum CompiledLayer {
    Linear(Tensor, Tensor), // (weight, bias)
    Relu,
}

/// Trained routing classifier. Immutable after fit.
pub struct MlpClassifier {
    layers: Vec<CompiledLayer>,
    feature_dim: usize,
    n_classes: usize,
    hidden_layers: Vec<usize>,
    device: Device,
}

impl MlpClassifier {
    /// Fits the classifier against one embedding per target index.
    /// Full-batch AdamW over cross-entropy for `max_iter` steps.
    pub fn fit(
        embeddings: &[Vec<f32>],
        targets: &[u32],
        n_classes: usize,
        options: &MlpTrainOptions,
    ) -> Result<Self> {
        anyhow::ensure!(!embeddings.is_empty(), "no embeddings to fit on");
        anyhow::ensure!(
            embeddings.len() == targets.len(),
            "embedding/target count mismatch: {} vs {}",
            embeddings.len(),
            targets.len()
        );
        anyhow::ensure!(n_classes >= 1, "need at least one class");
        let feature_dim = embeddings[0].len();
        anyhow::ensure!(feature_dim > 0, "embeddings are zero-dimensional");
        anyhow::ensure!(
            embeddings.iter().all(|e| e.len() == feature_dim),
            "embedding dimensionality is not uniform"
        );
        anyhow::ensure!(
            targets.iter().all(|&t| (t as usize) < n_classes),
            "target index out of range"
        );

        let device = Device::Cpu;
        // The CPU backend rejects `Device::set_seed`; reproducibility
        // comes from seeding the weight initialization instead.
        let mut rng = StdRng::seed_from_u64(options.seed);

        let mut dims = Vec::with_capacity(options.hidden_layers.len() + 2);
        dims.push(feature_dim);
        dims.extend_from_slice(&options.hidden_layers);
        dims.push(n_classes);

        let mut vars = Vec::with_capacity((dims.len() - 1) * 2);
        let mut linears = Vec::with_capacity(dims.len() - 1);
        for pair in dims.windows(2) {
            let (weight, bias) = init_linear(&mut rng, pair[0], pair[1], &device)?;
            linears.push(Linear::new(
                weight.as_tensor().clone(),
                Some(bias.as_tensor().clone()),
            ));
            vars.push(weight);
            vars.push(bias);
        }

        let flat: Vec<f32> = embeddings.iter().flatten().copied().collect();
        let x = Tensor::from_vec(flat, (embeddings.len(), feature_dim), &device)?;
        let y = Tensor::from_vec(targets.to_vec(), targets.len(), &device)?;

        let params = ParamsAdamW {
            lr: LEARNING_RATE,
            ..Default::default()
        };
        let mut optimizer = AdamW::new(vars, params)?;
        for _ in 0..options.max_iter {
            let logits = forward_linears(&linears, &x)?;
            let loss = loss::cross_entropy(&logits, &y)?;
            optimizer.backward_step(&loss)?;
        }

        let mut layers = Vec::with_capacity(linears.len() * 2 - 1);
        for (i, lin) in linears.iter().enumerate() {
            let weight = lin.weight().detach();
            let bias = lin
                .bias()
                .context("linear layer missing bias")?
                .detach();
            layers.push(CompiledLayer::Linear(weight, bias));
            if i + 1 < linears.len() {
                layers.push(CompiledLayer::Relu);
            }
        }

        Ok(Self {
            layers,
            feature_dim,
            n_classes,
            hidden_layers: options.hidden_layers.clone(),
            device,
        })
    }

    /// Probability distribution over all label indices for one
    /// embedding. Sums to 1 up to floating-point error.
    pub fn predict_proba(&self, embedding: &[f32]) -> Result<Vec<f32>> {
        anyhow::ensure!(
            embedding.len() == self.feature_dim,
            "feature dimension mismatch: expected {}, got {}",
            self.feature_dim,
            embedding.len()
        );
        let x = Tensor::from_vec(embedding.to_vec(), (1, self.feature_dim), &self.device)?;
        let logits = self.forward(x)?;
        let probabilities = candle_nn::ops::softmax(&logits, D::Minus1)?;
        Ok(probabilities.squeeze(0)?.to_vec1::<f32>()?)
    }

    /// Predicted label index and its probability.
    pub fn predict(&self, embedding: &[f32]) -> Result<(usize, f32)> {
        let probabilities = self.predict_proba(embedding)?;
        probabilities
            .iter()
            .copied()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .ok_or_else(|| anyhow::anyhow!("empty probability distribution"))
    }

    fn forward(&self, mut x: Tensor) -> Result<Tensor> {
        for layer in &self.layers {
            x = match layer {
                CompiledLayer::Linear(weight, bias) => {
                    // x @ weight.T + bias
                    x.matmul(&weight.t()?)?.broadcast_add(bias)?
                }
                CompiledLayer::Relu => x.relu()?,
            };
        }
        Ok(x)
    }

    pub fn feature_dim(&self) -> usize {
        self.feature_dim
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Extracts the trained weights into the serializable form.
    pub fn to_model_data(&self) -> Result<MlpModelData> {
        let mut layers = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            match layer {
                CompiledLayer::Linear(weight, bias) => {
                    let (out_features, in_features) = weight.dims2()?;
                    layers.push(LayerDef::Linear {
                        in_features,
                        out_features,
                        weight: weight.to_vec2::<f32>()?,
                        bias: bias.to_vec1::<f32>()?,
                    });
                }
                CompiledLayer::Relu => layers.push(LayerDef::Relu),
            }
        }
        Ok(MlpModelData {
            algorithm: "mlp".to_string(),
            feature_dim: self.feature_dim,
            n_classes: self.n_classes,
            hidden_layers: self.hidden_layers.clone(),
            layers,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_model_data()?)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let data: MlpModelData = serde_json::from_str(json).context("MLP JSON parse error")?;
        Self::from_model_data(data, Device::Cpu)
    }

    /// Compiles serialized weights back into inference tensors.
    pub fn from_model_data(data: MlpModelData, device: Device) -> Result<Self> {
        anyhow::ensure!(
            data.algorithm == "mlp",
            "invalid algorithm: expected 'mlp', got '{}'",
            data.algorithm
        );

        let mut layers = Vec::with_capacity(data.layers.len());
        for layer_def in &data.layers {
            match layer_def {
                LayerDef::Linear {
                    in_features,
                    out_features,
                    weight,
                    bias,
                } => {
                    let flat: Vec<f32> = weight.iter().flatten().copied().collect();
                    anyhow::ensure!(
                        flat.len() == in_features * out_features,
                        "linear layer weight shape mismatch"
                    );
                    let weight = Tensor::from_vec(flat, (*out_features, *in_features), &device)?;
                    let bias = Tensor::from_vec(bias.clone(), *out_features, &device)?;
                    layers.push(CompiledLayer::Linear(weight, bias));
                }
                LayerDef::Relu => layers.push(CompiledLayer::Relu),
            }
        }

        Ok(Self {
            layers,
            feature_dim: data.feature_dim,
            n_classes: data.n_classes,
            hidden_layers: data.hidden_layers,
            device,
        })
    }
}

/// Kaiming-uniform weight and uniform bias init drawn from the caller's
/// seeded rng. The returned `Var`s back the layer tensors, so the
/// optimizer updates flow into the forward pass.
fn init_linear(
    rng: &mut StdRng,
    in_features: usize,
    out_features: usize,
    device: &Device,
) -> Result<(Var, Var)> {
    let weight_bound = (6.0 / in_features as f32).sqrt();
    let weight: Vec<f32> = (0..out_features * in_features)
        .map(|_| rng.gen_range(-weight_bound..weight_bound))
        .collect();
    let weight = Var::from_tensor(&Tensor::from_vec(
        weight,
        (out_features, in_features),
        device,
    )?)?;

    let bias_bound = 1.0 / (in_features as f32).sqrt();
    let bias: Vec<f32> = (0..out_features)
        .map(|_| rng.gen_range(-bias_bound..bias_bound))
        .collect();
    let bias = Var::from_tensor(&Tensor::from_vec(bias, out_features, device)?)?;

    Ok((weight, bias))
}

fn forward_linears(linears: &[Linear], x: &Tensor) -> Result<Tensor> {
    let mut x = x.clone();
    for (i, lin) in linears.iter().enumerate() {
        x = lin.forward(&x)?;
        if i + 1 < linears.len() {
            x = x.relu()?;
        }
    }
    Ok(x)
}
