//! Direct (bag) next-symbol model.
//!
//! Each output class `k` has one learned scalar per input id:
//! `logits[k] = weight[k][input] + bias[k]`. This is a per-symbol
//! logistic model with no hidden state.

use candle_core::{DType, Device, Tensor};

use super::ops::{self, softmax};
use crate::error::Result;

/// Per-input logistic model over a symbol vocabulary.
#[derive(Debug, Clone)]
pub struct DirectModel {
    /// Class-by-input logits [vocab_size, vocab_size].
    weight: Tensor,
    /// Output bias [vocab_size].
    bias: Tensor,
    vocab_size: usize,
}

impl DirectModel {
    /// Creates a model with uniform random weights and zero bias.
    pub fn new_random(vocab_size: usize, init_scale: f32, device: &Device) -> Result<Self> {
        Ok(Self {
            weight: ops::uniform(init_scale, (vocab_size, vocab_size), device)?,
            bias: Tensor::zeros(vocab_size, DType::F32, device)?,
            vocab_size,
        })
    }

    pub(crate) fn from_parts(weight: Tensor, bias: Tensor) -> Result<Self> {
        let vocab_size = bias.dim(0)?;
        Ok(Self {
            weight,
            bias,
            vocab_size,
        })
    }

    /// Returns the vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Named parameter tensors in persistence order.
    pub fn named_tensors(&self) -> Vec<(&'static str, &Tensor)> {
        vec![("weight", &self.weight), ("bias", &self.bias)]
    }

    /// Next-symbol distribution [vocab_size] for one input id.
    pub fn forward(&self, input_id: u32) -> Result<Tensor> {
        let logits = self
            .weight
            .narrow(1, input_id as usize, 1)?
            .squeeze(1)?
            .add(&self.bias)?;
        softmax(&logits)
    }

    /// Distributions [T, vocab_size] for every input position.
    pub fn forward_batch(&self, ids: &[u32]) -> Result<Tensor> {
        let index = Tensor::from_vec(ids.to_vec(), ids.len(), self.weight.device())?;
        let logits = self
            .weight
            .t()?
            .contiguous()?
            .index_select(&index, 0)?
            .broadcast_add(&self.bias)?;
        softmax(&logits)
    }

    /// One epoch of the selected-column update.
    ///
    /// Only columns of input ids present in `inputs` change:
    ///
    /// ```text
    /// dy_t        = p_t - one_hot(target_t)
    /// weight[:,j] -= lr * Σ_{t: x_t = j} dy_t
    /// bias        -= lr * Σ_t dy_t
    /// ```
    ///
    /// Returns the summed cross-entropy loss of the forward pass.
    pub fn train_epoch(
        &mut self,
        inputs: &[u32],
        targets: &[u32],
        learning_rate: f32,
    ) -> Result<f32> {
        let probs = self.forward_batch(inputs)?;
        let loss = ops::cross_entropy_sum(&probs, targets)?;

        let device = probs.device();
        let dy = probs.sub(&ops::one_hot_rows(targets, self.vocab_size, device)?)?;
        let selected = ops::one_hot_rows(inputs, self.vocab_size, device)?;

        let lr = learning_rate as f64;
        let grad_weight = dy.t()?.contiguous()?.matmul(&selected)?;
        let grad_bias = dy.sum(0)?;
        self.weight = self.weight.sub(&grad_weight.affine(lr, 0.0)?)?;
        self.bias = self.bias.sub(&grad_bias.affine(lr, 0.0)?)?;

        Ok(loss)
    }
}
