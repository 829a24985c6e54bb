//! Recurrent next-symbol model.
//!
//! One step of the Elman recurrence:
//!
//! ```text
//! h'     = tanh(W_xh · one_hot(x) + W_hh · h + b_h)
//! logits = W_hy · h' + b_y
//! p      = softmax(logits)
//! ```
//!
//! `W_xh · one_hot(x)` is just column `x` of `W_xh`, so the step narrows
//! that column instead of building the indicator vector.

use candle_core::{DType, Device, Tensor};

use super::ops::{self, softmax};
use crate::error::Result;

/// Elman recurrent network over a symbol vocabulary.
#[derive(Debug, Clone)]
pub struct RecurrentNet {
    /// Input-to-hidden weights [hidden_size, vocab_size].
    w_xh: Tensor,
    /// Hidden-to-hidden weights [hidden_size, hidden_size].
    w_hh: Tensor,
    /// Hidden-to-output weights [vocab_size, hidden_size].
    w_hy: Tensor,
    /// Hidden bias [hidden_size].
    b_h: Tensor,
    /// Output bias [vocab_size].
    b_y: Tensor,
    vocab_size: usize,
    hidden_size: usize,
}

impl RecurrentNet {
    /// Creates a network with uniform random weights and zero biases.
    pub fn new_random(
        vocab_size: usize,
        hidden_size: usize,
        init_scale: f32,
        device: &Device,
    ) -> Result<Self> {
        Ok(Self {
            w_xh: ops::uniform(init_scale, (hidden_size, vocab_size), device)?,
            w_hh: ops::uniform(init_scale, (hidden_size, hidden_size), device)?,
            w_hy: ops::uniform(init_scale, (vocab_size, hidden_size), device)?,
            b_h: Tensor::zeros(hidden_size, DType::F32, device)?,
            b_y: Tensor::zeros(vocab_size, DType::F32, device)?,
            vocab_size,
            hidden_size,
        })
    }

    /// Creates a network from already shape-checked tensors.
    pub(crate) fn from_parts(
        w_xh: Tensor,
        w_hh: Tensor,
        w_hy: Tensor,
        b_h: Tensor,
        b_y: Tensor,
    ) -> Result<Self> {
        let (hidden_size, vocab_size) = w_xh.dims2()?;
        Ok(Self {
            w_xh,
            w_hh,
            w_hy,
            b_h,
            b_y,
            vocab_size,
            hidden_size,
        })
    }

    /// Returns the vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Returns the hidden size.
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Named parameter tensors in persistence order.
    pub fn named_tensors(&self) -> Vec<(&'static str, &Tensor)> {
        vec![
            ("w_xh", &self.w_xh),
            ("w_hh", &self.w_hh),
            ("w_hy", &self.w_hy),
            ("b_h", &self.b_h),
            ("b_y", &self.b_y),
        ]
    }

    /// Zero hidden state [hidden_size].
    pub fn zero_hidden(&self) -> Result<Tensor> {
        Ok(Tensor::zeros(self.hidden_size, DType::F32, self.w_hh.device())?)
    }

    /// One recurrence step.
    ///
    /// # Arguments
    ///
    /// * `input_id` - Current symbol id (must be `< vocab_size`)
    /// * `hidden` - Previous hidden state [hidden_size]
    ///
    /// # Returns
    ///
    /// `(probs [vocab_size], next_hidden [hidden_size])`
    pub fn step(&self, input_id: u32, hidden: &Tensor) -> Result<(Tensor, Tensor)> {
        let x = self.w_xh.narrow(1, input_id as usize, 1)?.squeeze(1)?;
        let recurrent = self.w_hh.matmul(&hidden.unsqueeze(1)?)?.squeeze(1)?;
        let next_hidden = x.add(&recurrent)?.add(&self.b_h)?.tanh()?;

        let logits = self
            .w_hy
            .matmul(&next_hidden.unsqueeze(1)?)?
            .squeeze(1)?
            .add(&self.b_y)?;
        Ok((softmax(&logits)?, next_hidden))
    }

    /// Runs the recurrence over a whole id sequence from a zero hidden state.
    ///
    /// # Returns
    ///
    /// `(probs [T, vocab_size], hiddens [T, hidden_size])`
    pub fn forward_sequence(&self, ids: &[u32]) -> Result<(Tensor, Tensor)> {
        let device = self.w_xh.device();
        let index = Tensor::from_vec(ids.to_vec(), ids.len(), device)?;
        // Row t holds column ids[t] of W_xh.
        let inputs = self.w_xh.t()?.contiguous()?.index_select(&index, 0)?;

        let mut hidden = self.zero_hidden()?;
        let mut hiddens = Vec::with_capacity(ids.len());
        for t in 0..ids.len() {
            let recurrent = self.w_hh.matmul(&hidden.unsqueeze(1)?)?.squeeze(1)?;
            hidden = inputs.get(t)?.add(&recurrent)?.add(&self.b_h)?.tanh()?;
            hiddens.push(hidden.clone());
        }

        let hiddens = Tensor::stack(&hiddens, 0)?;
        let logits = hiddens
            .matmul(&self.w_hy.t()?.contiguous()?)?
            .broadcast_add(&self.b_y)?;
        Ok((softmax(&logits)?, hiddens))
    }

    /// One epoch of the output-projection-only update.
    ///
    /// A single forward pass over `inputs` provides every `p_t` and `h_t`;
    /// the accumulated gradient is then applied once:
    ///
    /// ```text
    /// dy_t  = p_t - one_hot(target_t)
    /// W_hy -= lr * Σ_t dy_t ⊗ h_t
    /// b_y  -= lr * Σ_t dy_t
    /// ```
    ///
    /// `W_xh`, `W_hh` and `b_h` keep their initial values.
    ///
    /// Returns the summed cross-entropy loss of the forward pass.
    pub fn train_epoch(
        &mut self,
        inputs: &[u32],
        targets: &[u32],
        learning_rate: f32,
    ) -> Result<f32> {
        let (probs, hiddens) = self.forward_sequence(inputs)?;
        let loss = ops::cross_entropy_sum(&probs, targets)?;

        let expected = ops::one_hot_rows(targets, self.vocab_size, probs.device())?;
        let dy = probs.sub(&expected)?;

        let lr = learning_rate as f64;
        let grad_w_hy = dy.t()?.contiguous()?.matmul(&hiddens)?;
        let grad_b_y = dy.sum(0)?;
        self.w_hy = self.w_hy.sub(&grad_w_hy.affine(lr, 0.0)?)?;
        self.b_y = self.b_y.sub(&grad_b_y.affine(lr, 0.0)?)?;

        Ok(loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_device() -> Device {
        Device::Cpu
    }

    #[test]
    fn test_step_shapes() {
        let device = test_device();
        let net = RecurrentNet::new_random(6, 4, 0.1, &device).unwrap();
        let hidden = net.zero_hidden().unwrap();

        let (probs, next) = net.step(2, &hidden).unwrap();
        assert_eq!(probs.dims(), &[6]);
        assert_eq!(next.dims(), &[4]);
    }

    #[test]
    fn test_step_matches_sequence_forward() {
        let device = test_device();
        let net = RecurrentNet::new_random(5, 3, 0.5, &device).unwrap();
        let ids = [1u32, 4, 0];

        let mut hidden = net.zero_hidden().unwrap();
        let mut last = None;
        for &id in &ids {
            let (probs, next) = net.step(id, &hidden).unwrap();
            hidden = next;
            last = Some(probs);
        }
        let stepped: Vec<f32> = last.unwrap().to_vec1().unwrap();

        let (probs, hiddens) = net.forward_sequence(&ids).unwrap();
        assert_eq!(hiddens.dims(), &[3, 3]);
        let batched: Vec<f32> = probs.get(2).unwrap().to_vec1().unwrap();

        for (a, b) in stepped.iter().zip(batched.iter()) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn test_hidden_is_bounded_by_tanh() {
        let device = test_device();
        let net = RecurrentNet::new_random(4, 8, 10.0, &device).unwrap();
        let (_, hidden) = net.step(0, &net.zero_hidden().unwrap()).unwrap();
        let values: Vec<f32> = hidden.to_vec1().unwrap();
        assert!(values.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_train_epoch_only_touches_output_projection() {
        let device = test_device();
        let mut net = RecurrentNet::new_random(3, 4, 0.1, &device).unwrap();
        let w_xh_before: Vec<Vec<f32>> = net.w_xh.to_vec2().unwrap();
        let w_hh_before: Vec<Vec<f32>> = net.w_hh.to_vec2().unwrap();
        let w_hy_before: Vec<Vec<f32>> = net.w_hy.to_vec2().unwrap();

        net.train_epoch(&[0, 1, 2], &[1, 2, 0], 0.1).unwrap();

        assert_eq!(net.w_xh.to_vec2::<f32>().unwrap(), w_xh_before);
        assert_eq!(net.w_hh.to_vec2::<f32>().unwrap(), w_hh_before);
        assert_ne!(net.w_hy.to_vec2::<f32>().unwrap(), w_hy_before);
    }

    #[test]
    fn test_training_reduces_loss() {
        let device = test_device();
        let mut net = RecurrentNet::new_random(2, 8, 0.5, &device).unwrap();
        let inputs = [0u32, 1, 0, 1, 0, 1];
        let targets = [1u32, 0, 1, 0, 1, 0];

        let first = net.train_epoch(&inputs, &targets, 0.1).unwrap();
        let mut last = first;
        for _ in 0..30 {
            last = net.train_epoch(&inputs, &targets, 0.1).unwrap();
        }
        assert!(last < first, "loss did not drop: {first} -> {last}");
    }
}
