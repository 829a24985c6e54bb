//! Numeric helpers shared by the model shapes.

use candle_core::{Device, Shape, Tensor, D};

use crate::error::Result;

/// Floor added to probabilities before taking the log in the loss.
pub const LOSS_EPSILON: f32 = 1e-9;

/// Numerically stable softmax over the last dimension.
///
/// The maximum logit is subtracted before exponentiating, so any finite
/// input yields a valid distribution.
pub fn softmax(logits: &Tensor) -> Result<Tensor> {
    Ok(candle_nn::ops::softmax(logits, D::Minus1)?)
}

/// Tensor with every entry drawn independently from `U[-scale, scale)`.
pub fn uniform<S: Into<Shape>>(scale: f32, shape: S, device: &Device) -> Result<Tensor> {
    Ok(Tensor::rand(-scale, scale, shape, device)?)
}

/// `[ids.len(), depth]` matrix with a single 1.0 per row at column `ids[row]`.
///
/// Only used on the training path; inference selects weight columns directly.
pub fn one_hot_rows(ids: &[u32], depth: usize, device: &Device) -> Result<Tensor> {
    let mut data = vec![0.0f32; ids.len() * depth];
    for (row, &id) in ids.iter().enumerate() {
        data[row * depth + id as usize] = 1.0;
    }
    Ok(Tensor::from_vec(data, (ids.len(), depth), device)?)
}

/// Sum over positions of `-ln(p[t, target_t] + eps)`.
pub fn cross_entropy_sum(probs: &Tensor, targets: &[u32]) -> Result<f32> {
    let device = probs.device();
    let index = Tensor::from_vec(targets.to_vec(), (targets.len(), 1), device)?;
    let picked = probs.contiguous()?.gather(&index, 1)?;
    let loss = picked
        .affine(1.0, LOSS_EPSILON as f64)?
        .log()?
        .neg()?
        .sum_all()?
        .to_scalar::<f32>()?;
    Ok(loss)
}
