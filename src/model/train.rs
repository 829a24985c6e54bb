//! Training loop.
//!
//! Deliberately minimal: a fixed number of epochs of plain gradient descent
//! on a subset of parameters, with no validation or convergence check.

use serde::{Deserialize, Serialize};

use super::TextModel;
use crate::config::TrainingConfig;
use crate::error::{Error, Result};

/// Outcome of a training run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Epochs run.
    pub epochs: usize,
    /// Mean per-position loss of each epoch's forward pass.
    pub losses: Vec<f32>,
}

impl TrainingReport {
    /// Loss of the last epoch, if any ran.
    pub fn final_loss(&self) -> Option<f32> {
        self.losses.last().copied()
    }
}

/// Next-symbol targets: each input predicts its successor, the last wraps
/// around to the first.
pub fn shifted_targets(ids: &[u32]) -> Vec<u32> {
    let mut targets = Vec::with_capacity(ids.len());
    targets.extend_from_slice(ids.get(1..).unwrap_or_default());
    if let Some(&first) = ids.first() {
        targets.push(first);
    }
    targets
}

/// Trains `model` on the id sequence `ids`.
pub fn train(
    model: &mut TextModel,
    ids: &[u32],
    config: &TrainingConfig,
) -> Result<TrainingReport> {
    if ids.is_empty() {
        return Err(Error::EmptyCorpus);
    }
    let targets = shifted_targets(ids);
    let positions = ids.len() as f32;

    tracing::info!(
        architecture = model.architecture().as_str(),
        positions = ids.len(),
        epochs = config.epochs,
        learning_rate = config.learning_rate,
        "Training started"
    );

    let mut report = TrainingReport::default();
    for epoch in 0..config.epochs {
        let loss = model.train_epoch(ids, &targets, config.learning_rate)? / positions;
        tracing::debug!(epoch, loss, "Epoch finished");
        report.losses.push(loss);
        report.epochs += 1;
    }

    tracing::info!(
        epochs = report.epochs,
        final_loss = report.final_loss(),
        "Training completed"
    );
    Ok(report)
}
