//! Next-symbol models.
//!
//! This module contains:
//! - Numeric helpers (stable softmax, uniform init)
//! - The recurrent and direct forward shapes
//! - [`TextModel`], which dispatches between them
//! - The training rule and the JSON weight blob

pub mod blob;
pub mod direct;
pub mod ops;
pub mod recurrent;
pub mod train;

use std::collections::BTreeMap;

use candle_core::{Device, Tensor};

pub use blob::{TensorData, WeightBlob};
pub use direct::DirectModel;
pub use recurrent::RecurrentNet;
pub use train::{train, TrainingReport};

use crate::config::{Architecture, ModelConfig};
use crate::error::{Error, Result};

/// Per-sequence carried state.
///
/// Created fresh for every generation request and threaded through each
/// step, so no state leaks between requests.
#[derive(Debug, Clone)]
pub struct HiddenState {
    hidden: Option<Tensor>,
}

impl HiddenState {
    /// State for models that carry nothing between steps.
    pub fn empty() -> Self {
        Self { hidden: None }
    }

    /// The carried hidden vector, if any.
    pub fn hidden(&self) -> Option<&Tensor> {
        self.hidden.as_ref()
    }
}

/// A next-symbol model of either forward shape.
#[derive(Debug, Clone)]
pub enum TextModel {
    /// Recurrent shape.
    Recurrent(RecurrentNet),
    /// Direct/bag shape.
    Direct(DirectModel),
}

impl TextModel {
    /// Creates a randomly initialised model for `config`.
    pub fn new_random(config: &ModelConfig, device: &Device) -> Result<Self> {
        if config.vocab_size == 0 {
            return Err(Error::EmptyCorpus);
        }
        match config.architecture {
            Architecture::Recurrent => {
                if config.hidden_size == 0 {
                    return Err(Error::Config("hidden_size must be positive".into()));
                }
                Ok(Self::Recurrent(RecurrentNet::new_random(
                    config.vocab_size,
                    config.hidden_size,
                    config.init_scale,
                    device,
                )?))
            }
            Architecture::Direct => Ok(Self::Direct(DirectModel::new_random(
                config.vocab_size,
                config.init_scale,
                device,
            )?)),
        }
    }

    /// Builds a model from named tensors whose shapes were already checked
    /// against `config`.
    pub(crate) fn from_tensors(
        config: &ModelConfig,
        mut tensors: BTreeMap<&'static str, Tensor>,
    ) -> Result<Self> {
        let mut take = |name: &str| {
            tensors
                .remove(name)
                .ok_or_else(|| Error::MissingTensor(name.to_string()))
        };
        match config.architecture {
            Architecture::Recurrent => Ok(Self::Recurrent(RecurrentNet::from_parts(
                take("w_xh")?,
                take("w_hh")?,
                take("w_hy")?,
                take("b_h")?,
                take("b_y")?,
            )?)),
            Architecture::Direct => Ok(Self::Direct(DirectModel::from_parts(
                take("weight")?,
                take("bias")?,
            )?)),
        }
    }

    /// Which forward shape this is.
    pub fn architecture(&self) -> Architecture {
        match self {
            Self::Recurrent(_) => Architecture::Recurrent,
            Self::Direct(_) => Architecture::Direct,
        }
    }

    /// Returns the vocabulary size.
    pub fn vocab_size(&self) -> usize {
        match self {
            Self::Recurrent(net) => net.vocab_size(),
            Self::Direct(model) => model.vocab_size(),
        }
    }

    /// Named parameter tensors in persistence order.
    pub fn named_tensors(&self) -> Vec<(&'static str, &Tensor)> {
        match self {
            Self::Recurrent(net) => net.named_tensors(),
            Self::Direct(model) => model.named_tensors(),
        }
    }

    /// Fresh state for a new sequence (zero hidden vector for the recurrent
    /// shape, empty for the direct shape).
    pub fn initial_state(&self) -> Result<HiddenState> {
        match self {
            Self::Recurrent(net) => Ok(HiddenState {
                hidden: Some(net.zero_hidden()?),
            }),
            Self::Direct(_) => Ok(HiddenState::empty()),
        }
    }

    /// Next-symbol distribution [vocab_size] after consuming `input_id`.
    ///
    /// Advances `state` in place for the recurrent shape.
    pub fn forward(&self, input_id: u32, state: &mut HiddenState) -> Result<Tensor> {
        if input_id as usize >= self.vocab_size() {
            return Err(Error::Config(format!(
                "input id {input_id} outside vocabulary of {}",
                self.vocab_size()
            )));
        }
        match self {
            Self::Recurrent(net) => {
                let hidden = match state.hidden.take() {
                    Some(hidden) => hidden,
                    None => net.zero_hidden()?,
                };
                let (probs, next) = net.step(input_id, &hidden)?;
                state.hidden = Some(next);
                Ok(probs)
            }
            Self::Direct(model) => model.forward(input_id),
        }
    }

    /// One training epoch with the shape's update rule; returns the summed loss.
    pub fn train_epoch(
        &mut self,
        inputs: &[u32],
        targets: &[u32],
        learning_rate: f32,
    ) -> Result<f32> {
        match self {
            Self::Recurrent(net) => net.train_epoch(inputs, targets, learning_rate),
            Self::Direct(model) => model.train_epoch(inputs, targets, learning_rate),
        }
    }
}
