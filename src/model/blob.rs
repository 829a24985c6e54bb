//! Weight blob persistence.
//!
//! The whole engine state (config, vocabulary, tensors) is written as one
//! JSON document. Loading checks every tensor against the shape derived from
//! the stored config; any disagreement is fatal and the caller has to
//! retrain.

use std::collections::BTreeMap;
use std::path::Path;

use candle_core::{Device, Tensor};
use serde::{Deserialize, Serialize};

use super::TextModel;
use crate::config::ModelConfig;
use crate::error::{Error, Result};
use crate::vocab::Vocabulary;

/// Current blob layout version.
pub const FORMAT_VERSION: u32 = 1;

/// A flattened tensor with its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorData {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

impl TensorData {
    /// Copies a tensor out of the model.
    pub fn from_tensor(tensor: &Tensor) -> Result<Self> {
        Ok(Self {
            shape: tensor.dims().to_vec(),
            data: tensor.flatten_all()?.to_vec1()?,
        })
    }

    /// Rebuilds the tensor, checking it has the `expected` shape.
    pub fn to_tensor(&self, name: &str, expected: &[usize], device: &Device) -> Result<Tensor> {
        let numel: usize = self.shape.iter().product();
        if self.shape != expected || self.data.len() != numel {
            return Err(Error::DimensionMismatch {
                tensor: name.to_string(),
                expected: expected.to_vec(),
                actual: if self.data.len() == numel {
                    self.shape.clone()
                } else {
                    vec![self.data.len()]
                },
            });
        }
        Ok(Tensor::from_vec(self.data.clone(), self.shape.clone(), device)?)
    }
}

/// Serialized engine state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightBlob {
    pub format_version: u32,
    pub config: ModelConfig,
    pub vocabulary: Vocabulary,
    pub tensors: BTreeMap<String, TensorData>,
}

impl WeightBlob {
    /// Captures a model and its vocabulary.
    pub fn capture(
        config: &ModelConfig,
        vocabulary: &Vocabulary,
        model: &TextModel,
    ) -> Result<Self> {
        let tensors = model
            .named_tensors()
            .into_iter()
            .map(|(name, tensor)| Ok((name.to_string(), TensorData::from_tensor(tensor)?)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        Ok(Self {
            format_version: FORMAT_VERSION,
            config: config.clone(),
            vocabulary: vocabulary.clone(),
            tensors,
        })
    }

    /// Validates the blob and rebuilds the model it describes.
    pub fn restore(&self, device: &Device) -> Result<TextModel> {
        if self.format_version != FORMAT_VERSION {
            return Err(Error::ModelLoad(format!(
                "unsupported blob format version {} (expected {FORMAT_VERSION})",
                self.format_version
            )));
        }
        if self.vocabulary.len() != self.config.vocab_size {
            return Err(Error::VocabularyMismatch {
                expected: self.config.vocab_size,
                actual: self.vocabulary.len(),
            });
        }
        if self.config.vocab_size == 0 {
            return Err(Error::EmptyCorpus);
        }

        let mut tensors = BTreeMap::new();
        for (name, shape) in self.config.tensor_shapes() {
            let data = self
                .tensors
                .get(name)
                .ok_or_else(|| Error::MissingTensor(name.to_string()))?;
            tensors.insert(name, data.to_tensor(name, &shape, device)?);
        }
        TextModel::from_tensors(&self.config, tensors)
    }

    /// Serializes to JSON text.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes the blob to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        tracing::info!(path = %path.display(), tensors = self.tensors.len(), "Saved weights");
        Ok(())
    }

    /// Reads a blob from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let blob = Self::from_json(&content)?;
        tracing::info!(
            path = %path.display(),
            vocab_size = blob.config.vocab_size,
            architecture = blob.config.architecture.as_str(),
            "Loaded weights"
        );
        Ok(blob)
    }
}
