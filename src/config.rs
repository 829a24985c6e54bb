//! Configuration types for nano-textgen.

use serde::{Deserialize, Serialize};

use crate::vocab::SymbolLevel;

/// Forward-pass shape of the next-symbol model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    /// Elman-style recurrent net: tanh hidden state carried across steps.
    Recurrent,
    /// One learned logit per (class, input id) pair, no hidden state.
    Direct,
}

impl Architecture {
    /// Get the architecture name as a static string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recurrent => "recurrent",
            Self::Direct => "direct",
        }
    }
}

/// What to do with seed symbols the vocabulary has never seen.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum UnknownSymbolPolicy {
    /// Drop unknown symbols from the seed.
    #[default]
    Skip,
    /// Map unknown symbols to id 0.
    Default,
}

/// Model configuration.
///
/// Travels inside the weight blob, so every field here is part of the
/// persisted format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Forward-pass shape.
    pub architecture: Architecture,
    /// Whether symbols are characters or words.
    pub level: SymbolLevel,
    /// Vocabulary size (filled in from the built vocabulary).
    pub vocab_size: usize,
    /// Hidden dimension (recurrent shape only).
    pub hidden_size: usize,
    /// Length of the sliding context window used during generation.
    pub seq_length: usize,
    /// Half-width of the uniform weight initialisation interval.
    pub init_scale: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            architecture: Architecture::Recurrent,
            level: SymbolLevel::Char,
            vocab_size: 0,
            hidden_size: 50,
            seq_length: 16,
            init_scale: 0.1,
        }
    }
}

impl ModelConfig {
    /// Returns a copy with `vocab_size` replaced.
    pub fn with_vocab_size(mut self, vocab_size: usize) -> Self {
        self.vocab_size = vocab_size;
        self
    }

    /// Expected tensor shapes for this configuration, in persistence order.
    pub fn tensor_shapes(&self) -> Vec<(&'static str, Vec<usize>)> {
        let v = self.vocab_size;
        let h = self.hidden_size;
        match self.architecture {
            Architecture::Recurrent => vec![
                ("w_xh", vec![h, v]),
                ("w_hh", vec![h, h]),
                ("w_hy", vec![v, h]),
                ("b_h", vec![h]),
                ("b_y", vec![v]),
            ],
            Architecture::Direct => vec![("weight", vec![v, v]), ("bias", vec![v])],
        }
    }
}

/// Training configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of passes over the corpus.
    pub epochs: usize,
    /// Plain gradient descent step size.
    pub learning_rate: f32,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 50,
            learning_rate: 0.01,
        }
    }
}

/// Sampling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Maximum symbols to generate.
    pub max_tokens: usize,
    /// RNG seed (None = seed from OS entropy).
    pub seed: Option<u64>,
    /// Handling of seed symbols outside the vocabulary.
    pub unknown_symbols: UnknownSymbolPolicy,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_tokens: 100,
            seed: None,
            unknown_symbols: UnknownSymbolPolicy::Skip,
        }
    }
}
