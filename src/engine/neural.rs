//! Neural text generation engine.
//!
//! [`NeuralEngine`] owns everything a trained model needs at serving time:
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │                NeuralEngine                │
//! │  ModelConfig · Vocabulary · TextModel      │
//! └────────────────────────────────────────────┘
//!        │ train / load_or_train        │ generate
//!        ▼                              ▼
//!  corpus ─► vocab ─► ids ─► train   Generator + Sampler
//!        │
//!        ▼
//!   WeightBlob (JSON)
//! ```
//!
//! The engine is immutable once built, so one instance can be shared by
//! every request handler without locking.

use std::path::Path;

use candle_core::Device;

use super::generator::{GenerationOutput, GenerationRequest, Generator};
use super::sampler::Sampler;
use crate::config::{ModelConfig, TrainingConfig};
use crate::corpus::Corpus;
use crate::error::{Error, Result};
use crate::model::{self, TextModel, TrainingReport, WeightBlob};
use crate::vocab::Vocabulary;

/// A trained (or loaded) next-symbol model with its vocabulary.
#[derive(Debug, Clone)]
pub struct NeuralEngine {
    /// Model configuration (vocab_size matches `vocab`).
    config: ModelConfig,
    /// Symbol <-> id mapping.
    vocab: Vocabulary,
    /// The model.
    model: TextModel,
}

impl NeuralEngine {
    /// Builds the vocabulary from `corpus`, initialises a model and trains it.
    ///
    /// `config.vocab_size` is overwritten with the built vocabulary's size.
    pub fn train(
        corpus: &Corpus,
        config: ModelConfig,
        training: &TrainingConfig,
    ) -> Result<(Self, TrainingReport)> {
        let symbols = corpus.symbols(config.level);
        let vocab = Vocabulary::build(symbols.iter().map(String::as_str));
        if vocab.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        let config = config.with_vocab_size(vocab.len());
        tracing::info!(
            level = config.level.as_str(),
            vocab_size = config.vocab_size,
            symbols = symbols.len(),
            "Built vocabulary"
        );

        let mut model = TextModel::new_random(&config, &Device::Cpu)?;
        let ids = vocab.encode_known(&symbols);
        let report = model::train(&mut model, &ids, training)?;

        Ok((
            Self {
                config,
                vocab,
                model,
            },
            report,
        ))
    }

    /// Rebuilds an engine from a validated weight blob.
    pub fn from_blob(blob: WeightBlob) -> Result<Self> {
        let model = blob.restore(&Device::Cpu)?;
        Ok(Self {
            config: blob.config,
            vocab: blob.vocabulary,
            model,
        })
    }

    /// Captures the engine state as a weight blob.
    pub fn to_blob(&self) -> Result<WeightBlob> {
        WeightBlob::capture(&self.config, &self.vocab, &self.model)
    }

    /// Loads an engine from a JSON weight file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_blob(WeightBlob::load(path)?)
    }

    /// Saves the engine as a JSON weight file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.to_blob()?.save(path)
    }

    /// Loads `path` if it exists, otherwise trains on `corpus` and saves.
    ///
    /// A file that exists but does not load is an error: the caller must
    /// retrain explicitly.
    pub fn load_or_train(
        path: impl AsRef<Path>,
        corpus: &Corpus,
        config: ModelConfig,
        training: &TrainingConfig,
    ) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let engine = Self::load(path)?;
            let stored = engine.config();
            if stored.architecture != config.architecture || stored.level != config.level {
                tracing::warn!(
                    stored_architecture = stored.architecture.as_str(),
                    stored_level = stored.level.as_str(),
                    "Stored weights differ from the requested model; using stored weights"
                );
            }
            return Ok(engine);
        }

        tracing::info!(path = %path.display(), "No stored weights, training a new model");
        let (engine, _) = Self::train(corpus, config, training)?;
        engine.save(path)?;
        Ok(engine)
    }

    /// Generates text for one request.
    pub fn generate(
        &self,
        request: &GenerationRequest,
        sampler: &mut Sampler,
    ) -> Result<GenerationOutput> {
        self.generator().run(request, sampler)
    }

    /// Next-symbol distribution after consuming `context` from a fresh state.
    ///
    /// Returns `None` if `context` is empty.
    pub fn distribution(&self, context: &[u32]) -> Result<Option<Vec<f32>>> {
        let mut state = self.model.initial_state()?;
        let mut probs = None;
        for &id in context {
            probs = Some(self.model.forward(id, &mut state)?);
        }
        match probs {
            Some(probs) => Ok(Some(probs.to_vec1()?)),
            None => Ok(None),
        }
    }

    /// A generator borrowing this engine.
    pub fn generator(&self) -> Generator<'_> {
        Generator::new(
            &self.model,
            &self.vocab,
            self.config.level,
            self.config.seq_length,
        )
    }

    /// Returns the model configuration.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Returns the vocabulary.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Returns the model.
    pub fn model(&self) -> &TextModel {
        &self.model
    }
}
