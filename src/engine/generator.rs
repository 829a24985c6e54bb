//! Generation loop.
//!
//! ```text
//! seed ──split──► ids ──keep last seq_length──► window
//!                                                 │
//!                 prime hidden state on window[..len-1]
//!                                                 │
//!            ┌────────────────────────────────────┘
//!            ▼
//!   forward(window.back) ─► probs ─► Sampler ─► next id
//!            ▲                                    │
//!            └──── slide window (drop oldest) ◄───┘
//! ```
//!
//! The loop runs exactly `max_tokens` steps unless the context cannot be
//! mapped to ids, in which case it stops early with whatever it has.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::sampler::Sampler;
use crate::config::{SamplingConfig, UnknownSymbolPolicy};
use crate::error::Result;
use crate::model::TextModel;
use crate::vocab::{SymbolLevel, Vocabulary};

/// Reason generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Requested number of symbols produced.
    MaxTokens,
    /// No known symbol to condition on.
    UnknownContext,
    /// Markov state with no recorded successor.
    NoSuccessors,
}

/// Request for text generation.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Leading text to condition on.
    pub seed: String,
    /// Number of symbols to generate.
    pub max_tokens: usize,
    /// Handling of unknown seed symbols.
    pub unknown_symbols: UnknownSymbolPolicy,
}

impl GenerationRequest {
    /// Create a new generation request with default settings.
    pub fn new(seed: impl Into<String>) -> Self {
        let defaults = SamplingConfig::default();
        Self {
            seed: seed.into(),
            max_tokens: defaults.max_tokens,
            unknown_symbols: defaults.unknown_symbols,
        }
    }

    /// Set the number of symbols to generate.
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the unknown-symbol policy.
    pub fn unknown_symbols(mut self, policy: UnknownSymbolPolicy) -> Self {
        self.unknown_symbols = policy;
        self
    }
}

/// Output from a generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutput {
    /// Seed text as given.
    pub seed: String,
    /// Generated text only (seed excluded).
    pub output_text: String,
    /// Generated symbol ids.
    pub output_ids: Vec<u32>,
    /// Reason for finishing.
    pub finish_reason: FinishReason,
    /// Symbol level used to join the output.
    pub level: SymbolLevel,
}

impl GenerationOutput {
    /// Number of generated symbols.
    pub fn len(&self) -> usize {
        self.output_ids.len()
    }

    /// Whether nothing was generated.
    pub fn is_empty(&self) -> bool {
        self.output_ids.is_empty()
    }

    /// Seed followed by the generated text.
    pub fn full_text(&self) -> String {
        if self.seed.is_empty() || self.output_text.is_empty() {
            return format!("{}{}", self.seed, self.output_text);
        }
        format!("{}{}{}", self.seed, self.level.separator(), self.output_text)
    }
}

/// Borrowing driver that runs one request against a model.
#[derive(Debug, Clone, Copy)]
pub struct Generator<'a> {
    model: &'a TextModel,
    vocab: &'a Vocabulary,
    level: SymbolLevel,
    context_length: usize,
}

impl<'a> Generator<'a> {
    /// Creates a generator. `context_length` is clamped to at least 1.
    pub fn new(
        model: &'a TextModel,
        vocab: &'a Vocabulary,
        level: SymbolLevel,
        context_length: usize,
    ) -> Self {
        Self {
            model,
            vocab,
            level,
            context_length: context_length.max(1),
        }
    }

    /// Encodes the seed into the initial context window.
    pub fn context_window(&self, seed: &str, policy: UnknownSymbolPolicy) -> VecDeque<u32> {
        let symbols = self.level.split(seed);
        let ids = match policy {
            UnknownSymbolPolicy::Skip => self.vocab.encode_known(&symbols),
            UnknownSymbolPolicy::Default => self.vocab.encode_or(&symbols, 0),
        };
        let start = ids.len().saturating_sub(self.context_length);
        ids[start..].iter().copied().collect()
    }

    /// Runs the loop for one request.
    pub fn run(
        &self,
        request: &GenerationRequest,
        sampler: &mut Sampler,
    ) -> Result<GenerationOutput> {
        let mut window = self.context_window(&request.seed, request.unknown_symbols);
        let mut output_ids = Vec::with_capacity(request.max_tokens);
        let mut symbols: Vec<&str> = Vec::with_capacity(request.max_tokens);
        let mut finish_reason = FinishReason::MaxTokens;

        if window.is_empty() {
            finish_reason = FinishReason::UnknownContext;
        } else {
            let mut state = self.model.initial_state()?;
            for &id in window.iter().take(window.len() - 1) {
                self.model.forward(id, &mut state)?;
            }

            for _ in 0..request.max_tokens {
                let Some(&current) = window.back() else {
                    finish_reason = FinishReason::UnknownContext;
                    break;
                };
                let probs = self.model.forward(current, &mut state)?;
                let next = sampler.sample(&probs)?;
                let Some(symbol) = self.vocab.symbol(next) else {
                    finish_reason = FinishReason::UnknownContext;
                    break;
                };

                output_ids.push(next);
                symbols.push(symbol);
                if window.len() == self.context_length {
                    window.pop_front();
                }
                window.push_back(next);
            }
        }

        tracing::debug!(
            seed_len = request.seed.len(),
            generated = output_ids.len(),
            finish_reason = ?finish_reason,
            "Generation finished"
        );

        Ok(GenerationOutput {
            seed: request.seed.clone(),
            output_text: self.level.join(&symbols),
            output_ids,
            finish_reason,
            level: self.level,
        })
    }
}
