//! Markov-chain text generation.
//!
//! The chain maps every symbol to the list of symbols that followed it in
//! the corpus. Repeats are kept, so a uniform pick from the list is already
//! weighted by how often each successor was observed.

use std::collections::HashMap;

use crate::corpus::Corpus;
use crate::engine::{FinishReason, Sampler};
use crate::vocab::SymbolLevel;

/// First-order successor table.
#[derive(Debug, Clone, Default)]
pub struct MarkovChain {
    level: SymbolLevel,
    transitions: HashMap<String, Vec<String>>,
    /// Symbols with at least one successor, in first-occurrence order.
    states: Vec<String>,
}

/// Output of a Markov walk.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkovOutput {
    /// State the walk started from, if one could be chosen.
    pub start_state: Option<String>,
    /// Generated symbols (start state excluded).
    pub symbols: Vec<String>,
    /// Reason for finishing.
    pub finish_reason: FinishReason,
    level: SymbolLevel,
}

impl MarkovOutput {
    /// Generated symbols joined per the symbol level.
    pub fn text(&self) -> String {
        self.level.join(&self.symbols)
    }

    /// Number of generated symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether nothing was generated.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl MarkovChain {
    /// Builds the chain from a corpus split at `level`.
    pub fn build(corpus: &Corpus, level: SymbolLevel) -> Self {
        Self::from_symbols(&corpus.symbols(level), level)
    }

    /// Builds the chain from an already split symbol sequence.
    pub fn from_symbols<S: AsRef<str>>(symbols: &[S], level: SymbolLevel) -> Self {
        let mut chain = Self {
            level,
            ..Self::default()
        };
        for pair in symbols.windows(2) {
            let (current, next) = (pair[0].as_ref(), pair[1].as_ref());
            let successors = chain.transitions.entry(current.to_string()).or_insert_with(|| {
                chain.states.push(current.to_string());
                Vec::new()
            });
            successors.push(next.to_string());
        }
        tracing::debug!(
            level = level.as_str(),
            states = chain.states.len(),
            "Built Markov chain"
        );
        chain
    }

    /// Symbol level the chain was built at.
    pub fn level(&self) -> SymbolLevel {
        self.level
    }

    /// Number of states with at least one successor.
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Recorded successors of `symbol`, in corpus order.
    pub fn successors(&self, symbol: &str) -> Option<&[String]> {
        self.transitions.get(symbol).map(Vec::as_slice)
    }

    /// Picks the state to start from.
    ///
    /// Last seed symbol if it has successors, else the first seed symbol if
    /// it has successors. An empty seed starts from a uniformly random state.
    fn start_state(&self, seed: &[String], sampler: &mut Sampler) -> Option<String> {
        if seed.is_empty() {
            return sampler.choose(&self.states).cloned();
        }
        [seed.last(), seed.first()]
            .into_iter()
            .flatten()
            .find(|s| self.transitions.contains_key(s.as_str()))
            .cloned()
    }

    /// Random walk of up to `length` steps from the seed-derived state.
    pub fn generate(&self, seed: &str, length: usize, sampler: &mut Sampler) -> MarkovOutput {
        let seed_symbols = self.level.split(seed);
        let start_state = self.start_state(&seed_symbols, sampler);
        let mut output = MarkovOutput {
            start_state: start_state.clone(),
            symbols: Vec::with_capacity(length),
            finish_reason: FinishReason::MaxTokens,
            level: self.level,
        };

        let Some(mut current) = start_state else {
            if length > 0 {
                output.finish_reason = FinishReason::NoSuccessors;
            }
            return output;
        };

        for _ in 0..length {
            let next = self
                .successors(&current)
                .and_then(|successors| sampler.choose(successors));
            let Some(next) = next else {
                output.finish_reason = FinishReason::NoSuccessors;
                break;
            };
            output.symbols.push(next.clone());
            current = next.clone();
        }
        output
    }
}
