//! Symbol vocabulary.
//!
//! A [`Vocabulary`] is a bijection between the distinct symbols of a corpus
//! and dense ids `0..len`, assigned in first-occurrence order. Symbols are
//! either single characters or whitespace-delimited words, depending on the
//! [`SymbolLevel`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Granularity of a symbol.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SymbolLevel {
    /// One symbol per character.
    #[default]
    Char,
    /// One symbol per whitespace-delimited word.
    Word,
}

impl SymbolLevel {
    /// Split text into symbols.
    pub fn split(&self, text: &str) -> Vec<String> {
        match self {
            Self::Char => text.chars().map(String::from).collect(),
            Self::Word => text.split_whitespace().map(String::from).collect(),
        }
    }

    /// Join symbols back into text (concatenation for characters, single
    /// spaces for words).
    pub fn join<S: AsRef<str>>(&self, symbols: &[S]) -> String {
        let separator = self.separator();
        let mut out = String::new();
        for (i, s) in symbols.iter().enumerate() {
            if i > 0 {
                out.push_str(separator);
            }
            out.push_str(s.as_ref());
        }
        out
    }

    /// Separator placed between adjacent symbols when joining.
    pub fn separator(&self) -> &'static str {
        match self {
            Self::Char => "",
            Self::Word => " ",
        }
    }

    /// Get the level name as a static string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Char => "char",
            Self::Word => "word",
        }
    }
}

/// Bijective symbol <-> id mapping.
///
/// Persisted as the plain list of symbols in id order.
///
/// # Example
///
/// ```
/// use nano_textgen::vocab::{SymbolLevel, Vocabulary};
///
/// let vocab = Vocabulary::build(SymbolLevel::Char.split("abcabc"));
/// assert_eq!(vocab.len(), 3);
/// assert_eq!(vocab.id("b"), Some(1));
/// assert_eq!(vocab.symbol(2), Some("c"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    symbols: Vec<String>,
    ids: HashMap<String, u32>,
}

impl Vocabulary {
    /// Build a vocabulary from a symbol sequence, ids in first-occurrence order.
    pub fn build<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocab = Self::default();
        for symbol in symbols {
            vocab.insert(symbol.into());
        }
        vocab
    }

    fn insert(&mut self, symbol: String) -> u32 {
        if let Some(&id) = self.ids.get(&symbol) {
            return id;
        }
        let id = self.symbols.len() as u32;
        self.ids.insert(symbol.clone(), id);
        self.symbols.push(symbol);
        id
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Id of a symbol, if known.
    pub fn id(&self, symbol: &str) -> Option<u32> {
        self.ids.get(symbol).copied()
    }

    /// Symbol for an id, if in range.
    pub fn symbol(&self, id: u32) -> Option<&str> {
        self.symbols.get(id as usize).map(String::as_str)
    }

    /// All symbols in id order.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Encode symbols to ids, dropping the ones not in the vocabulary.
    pub fn encode_known<S: AsRef<str>>(&self, symbols: &[S]) -> Vec<u32> {
        symbols.iter().filter_map(|s| self.id(s.as_ref())).collect()
    }

    /// Encode symbols to ids, mapping unknown symbols to `fallback`.
    pub fn encode_or<S: AsRef<str>>(&self, symbols: &[S], fallback: u32) -> Vec<u32> {
        symbols
            .iter()
            .map(|s| self.id(s.as_ref()).unwrap_or(fallback))
            .collect()
    }
}

impl TryFrom<Vec<String>> for Vocabulary {
    type Error = String;

    fn try_from(symbols: Vec<String>) -> std::result::Result<Self, Self::Error> {
        let mut vocab = Self::default();
        for symbol in symbols {
            if vocab.ids.contains_key(&symbol) {
                return Err(format!("duplicate vocabulary symbol {symbol:?}"));
            }
            vocab.insert(symbol);
        }
        Ok(vocab)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocab: Vocabulary) -> Self {
        vocab.symbols
    }
}
