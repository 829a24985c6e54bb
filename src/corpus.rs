//! Training corpus.

use std::path::Path;

use crate::error::{Error, Result};
use crate::vocab::SymbolLevel;

/// Sample text the server trains on when no corpus file is given.
const SAMPLE_RECORDS: &[&str] = &[
    "The quick brown fox jumps over the lazy dog.",
    "Artificial intelligence is transforming the world.",
    "Machine learning algorithms can learn from data.",
    "Neural networks are inspired by the human brain.",
    "Rust is a fast and reliable programming language.",
    "Cargo builds crates and manages dependencies.",
    "HTTP servers handle requests and responses.",
    "JSON is a lightweight data interchange format.",
    "Programming requires logic and creativity.",
    "Technology advances rapidly every year.",
    "The future holds many possibilities.",
    "Innovation drives progress in society.",
    "Computers process information quickly.",
    "Algorithms solve problems efficiently.",
    "Data structures organize information.",
    "Coding is a valuable skill.",
    "Software development involves many disciplines.",
    "Debugging is an important part of programming.",
    "Version control helps manage code changes.",
    "Collaboration improves software quality.",
];

/// An ordered list of text records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    records: Vec<String>,
}

impl Corpus {
    /// Creates a corpus from records.
    pub fn new<I, S>(records: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            records: records.into_iter().map(Into::into).collect(),
        }
    }

    /// The built-in sample corpus.
    pub fn sample() -> Self {
        Self::new(SAMPLE_RECORDS.iter().copied())
    }

    /// Reads one record per non-empty line of a text file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let corpus = Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty()),
        );
        if corpus.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        tracing::info!(path = %path.display(), records = corpus.len(), "Loaded corpus");
        Ok(corpus)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in order.
    pub fn records(&self) -> &[String] {
        &self.records
    }

    /// All records joined by single spaces.
    pub fn text(&self) -> String {
        self.records.join(" ")
    }

    /// The joined text split into symbols.
    pub fn symbols(&self, level: SymbolLevel) -> Vec<String> {
        level.split(&self.text())
    }
}
