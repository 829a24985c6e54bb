//! Error types for nano-textgen.

use thiserror::Error;

/// Result type alias for nano-textgen operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for nano-textgen.
#[derive(Error, Debug)]
pub enum Error {
    /// The training corpus produced no symbols.
    #[error("corpus contains no symbols")]
    EmptyCorpus,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A tensor required by the architecture is absent from the weight blob.
    #[error("weight blob is missing tensor `{0}`")]
    MissingTensor(String),

    /// A persisted tensor does not match the shape derived from the config.
    #[error("tensor `{tensor}` has shape {actual:?}, expected {expected:?}")]
    DimensionMismatch {
        tensor: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// The persisted vocabulary disagrees with the persisted vocab size.
    #[error("vocabulary has {actual} symbols, config says {expected}")]
    VocabularyMismatch { expected: usize, actual: usize },

    /// Weight blob could not be loaded.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Tensor operation error.
    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
