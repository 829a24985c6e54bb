//! nano-textgen: a toy next-symbol text generator.
//!
//! The crate trains a tiny neural model over a vocabulary of characters or
//! words and samples text from it one symbol at a time:
//! - Vocabulary building with first-occurrence ids
//! - Recurrent and direct forward shapes on candle tensors
//! - Cumulative categorical sampling
//! - A sliding-window generation loop
//! - A Markov-chain alternative and a small HTTP server

pub mod config;
pub mod error;

pub mod corpus;
pub mod engine;
pub mod lang;
pub mod markov;
pub mod model;
pub mod server;
pub mod telemetry;
pub mod vocab;

pub use config::{Architecture, ModelConfig, SamplingConfig, TrainingConfig, UnknownSymbolPolicy};
pub use corpus::Corpus;
pub use engine::{
    FinishReason, GenerationOutput, GenerationRequest, Generator, NeuralEngine, Sampler,
};
pub use error::{Error, Result};
pub use lang::{Language, LanguageDetector, Translator};
pub use markov::{MarkovChain, MarkovOutput};
pub use model::{HiddenState, TextModel, TrainingReport, WeightBlob};
pub use server::{create_app, AppContext, ServerConfig};
pub use vocab::{SymbolLevel, Vocabulary};
