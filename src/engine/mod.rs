//! Inference engine.
//!
//! This module contains:
//! - NeuralEngine for training, persisting and serving a model
//! - Generator for the sliding-window generation loop
//! - Sampler for categorical symbol sampling

pub mod generator;
pub mod neural;
pub mod sampler;

pub use generator::{FinishReason, GenerationOutput, GenerationRequest, Generator};
pub use neural::NeuralEngine;
pub use sampler::Sampler;
