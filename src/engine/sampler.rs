//! Categorical sampling.
//!
//! ## Sampling by cumulative sum
//!
//! ```text
//! probs [vocab_size]      r ~ U[0, 1)
//!     │
//!     ▼ running sum
//! c_0, c_0 + c_1, ...
//!     │
//!     ▼ first index with p > 0 and running sum ≥ r
//! Selected id
//! ```
//!
//! If rounding keeps the running sum below `r`, the last index carrying
//! probability mass is returned, so a valid id always comes out.

use candle_core::Tensor;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::SamplingConfig;
use crate::error::Result;

/// Symbol sampler owning the random number generator for one request.
#[derive(Debug, Clone)]
pub struct Sampler {
    /// Random number generator.
    rng: rand::rngs::StdRng,
}

impl Sampler {
    /// Creates a sampler from config (seeded if `config.seed` is set).
    pub fn new(config: &SamplingConfig) -> Self {
        match config.seed {
            Some(seed) => Self::with_seed(seed),
            None => Self {
                rng: rand::rngs::StdRng::from_entropy(),
            },
        }
    }

    /// Creates a sampler with a specific seed for reproducibility.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: rand::rngs::StdRng::seed_from_u64(seed),
        }
    }

    /// Sample an id from a 1D probability tensor.
    pub fn sample(&mut self, probs: &Tensor) -> Result<u32> {
        let probs: Vec<f32> = probs.to_vec1()?;
        Ok(self.sample_index(&probs) as u32)
    }

    /// Sample an index from a probability slice.
    pub fn sample_index(&mut self, probs: &[f32]) -> usize {
        let r: f32 = self.rng.gen();
        pick_cumulative(probs, r)
    }

    /// Uniformly choose one element (None if `items` is empty).
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }
}

/// Walks `probs` accumulating a running sum and returns the first index
/// with non-zero mass whose running sum meets or exceeds `r`.
pub fn pick_cumulative(probs: &[f32], r: f32) -> usize {
    let mut cumulative = 0.0f32;
    let mut last_with_mass = None;
    for (i, &p) in probs.iter().enumerate() {
        if p <= 0.0 {
            continue;
        }
        cumulative += p;
        last_with_mass = Some(i);
        if cumulative >= r {
            return i;
        }
    }
    last_with_mass.unwrap_or_else(|| probs.len().saturating_sub(1))
}
