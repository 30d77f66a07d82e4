//! Random sampler implementation.

use parking_lot::Mutex;

use crate::rng_util;
use crate::sampler::Sampler;
use crate::search_space::SearchSpace;
use crate::trial::Trial;
use crate::types::{Direction, ParamSet};

/// A simple random sampler that samples uniformly from the search space.
///
/// This sampler ignores the trial history. It serves as a baseline to
/// compare [`TpeSampler`](super::TpeSampler) against.
///
/// # Examples
///
/// ```
/// use latfit::sampler::RandomSampler;
///
/// // Create with default RNG
/// let sampler = RandomSampler::new();
///
/// // Create with a fixed seed for reproducibility
/// let sampler = RandomSampler::with_seed(42);
/// ```
pub struct RandomSampler {
    rng: Mutex<fastrand::Rng>,
}

impl RandomSampler {
    /// Creates a new random sampler with a default random seed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// Creates a new random sampler with a fixed seed for reproducibility.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
        }
    }
}

impl Default for RandomSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for RandomSampler {
    fn propose(&self, space: &SearchSpace, _direction: Direction, _history: &[Trial]) -> ParamSet {
        let mut rng = self.rng.lock();
        space
            .iter()
            .map(|(name, d)| {
                (
                    name.to_string(),
                    rng_util::f64_range(&mut rng, d.low, d.high),
                )
            })
            .collect()
    }
}
