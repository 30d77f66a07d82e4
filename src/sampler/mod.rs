//! Sampler trait and implementations for proposing parameter sets.
//!
//! | Sampler | Algorithm | Uses history |
//! |---------|-----------|--------------|
//! | [`RandomSampler`] | Independent uniform draws | no |
//! | [`TpeSampler`] | Density-ratio (Tree-Parzen Estimator) over per-parameter KDEs | yes |

pub mod random;
pub mod tpe;

pub use random::RandomSampler;
pub use tpe::{FixedGamma, GammaStrategy, SqrtGamma, TpeSampler, TpeSamplerBuilder};

use crate::search_space::SearchSpace;
use crate::trial::Trial;
use crate::types::{Direction, ParamSet};

/// Trait for pluggable parameter sampling strategies.
///
/// A sampler receives the whole trial history of the study on every call
/// and proposes one full parameter set. It keeps no state between calls
/// beyond its random source, so the history passed in is the only thing
/// that steers the search.
///
/// Implementations must return a value for every parameter of `space`.
/// The study clamps proposals into bounds before creating a trial.
pub trait Sampler: Send + Sync {
    /// Proposes the next parameter set to evaluate.
    ///
    /// # Arguments
    ///
    /// * `space` - The declared parameter bounds.
    /// * `direction` - Whether higher or lower objective values are better.
    /// * `history` - Every trial of the study so far, ordered by id.
    fn propose(&self, space: &SearchSpace, direction: Direction, history: &[Trial]) -> ParamSet;
}
