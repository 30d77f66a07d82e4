//! Tree-Parzen Estimator (TPE) sampler for Bayesian optimization.
//!
//! TPE models P(x|y) instead of P(y|x). It splits completed trials into
//! "good" (the best gamma quantile) and "bad" groups, fits a kernel density
//! estimator (KDE) to each group for every parameter independently, and
//! proposes the candidate maximizing the l(x)/g(x) ratio.
//!
//! # Gamma strategies
//!
//! A [`GammaStrategy`] sets the size of the good group for `n` completed
//! trials, clamped to `[1, n - 1]`.
//!
//! | Strategy | Good trials | Default |
//! |----------|-------------|---------|
//! | [`FixedGamma`] | `ceil(gamma * n)` | gamma = 0.25 |
//! | [`SqrtGamma`] | `min(ceil(factor * sqrt(n)), ceil(max_fraction * n))` | factor = 1.0, max = 0.25 |
//!
//! # Examples
//!
//! ```
//! use latfit::sampler::TpeSampler;
//!
//! let sampler = TpeSampler::builder()
//!     .gamma(0.2)
//!     .n_startup_trials(10)
//!     .n_ei_candidates(24)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//! ```

mod gamma;
mod sampler;

pub use gamma::{FixedGamma, GammaStrategy, SqrtGamma};
pub use sampler::{TpeSampler, TpeSamplerBuilder};
