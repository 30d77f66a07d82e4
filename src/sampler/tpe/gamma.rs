use core::fmt::Debug;

use crate::error::{Error, Result};

/// Decides how many of the completed trials form the "good" group.
///
/// The sampler sorts completed trials best-first and hands the count to
/// [`n_good`](Self::n_good). Whatever the strategy returns is clamped to
/// `[1, n_completed - 1]`, so both groups are never empty.
///
/// # Examples
///
/// ```
/// use latfit::sampler::{GammaStrategy, TpeSampler};
///
/// /// Always model the best five trials.
/// #[derive(Debug)]
/// struct TopFive;
///
/// impl GammaStrategy for TopFive {
///     fn n_good(&self, _n_completed: usize) -> usize {
///         5
///     }
/// }
///
/// let sampler = TpeSampler::builder().gamma_strategy(TopFive).build().unwrap();
/// ```
pub trait GammaStrategy: Send + Sync + Debug {
    /// Size of the good group for `n_completed` completed trials.
    fn n_good(&self, n_completed: usize) -> usize;
}

/// Splits off a fixed fraction of the completed trials: `ceil(n * gamma)`.
///
/// The default fraction is 0.25.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedGamma(f64);

impl FixedGamma {
    /// Creates the strategy for a fraction strictly between 0 and 1.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGamma`] otherwise.
    pub fn new(gamma: f64) -> Result<Self> {
        if gamma > 0.0 && gamma < 1.0 {
            Ok(Self(gamma))
        } else {
            Err(Error::InvalidGamma(gamma))
        }
    }

    /// The configured fraction.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for FixedGamma {
    fn default() -> Self {
        Self(0.25)
    }
}

impl GammaStrategy for FixedGamma {
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn n_good(&self, n_completed: usize) -> usize {
        (n_completed as f64 * self.0).ceil() as usize
    }
}

/// Grows the good group like `sqrt(n)`, capped at a fraction of `n`:
/// `min(ceil(factor * sqrt(n)), ceil(max_fraction * n))`.
///
/// Long studies then model only their very best trials.
///
/// ```
/// use latfit::sampler::{GammaStrategy, SqrtGamma};
///
/// let strategy = SqrtGamma::default();
/// assert_eq!(strategy.n_good(16), 4);
/// assert_eq!(strategy.n_good(400), 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SqrtGamma {
    factor: f64,
    max_fraction: f64,
}

impl SqrtGamma {
    /// Creates the strategy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGamma`] if `factor` is not positive and finite
    /// or `max_fraction` is not strictly between 0 and 1.
    pub fn new(factor: f64, max_fraction: f64) -> Result<Self> {
        if !(factor > 0.0 && factor.is_finite()) {
            return Err(Error::InvalidGamma(factor));
        }
        FixedGamma::new(max_fraction)?;
        Ok(Self {
            factor,
            max_fraction,
        })
    }
}

impl Default for SqrtGamma {
    fn default() -> Self {
        Self {
            factor: 1.0,
            max_fraction: 0.25,
        }
    }
}

impl GammaStrategy for SqrtGamma {
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn n_good(&self, n_completed: usize) -> usize {
        let n = n_completed as f64;
        let by_sqrt = (self.factor * n.sqrt()).ceil() as usize;
        let cap = (self.max_fraction * n).ceil() as usize;
        by_sqrt.min(cap)
    }
}
