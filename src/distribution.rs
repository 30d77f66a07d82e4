//! Parameter distribution types.

use rand::Rng;

use crate::error::{Error, Result};

/// Distribution for a continuous parameter with inclusive bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloatDistribution {
    /// Lower bound (inclusive).
    pub low: f64,
    /// Upper bound (inclusive).
    pub high: f64,
}

impl FloatDistribution {
    /// Creates a distribution over `[low, high]` without validating it.
    ///
    /// Bounds are checked when the distribution is added to a
    /// [`SearchSpace`](crate::SearchSpace).
    #[must_use]
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Checks that both bounds are finite and `low < high`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonFiniteBounds`] or [`Error::InvalidBounds`], naming
    /// the parameter `name`.
    pub fn validate(&self, name: &str) -> Result<()> {
        if !self.low.is_finite() || !self.high.is_finite() {
            return Err(Error::NonFiniteBounds {
                name: name.to_string(),
            });
        }
        if self.low >= self.high {
            return Err(Error::InvalidBounds {
                name: name.to_string(),
                low: self.low,
                high: self.high,
            });
        }
        Ok(())
    }

    /// Width of the interval.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    /// Returns `true` if `value` lies inside the inclusive bounds.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.low..=self.high).contains(&value)
    }

    /// Projects `value` onto the bounds. NaN maps to the lower bound.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            self.low
        } else {
            value.clamp(self.low, self.high)
        }
    }

    /// Draws a value uniformly from `[low, high]`.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        rng.random_range(self.low..=self.high)
    }
}
