use rand::Rng;

use crate::error::{Error, Result};
use crate::rng_util;

/// `ln(sqrt(2 * pi))`
const LN_SQRT_2PI: f64 = 0.918_938_533_204_672_8;

/// Equal-weight mixture of Gaussians, one centered on each observed value,
/// all sharing one bandwidth.
#[derive(Clone, Debug)]
pub(crate) struct GaussianKde {
    centers: Vec<f64>,
    bandwidth: f64,
}

impl GaussianKde {
    /// # Errors
    ///
    /// Returns `Error::EmptySamples` without centers and
    /// `Error::InvalidBandwidth` unless `bandwidth` is positive and finite.
    pub(crate) fn new(centers: Vec<f64>, bandwidth: f64) -> Result<Self> {
        if centers.is_empty() {
            return Err(Error::EmptySamples);
        }
        if !(bandwidth > 0.0 && bandwidth.is_finite()) {
            return Err(Error::InvalidBandwidth(bandwidth));
        }
        Ok(Self { centers, bandwidth })
    }

    /// Scott's rule, `n^(-1/5) * sigma` with the population standard
    /// deviation.
    ///
    /// `None` for fewer than two values or values without spread.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn scott_bandwidth(values: &[f64]) -> Option<f64> {
        if values.len() < 2 {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let sigma = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
        (sigma >= f64::EPSILON).then(|| n.powf(-0.2) * sigma)
    }

    /// Natural log of the density at `x`.
    ///
    /// Computed with log-sum-exp: far from every center the result stays
    /// finite where the plain density would underflow to zero.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn ln_density(&self, x: f64) -> f64 {
        let exponent = |c: f64| {
            let z = (x - c) / self.bandwidth;
            -0.5 * z * z
        };
        let peak = self
            .centers
            .iter()
            .map(|&c| exponent(c))
            .fold(f64::NEG_INFINITY, f64::max);
        if !peak.is_finite() {
            return f64::NEG_INFINITY;
        }
        let sum: f64 = self.centers.iter().map(|&c| (exponent(c) - peak).exp()).sum();
        peak + sum.ln() - (self.centers.len() as f64).ln() - self.bandwidth.ln() - LN_SQRT_2PI
    }

    /// Picks a center uniformly and perturbs it by the kernel.
    pub(crate) fn draw<R: Rng>(&self, rng: &mut R) -> f64 {
        let center = self.centers[rng.random_range(0..self.centers.len())];
        center + self.bandwidth * rng_util::standard_normal(rng)
    }
}
